use crate::bounds::{BoundingBox, Point};
use crate::error::{KdError, Result};
use crate::node::{KdNode, NodeId, Split};

/// Default number of points a node may hold before it is split.
pub const DEFAULT_MAX_POINTS_PER_LEAF: usize = 16;

/// How a node's split coordinate is chosen from the midpoint of its bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PivotRule {
    /// Decides the slide direction from the last point scanned in permutation order only.
    ///
    /// If that point lies below the midpoint the split moves to the largest coordinate of the
    /// node, otherwise to the smallest. The midpoint itself is never used. Trees built with this
    /// rule are reproducible bit for bit across builds of the same input, and small inputs
    /// usually end up as a single populated leaf next to an empty sibling.
    #[default]
    LastPoint,
    /// Classic sliding midpoint: split at the midpoint when points lie on both sides of it,
    /// otherwise slide to the nearest coordinate so neither side is left without points.
    SlidingMidpoint,
}

/// Build configuration of a [`KdTree`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildParams {
    /// Nodes holding more points than this are split further. The root is always split once.
    pub max_points_per_leaf: usize,
    /// Stop descending when a split leaves one side empty.
    ///
    /// Needed when the input may contain duplicate coordinates. With the guard off a split
    /// that leaves one side empty keeps descending into the other side as long as its bounds
    /// still shrink.
    pub duplicate_guard: bool,
    pub pivot_rule: PivotRule,
}

impl Default for BuildParams {
    fn default() -> Self {
        BuildParams {
            max_points_per_leaf: DEFAULT_MAX_POINTS_PER_LEAF,
            duplicate_guard: true,
            pivot_rule: PivotRule::default(),
        }
    }
}

impl BuildParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_points_per_leaf == 0 {
            return Err(KdError::InvalidLeafSize);
        }
        Ok(())
    }
}

/// A 3D k-d tree over a copy of the caller's points.
///
/// The tree never reorders the points themselves. Instead it permutes an index array so
/// that every node owns a contiguous range `start..end` of it. Nodes live in an arena that
/// is reused across rebuilds; the point and permutation buffers grow but never shrink.
#[derive(Clone, Debug)]
pub struct KdTree {
    points: Vec<Point>,
    permutation: Vec<usize>,
    count: usize,
    nodes: Vec<KdNode>,
    node_cursor: usize,
    generation: u32,
    root: NodeId,
    params: BuildParams,
}

impl Default for KdTree {
    fn default() -> Self {
        Self::new()
    }
}

impl KdTree {
    /// Creates an empty tree with default parameters.
    pub fn new() -> Self {
        let mut tree = KdTree {
            points: Vec::new(),
            permutation: Vec::new(),
            count: 0,
            nodes: Vec::with_capacity(64),
            node_cursor: 0,
            generation: 0,
            root: NodeId { index: 0, generation: 0 },
            params: BuildParams::default(),
        };
        tree.rebuild();
        tree
    }

    /// Creates an empty tree with the given parameters.
    pub fn with_params(params: BuildParams) -> Result<Self> {
        params.validate()?;
        let mut tree = Self::new();
        tree.params = params;
        Ok(tree)
    }

    /// Builds a tree over `points` with the given leaf size.
    pub fn from_points(points: &[Point], max_points_per_leaf: usize) -> Result<Self> {
        let mut tree = Self::with_params(BuildParams {
            max_points_per_leaf,
            ..BuildParams::default()
        })?;
        tree.build(points);
        Ok(tree)
    }

    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    /// Replaces the build parameters. Takes effect on the next build.
    pub fn set_params(&mut self, params: BuildParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn set_max_points_per_leaf(&mut self, max_points_per_leaf: usize) -> Result<()> {
        self.set_params(BuildParams {
            max_points_per_leaf,
            ..self.params
        })
    }

    /// Copies `points` into the tree and rebuilds it.
    pub fn build(&mut self, points: &[Point]) {
        self.set_count(points.len());
        self.points[..points.len()].copy_from_slice(points);
        self.rebuild();
    }

    /// Like [`KdTree::build`], updating the leaf size first.
    pub fn build_or_rebuild(&mut self, points: &[Point], max_points_per_leaf: usize) -> Result<()> {
        self.set_max_points_per_leaf(max_points_per_leaf)?;
        self.build(points);
        Ok(())
    }

    /// Builds from a flat coordinate buffer `[x, y, z, x, y, z, ...]`.
    pub fn build_flat(&mut self, coords: &[f64]) -> Result<()> {
        if coords.len() % 3 != 0 {
            return Err(KdError::InvalidPointBuffer(coords.len()));
        }
        let count = coords.len() / 3;
        self.set_count(count);
        for (slot, c) in self.points[..count].iter_mut().zip(coords.chunks_exact(3)) {
            *slot = [c[0], c[1], c[2]];
        }
        self.rebuild();
        Ok(())
    }

    /// Rebuilds the node hierarchy over the current points.
    ///
    /// Use after editing positions through [`KdTree::points_mut`].
    pub fn rebuild(&mut self) {
        let count = self.count;
        for (i, slot) in self.permutation[..count].iter_mut().enumerate() {
            *slot = i;
        }

        self.generation = self.generation.wrapping_add(1);
        self.node_cursor = 0;

        let bounds = BoundingBox::from_points(&self.points[..count]);
        self.root = self.alloc_node(0, count, bounds);

        if count > 0 {
            self.split_subtree(self.root);
        }

        tracing::debug!(
            points = count,
            nodes = self.node_cursor,
            leaf_size = self.params.max_points_per_leaf,
            generation = self.generation,
            "kd-tree built"
        );
    }

    /// Number of indexed points.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The indexed points in their original order.
    pub fn points(&self) -> &[Point] {
        &self.points[..self.count]
    }

    /// Mutable access to the indexed points. The tree is stale until [`KdTree::rebuild`].
    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points[..self.count]
    }

    /// Index permutation: `permutation()[node.start..node.end]` are the points of `node`.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation[..self.count]
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &KdNode {
        self.node(self.root)
    }

    /// Resolves a handle of the current build.
    ///
    /// # Panics
    ///
    /// Panics on a handle from another tree that is out of range. Stale handles from an
    /// earlier build are only caught in debug builds; use [`KdTree::get_node`] to check them.
    pub fn node(&self, id: NodeId) -> &KdNode {
        debug_assert_eq!(id.generation, self.generation, "stale node handle");
        &self.nodes[id.index()]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&KdNode> {
        if id.generation != self.generation || id.index() >= self.node_cursor {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Nodes of the current build in allocation order, the root first.
    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes[..self.node_cursor]
    }

    pub fn node_count(&self) -> usize {
        self.node_cursor
    }

    pub fn leaves(&self) -> impl Iterator<Item = &KdNode> {
        self.nodes().iter().filter(|n| n.is_leaf())
    }

    /// Build counter, bumped on every (re)build.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn set_count(&mut self, count: usize) {
        self.count = count;
        if count > self.points.len() {
            self.points.resize(count, [0.0; 3]);
            self.permutation.resize(count, 0);
        }
    }

    fn alloc_node(&mut self, start: usize, end: usize, bounds: BoundingBox) -> NodeId {
        let node = KdNode::new(start, end, bounds);
        let index = self.node_cursor;
        if index < self.nodes.len() {
            self.nodes[index] = node;
        } else {
            self.nodes.push(node);
        }
        self.node_cursor += 1;
        NodeId {
            index: index as u32,
            generation: self.generation,
        }
    }

    /// Splits `root` and keeps splitting its descendants until every pending node is small
    /// enough or cannot be split further.
    ///
    /// Depth-first with an explicit stack: sorted input under [`PivotRule::LastPoint`] peels
    /// one point per level, so the tree can be as deep as the input is long.
    fn split_subtree(&mut self, root: NodeId) {
        let leaf_size = self.params.max_points_per_leaf;
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            let parent = self.nodes[id.index()];
            let [negative, positive] = self.split_node(id);

            let one_sided = self.nodes[negative.index()].count() == 0 || self.nodes[positive.index()].count() == 0;
            if self.params.duplicate_guard && one_sided {
                continue;
            }

            // positive first so the negative side is split, and allocated, first
            for child in [positive, negative] {
                let node = &self.nodes[child.index()];
                let stalled = node.start == parent.start && node.end == parent.end && node.bounds == parent.bounds;
                if node.count() > leaf_size && !stalled {
                    pending.push(child);
                }
            }
        }
    }

    /// Splits a single node in two and returns `[negative, positive]`.
    fn split_node(&mut self, id: NodeId) -> [NodeId; 2] {
        let parent = self.nodes[id.index()];
        let size = parent.bounds.size();

        // Widest axis; ties keep the earlier axis.
        let mut axis = 0;
        let mut axis_size = size[0];
        if axis_size < size[1] {
            axis = 1;
            axis_size = size[1];
        }
        if axis_size < size[2] {
            axis = 2;
        }

        let pivot = self.calculate_pivot(
            parent.start,
            parent.end,
            parent.bounds.min[axis],
            parent.bounds.max[axis],
            axis,
        );
        let mid = self.partition(parent.start, parent.end, pivot, axis);

        let negative = self.alloc_node(parent.start, mid, parent.bounds.clip_max(axis, pivot));
        let positive = self.alloc_node(mid, parent.end, parent.bounds.clip_min(axis, pivot));
        self.nodes[id.index()].split = Some(Split {
            axis,
            coordinate: pivot,
            negative,
            positive,
        });

        [negative, positive]
    }

    fn axis_value(&self, slot: usize, axis: usize) -> f64 {
        self.points[self.permutation[slot]][axis]
    }

    /// Chooses the split coordinate of `start..end` on `axis` from the bounds midpoint.
    fn calculate_pivot(&self, start: usize, end: usize, bounds_start: f64, bounds_end: f64, axis: usize) -> f64 {
        let mid = (bounds_start + bounds_end) / 2.0;

        let below = match self.params.pivot_rule {
            // only the last point in permutation order decides
            PivotRule::LastPoint => end > start && self.axis_value(end - 1, axis) < mid,
            PivotRule::SlidingMidpoint => {
                let mut below = false;
                let mut above = false;
                for slot in start..end {
                    let v = self.axis_value(slot, axis);
                    below |= v < mid;
                    above |= v > mid;
                    if below && above {
                        return mid;
                    }
                }
                below
            }
        };

        if below {
            return (start..end).map(|slot| self.axis_value(slot, axis)).fold(f64::MIN, f64::max);
        }

        let min = (start..end).map(|slot| self.axis_value(slot, axis)).fold(f64::MAX, f64::min);
        if self.params.pivot_rule == PivotRule::SlidingMidpoint {
            // Points below the pivot go negative, so splitting at the minimum would leave that
            // side empty. Split just above it instead, at the next distinct coordinate.
            let next = (start..end)
                .map(|slot| self.axis_value(slot, axis))
                .filter(|&v| v > min)
                .fold(f64::MAX, f64::min);
            if next < f64::MAX {
                return next;
            }
        }
        min
    }

    /// Hoare-style partition of `start..end` around `pivot`.
    ///
    /// Returns `mid` such that `start..mid` holds the points strictly below `pivot` and
    /// `mid..end` the rest. Only the permutation is reordered.
    fn partition(&mut self, start: usize, end: usize, pivot: f64, axis: usize) -> usize {
        let mut left = start;
        let mut right = end;

        loop {
            while left < right && self.axis_value(left, axis) < pivot {
                left += 1;
            }
            while left < right && self.axis_value(right - 1, axis) >= pivot {
                right -= 1;
            }
            if left < right {
                self.permutation.swap(left, right - 1);
                left += 1;
                right -= 1;
            } else {
                return left;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golden_points() -> Vec<Point> {
        vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]
    }

    #[test]
    fn test_root_bounds() {
        let tree = KdTree::from_points(&golden_points(), 16).unwrap();
        assert_eq!(tree.root().bounds.min, [1.0, 2.0, 3.0]);
        assert_eq!(tree.root().bounds.max, [7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_root_always_split() {
        let tree = KdTree::from_points(&golden_points(), 16).unwrap();
        let root = tree.root();
        assert_eq!(root.partition_axis(), Some(0));
        assert_eq!(root.partition_coordinate(), Some(1.0));
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_child_bounds_and_ranges() {
        let tree = KdTree::from_points(&golden_points(), 16).unwrap();
        let root = tree.root();
        let neg = tree.node(root.negative_child().unwrap());
        let pos = tree.node(root.positive_child().unwrap());

        assert_eq!(neg.bounds.min, [1.0, 2.0, 3.0]);
        assert_eq!(neg.bounds.max, [1.0, 8.0, 9.0]);
        assert_eq!((neg.start, neg.end), (0, 0));

        assert_eq!(pos.bounds.min, [1.0, 2.0, 3.0]);
        assert_eq!(pos.bounds.max, [7.0, 8.0, 9.0]);
        assert_eq!((pos.start, pos.end), (0, 3));
        assert!(neg.is_leaf() && pos.is_leaf());
    }

    #[test]
    fn test_sliding_midpoint_splits_at_midpoint() {
        let params = BuildParams {
            max_points_per_leaf: 16,
            pivot_rule: PivotRule::SlidingMidpoint,
            ..BuildParams::default()
        };
        let mut tree = KdTree::with_params(params).unwrap();
        tree.build(&golden_points());

        let root = tree.root();
        assert_eq!(root.partition_axis(), Some(0));
        assert_eq!(root.partition_coordinate(), Some(4.0));
        let neg = tree.node(root.negative_child().unwrap());
        let pos = tree.node(root.positive_child().unwrap());
        assert_eq!(neg.count(), 1);
        assert_eq!(pos.count(), 2);
    }

    #[test]
    fn test_last_point_below_midpoint_slides_to_max() {
        // last point in scan order is below the x midpoint of 5
        let points = [[10.0, 0.0, 0.0], [6.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let tree = KdTree::from_points(&points, 16).unwrap();
        let root = tree.root();
        assert_eq!(root.partition_coordinate(), Some(10.0));
        let neg = tree.node(root.negative_child().unwrap());
        let pos = tree.node(root.positive_child().unwrap());
        assert_eq!(neg.count(), 2);
        assert_eq!(pos.count(), 1);
        assert_eq!(tree.permutation()[pos.start], 0);
    }

    #[test]
    fn test_nodes_allocated_depth_first() {
        let points: Vec<Point> = (0..8).map(|i| [i as f64, 0.0, 0.0]).collect();
        let mut tree = KdTree::with_params(BuildParams {
            max_points_per_leaf: 1,
            pivot_rule: PivotRule::SlidingMidpoint,
            ..BuildParams::default()
        })
        .unwrap();
        tree.build(&points);

        let root = tree.root();
        let negative = root.negative_child().unwrap();
        assert_eq!(negative.index(), 1);
        assert_eq!(root.positive_child().unwrap().index(), 2);
        // the negative subtree is finished before the positive side gets children
        assert_eq!(tree.node(negative).negative_child().unwrap().index(), 3);
        assert_eq!(tree.leaves().count(), 8);
    }

    #[test]
    fn test_empty_build() {
        let tree = KdTree::from_points(&[], 16).unwrap();
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.root().count(), 0);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_partition_orders_around_pivot() {
        let points: Vec<Point> = [5.0, 1.0, 9.0, 3.0, 7.0, 3.0, 0.0]
            .iter()
            .map(|&x| [x, 0.0, 0.0])
            .collect();
        let mut tree = KdTree::new();
        tree.build(&points);
        for (i, slot) in tree.permutation.iter_mut().enumerate() {
            *slot = i;
        }
        let mid = tree.partition(0, points.len(), 3.0, 0);
        assert_eq!(mid, 2);
        for slot in 0..mid {
            assert!(tree.axis_value(slot, 0) < 3.0);
        }
        for slot in mid..points.len() {
            assert!(tree.axis_value(slot, 0) >= 3.0);
        }
    }

    #[test]
    fn test_rebuild_reuses_arena_and_bumps_generation() {
        let mut tree = KdTree::new();
        let points: Vec<Point> = (0..200).map(|i| [i as f64, (i * 7 % 13) as f64, 0.0]).collect();
        tree.build(&points);
        let old_root = tree.root_id();
        let old_generation = tree.generation();
        let arena = tree.nodes.len();

        tree.build(&points[..50]);
        assert_eq!(tree.generation(), old_generation + 1);
        assert!(tree.get_node(old_root).is_none());
        assert!(tree.get_node(tree.root_id()).is_some());
        assert!(tree.nodes.len() >= arena);
        // buffers never shrink
        assert!(tree.points.len() >= 200);
        assert_eq!(tree.points().len(), 50);
    }

    #[test]
    fn test_invalid_leaf_size() {
        assert_eq!(KdTree::from_points(&golden_points(), 0).err(), Some(KdError::InvalidLeafSize));
        let mut tree = KdTree::new();
        assert_eq!(tree.set_max_points_per_leaf(0), Err(KdError::InvalidLeafSize));
        assert_eq!(tree.params().max_points_per_leaf, DEFAULT_MAX_POINTS_PER_LEAF);
    }

    #[test]
    fn test_build_flat_rejects_ragged_buffer() {
        let mut tree = KdTree::new();
        assert_eq!(tree.build_flat(&[1.0, 2.0]), Err(KdError::InvalidPointBuffer(2)));
        tree.build_flat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(tree.points(), &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }
}
