use crate::bounds::BoundingBox;

/// Handle of a node inside a [`KdTree`](crate::KdTree) arena.
///
/// The handle remembers the build generation it was issued in; after a rebuild it no
/// longer resolves through [`KdTree::get_node`](crate::KdTree::get_node).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Partition data of an internal node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Split {
    /// Axis the node was split on (0 = x, 1 = y, 2 = z).
    pub axis: usize,
    /// Split coordinate. Points below it went to `negative`, the rest to `positive`.
    pub coordinate: f64,
    pub negative: NodeId,
    pub positive: NodeId,
}

/// A node of the k-d tree.
///
/// `start..end` is the node's range in the tree's permutation array. Children always tile
/// their parent's range: `negative` covers `start..mid` and `positive` covers `mid..end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KdNode {
    pub start: usize,
    pub end: usize,
    pub bounds: BoundingBox,
    pub split: Option<Split>,
}

impl KdNode {
    pub(crate) fn new(start: usize, end: usize, bounds: BoundingBox) -> Self {
        KdNode {
            start,
            end,
            bounds,
            split: None,
        }
    }

    /// Number of points in the node's range.
    pub fn count(&self) -> usize {
        self.end - self.start
    }

    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }

    pub fn partition_axis(&self) -> Option<usize> {
        self.split.map(|s| s.axis)
    }

    pub fn partition_coordinate(&self) -> Option<f64> {
        self.split.map(|s| s.coordinate)
    }

    pub fn negative_child(&self) -> Option<NodeId> {
        self.split.map(|s| s.negative)
    }

    pub fn positive_child(&self) -> Option<NodeId> {
        self.split.map(|s| s.positive)
    }

    /// Both children as `[negative, positive]`, or `None` for a leaf.
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.split.map(|s| [s.negative, s.positive])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count() {
        let node = KdNode::new(2, 7, BoundingBox::default());
        assert_eq!(node.count(), 5);
    }

    #[test]
    fn test_leaf_has_no_partition() {
        let leaf = KdNode::new(0, 4, BoundingBox::default());
        assert!(leaf.is_leaf());
        assert_eq!(leaf.partition_axis(), None);
        assert_eq!(leaf.children(), None);

        let negative = NodeId { index: 1, generation: 0 };
        let positive = NodeId { index: 2, generation: 0 };
        let mut internal = leaf;
        internal.split = Some(Split { axis: 0, coordinate: 1.5, negative, positive });
        assert!(!internal.is_leaf());
        assert_eq!(internal.partition_axis(), Some(0));
        assert_eq!(internal.partition_coordinate(), Some(1.5));
        assert_eq!(internal.negative_child(), Some(negative));
        assert_eq!(internal.positive_child(), Some(positive));
    }
}
