use crate::bounds::{distance_sq, Point};
use crate::error::{KdError, Result};
use crate::heap::MaxHeap;
use crate::kdtree::KdTree;
use crate::query::{KdQuery, Neighbor};

impl KdQuery {
    /// Finds the point closest to `query`, or `None` for an empty tree.
    ///
    /// Among points at the same distance the one scanned last wins.
    pub fn closest_point(&mut self, tree: &KdTree, query: Point) -> Option<Neighbor> {
        self.reset();
        if tree.is_empty() {
            return None;
        }

        let points = tree.points();
        let permutation = tree.permutation();
        let mut best: Option<Neighbor> = None;
        let mut best_dist = f64::INFINITY;

        let root = tree.root();
        self.push_to_heap(tree.root_id(), root.bounds.closest_point(&query), &query);

        while let Ok(pending) = self.pop_from_heap() {
            if pending.distance_sq > best_dist {
                break;
            }
            self.visited += 1;

            let node = tree.node(pending.node);
            match node.children() {
                Some(children) => {
                    for child in children {
                        let child_node = tree.node(child);
                        if child_node.count() > 0 {
                            self.push_to_heap(child, child_node.bounds.closest_point(&query), &query);
                        }
                    }
                }
                None => {
                    for &index in &permutation[node.start..node.end] {
                        let d2 = distance_sq(&points[index], &query);
                        if d2 <= best_dist {
                            best_dist = d2;
                            best = Some(Neighbor { index, distance_sq: d2 });
                        }
                    }
                }
            }
        }

        best
    }

    /// Finds the `k` points closest to `query`, nearest first.
    ///
    /// Returns fewer than `k` neighbors when the tree holds fewer points.
    pub fn k_nearest(&mut self, tree: &KdTree, query: Point, k: usize) -> Result<Vec<Neighbor>> {
        let mut results = MaxHeap::with_capacity(k.min(tree.count()) + 1);
        self.k_nearest_into(tree, query, k, &mut results)
    }

    /// Same as [`KdQuery::k_nearest`] using a caller-owned result heap.
    ///
    /// `results` is cleared first and left empty; reuse it across queries to avoid
    /// allocating.
    pub fn k_nearest_into(
        &mut self,
        tree: &KdTree,
        query: Point,
        k: usize,
        results: &mut MaxHeap<usize>,
    ) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(KdError::InvalidK);
        }
        self.reset();
        results.clear();
        if tree.is_empty() {
            return Ok(Vec::new());
        }

        let points = tree.points();
        let permutation = tree.permutation();

        let root = tree.root();
        self.push_to_heap(tree.root_id(), root.bounds.closest_point(&query), &query);

        while let Ok(pending) = self.pop_from_heap() {
            // Nothing left in the heap can beat the current k-th best.
            if results.count() == k && results.head_value().is_some_and(|worst| pending.distance_sq > worst) {
                break;
            }
            self.visited += 1;

            let node = tree.node(pending.node);
            match node.children() {
                Some(children) => {
                    for child in children {
                        let child_node = tree.node(child);
                        if child_node.count() > 0 {
                            self.push_to_heap(child, child_node.bounds.closest_point(&query), &query);
                        }
                    }
                }
                None => {
                    for &index in &permutation[node.start..node.end] {
                        let d2 = distance_sq(&points[index], &query);
                        if results.count() < k {
                            results.push(d2, index);
                        } else if results.head_value().is_some_and(|worst| d2 < worst) {
                            results.replace_head(d2, index)?;
                        }
                    }
                }
            }
        }

        tracing::trace!(k, visited = self.visited, found = results.count(), "k-nearest query");

        let mut found = Vec::with_capacity(results.count());
        results.drain_into(&mut found);
        Ok(found
            .into_iter()
            .rev()
            .map(|(distance_sq, index)| Neighbor { index, distance_sq })
            .collect())
    }
}
