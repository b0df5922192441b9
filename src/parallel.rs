use crate::bounds::Point;
use crate::error::{KdError, Result};
use crate::heap::MaxHeap;
use crate::kdtree::KdTree;
use crate::query::{KdQuery, Neighbor, RangeHit};
use crate::query_range::Sphere;
use rayon::prelude::*;

/// Runs a k-nearest query for every point of `queries` in parallel.
///
/// Each rayon worker gets its own [`KdQuery`] and result heap; the tree is only read.
/// Results are in the order of `queries`.
pub fn par_k_nearest(tree: &KdTree, queries: &[Point], k: usize) -> Result<Vec<Vec<Neighbor>>> {
    if k == 0 {
        return Err(KdError::InvalidK);
    }

    queries
        .par_iter()
        .map_init(
            || (KdQuery::new(), MaxHeap::with_capacity(k.min(tree.count()) + 1)),
            |(query, results), &q| query.k_nearest_into(tree, q, k, results),
        )
        .collect()
}

/// Runs a radius query around every point of `centers` in parallel.
pub fn par_radius(tree: &KdTree, centers: &[Point], radius: f64) -> Result<Vec<Vec<RangeHit>>> {
    // validate once up front; every sphere shares the radius
    Sphere::new([0.0; 3], radius)?;

    centers
        .par_iter()
        .map_init(KdQuery::new, |query, &center| query.radius(tree, center, radius))
        .collect()
}
