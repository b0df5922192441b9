use crate::bounds::BoundingBox;
use crate::heap::MaxHeap;
use crate::kdtree::{BuildParams, KdTree};
use crate::query::KdQuery;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

/// JavaScript facing k-d tree.
///
/// Owns a tree together with one query engine and one result heap, so repeated queries
/// from JS do not allocate. Points cross the boundary as flat `[x, y, z, ...]` arrays and
/// results as point indices.
#[wasm_bindgen]
pub struct KdTree3D {
    tree: KdTree,
    query: KdQuery,
    results: MaxHeap<usize>,
}

#[wasm_bindgen]
impl KdTree3D {
    /// Creates an empty tree.
    ///
    /// # Arguments
    ///
    /// * `max_points_per_leaf` - Nodes with more points than this are split further.
    #[wasm_bindgen(constructor)]
    pub fn new(max_points_per_leaf: usize) -> Result<KdTree3D, JsError> {
        let tree = KdTree::with_params(BuildParams {
            max_points_per_leaf,
            ..BuildParams::default()
        })?;
        Ok(KdTree3D {
            tree,
            query: KdQuery::new(),
            results: MaxHeap::new(),
        })
    }

    /// Builds the tree over a flat array of coordinates `[x, y, z, x, y, z, ...]`.
    pub fn build(&mut self, points: &[f64]) -> Result<(), JsError> {
        self.tree.build_flat(points)?;
        Ok(())
    }

    /// Rebuilds after points were moved with `set_point`.
    pub fn rebuild(&mut self) {
        self.tree.rebuild();
    }

    /// Returns the number of indexed points.
    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.tree.count()
    }

    /// Returns a flat array of all point coordinates.
    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> {
        self.tree.points().iter().flatten().copied().collect()
    }

    /// Moves a single point. Queries see the change after `rebuild`.
    pub fn set_point(&mut self, index: usize, x: f64, y: f64, z: f64) {
        if let Some(p) = self.tree.points_mut().get_mut(index) {
            *p = [x, y, z];
        }
    }

    /// Index of the point closest to `(x, y, z)`, or -1 for an empty tree.
    pub fn closest(&mut self, x: f64, y: f64, z: f64) -> i32 {
        self.query
            .closest_point(&self.tree, [x, y, z])
            .map_or(-1, |n| n.index as i32)
    }

    /// Indices of the `k` points closest to `(x, y, z)`, nearest first.
    pub fn k_nearest(&mut self, x: f64, y: f64, z: f64, k: usize) -> Result<Vec<u32>, JsError> {
        let hits = self.query.k_nearest_into(&self.tree, [x, y, z], k, &mut self.results)?;
        Ok(hits.iter().map(|n| n.index as u32).collect())
    }

    /// Squared distances matching `k_nearest`.
    pub fn k_nearest_distances(&mut self, x: f64, y: f64, z: f64, k: usize) -> Result<Vec<f64>, JsError> {
        let hits = self.query.k_nearest_into(&self.tree, [x, y, z], k, &mut self.results)?;
        Ok(hits.iter().map(|n| n.distance_sq).collect())
    }

    /// Indices of all points within `r` of `(x, y, z)`.
    pub fn radius(&mut self, x: f64, y: f64, z: f64, r: f64) -> Result<Vec<u32>, JsError> {
        let hits = self.query.radius(&self.tree, [x, y, z], r)?;
        Ok(hits.iter().map(|h| h.index as u32).collect())
    }

    /// Indices of all points inside the given axis-aligned box.
    pub fn interval(&mut self, min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Vec<u32> {
        self.query
            .interval(&self.tree, [min_x, min_y, min_z], [max_x, max_y, max_z])
            .iter()
            .map(|h| h.index as u32)
            .collect()
    }

    /// Generates random points within the given box and builds the tree over them.
    pub fn random_points(&mut self, count: usize, min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) {
        let bounds = BoundingBox::new([min_x, min_y, min_z], [max_x, max_y, max_z]);
        let mut rng = StdRng::seed_from_u64(get_seed());
        let points = bounds.random_points(count, &mut rng);
        self.tree.build(&points);
    }
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_queries() {
        let mut tree = KdTree3D::new(4).ok().unwrap();
        tree.build(&[0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 10.0, 0.0, 0.0]).ok().unwrap();
        assert_eq!(tree.count(), 3);
        assert_eq!(tree.closest(6.0, 0.0, 0.0), 1);
        assert_eq!(tree.interval(-1.0, -1.0, -1.0, 6.0, 1.0, 1.0).len(), 2);

        tree.set_point(0, 20.0, 0.0, 0.0);
        tree.rebuild();
        assert_eq!(tree.closest(19.0, 0.0, 0.0), 0);
        assert_eq!(tree.points()[0], 20.0);
    }

    #[test]
    fn test_random_points_fill_tree() {
        let mut tree = KdTree3D::new(8).ok().unwrap();
        tree.random_points(500, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        assert_eq!(tree.count(), 500);
        assert!(tree.points().iter().all(|&c| (0.0..=1.0).contains(&c)));
    }
}
