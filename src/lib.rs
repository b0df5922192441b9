//! # kdthree
//!
//! `kdthree` is a Rust library for nearest-neighbor and range queries over 3D point clouds,
//! designed to be used in Rust as well as compiled to WebAssembly (WASM). It indexes a copy
//! of the caller's points in a k-d tree and answers closest-point, k-nearest, radius and
//! box queries without allocating once its buffers are warm.
//!
//! ## Features
//!
//! - **Sliding midpoint builds**: Nodes are split on their widest axis with a sliding
//!   midpoint pivot and an in-place partition of an index permutation. Duplicate
//!   coordinates are handled by a guard that stops splitting degenerate nodes.
//! - **Best-first search**: k-nearest queries expand the node closest to the query first and
//!   stop as soon as no pending node can beat the current k-th best.
//! - **Reusable state**: Query engines, result heaps and the node arena keep their memory
//!   across queries and rebuilds.
//! - **Parallel batches**: Batch queries run on `rayon` with one query engine per worker.
//! - **WASM-first**: Built with `wasm-bindgen` for seamless integration with JavaScript and TypeScript.
//!
//! ## Example
//!
//! ```
//! use kdthree::{KdQuery, KdTree};
//!
//! let points = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
//! let tree = KdTree::from_points(&points, 16).unwrap();
//!
//! let mut query = KdQuery::new();
//! let nearest = query.k_nearest(&tree, [4.5, 5.0, 6.0], 2).unwrap();
//! assert_eq!(nearest[0].index, 1);
//! ```
//!
//! ## Main Interface
//!
//! Build a [`KdTree`] and run queries through a [`KdQuery`], which owns the traversal buffers.

mod bounds;
mod error;
mod heap;
mod kdtree;
mod node;
mod parallel;
mod query;
mod query_nearest;
mod query_range;
mod wasm;

pub use bounds::BoundingBox;
pub use bounds::Point;
pub use bounds::distance_sq;
pub use error::KdError;
pub use error::Result;
pub use heap::MaxHeap;
pub use heap::DEFAULT_HEAP_CAPACITY;
pub use kdtree::BuildParams;
pub use kdtree::KdTree;
pub use kdtree::PivotRule;
pub use kdtree::DEFAULT_MAX_POINTS_PER_LEAF;
pub use node::KdNode;
pub use node::NodeId;
pub use node::Split;
pub use parallel::par_k_nearest;
pub use parallel::par_radius;
pub use query::KdQuery;
pub use query::Neighbor;
pub use query::QueryNode;
pub use query::RangeHit;
pub use query::DEFAULT_QUERY_CAPACITY;
pub use query_range::Region;
pub use query_range::Sphere;
pub use wasm::KdTree3D;
