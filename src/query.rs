use crate::bounds::{distance_sq, Point};
use crate::error::{KdError, Result};
use crate::node::NodeId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Initial size of the traversal buffers of a [`KdQuery`].
pub const DEFAULT_QUERY_CAPACITY: usize = 2048;

/// A pending node of a traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryNode {
    pub node: NodeId,
    /// Closest point of the node's bounds to the query.
    pub closest_point: Point,
    /// Squared distance from the query to `closest_point`. Zero in queue mode.
    pub distance_sq: f64,
}

/// A point found by a nearest-neighbor query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Index of the point in the slice the tree was built from.
    pub index: usize,
    pub distance_sq: f64,
}

/// A point found by a range query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeHit {
    pub index: usize,
    pub point: Point,
}

struct HeapEntry(QueryNode);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.distance_sq == other.0.distance_sq
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for Min-Heap behavior
        other.0.distance_sq.partial_cmp(&self.0.distance_sq).unwrap_or(Ordering::Equal)
    }
}

/// Reusable traversal state for queries against a [`KdTree`](crate::KdTree).
///
/// Holds two traversal modes over the same node graph:
/// - **queue mode**, a FIFO used by range queries where every candidate node is visited;
/// - **heap mode**, a min-heap keyed by squared distance used by nearest-neighbor queries so
///   the node closest to the query is always expanded next.
///
/// Buffers only grow, so an engine reused across many queries stops allocating. An engine
/// is not shareable between concurrent queries; give each thread its own (see
/// [`par_k_nearest`](crate::par_k_nearest)). One engine can query different trees.
pub struct KdQuery {
    queue: Vec<QueryNode>,
    queue_cursor: usize,
    min_heap: BinaryHeap<HeapEntry>,
    pub(crate) visited: usize,
}

impl Default for KdQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl KdQuery {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUERY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        KdQuery {
            queue: Vec::with_capacity(capacity),
            queue_cursor: 0,
            min_heap: BinaryHeap::with_capacity(capacity),
            visited: 0,
        }
    }

    /// Appends a node to the FIFO queue.
    pub fn push_to_queue(&mut self, node: NodeId, closest_point: Point) {
        self.queue.push(QueryNode {
            node,
            closest_point,
            distance_sq: 0.0,
        });
    }

    /// Removes the oldest unprocessed node from the FIFO queue.
    pub fn pop_from_queue(&mut self) -> Result<QueryNode> {
        let node = *self.queue.get(self.queue_cursor).ok_or(KdError::EmptyQueue)?;
        self.queue_cursor += 1;
        Ok(node)
    }

    /// Number of queued nodes not yet popped.
    pub fn left_to_process(&self) -> usize {
        self.queue.len() - self.queue_cursor
    }

    /// Number of nodes pushed to the queue since the last reset, popped or not.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Inserts a node into the min-heap keyed by its squared distance to `query`.
    pub fn push_to_heap(&mut self, node: NodeId, closest_point: Point, query: &Point) {
        self.min_heap.push(HeapEntry(QueryNode {
            node,
            closest_point,
            distance_sq: distance_sq(&closest_point, query),
        }));
    }

    /// The pending node closest to the query.
    pub fn head_heap_object(&self) -> Option<&QueryNode> {
        self.min_heap.peek().map(|entry| &entry.0)
    }

    pub fn pop_from_heap(&mut self) -> Result<QueryNode> {
        self.min_heap.pop().map(|entry| entry.0).ok_or(KdError::EmptyQueue)
    }

    pub fn heap_count(&self) -> usize {
        self.min_heap.len()
    }

    /// Number of nodes the last query expanded.
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Clears both traversal modes, keeping their allocations.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.queue_cursor = 0;
        self.min_heap.clear();
        self.visited = 0;
    }
}
