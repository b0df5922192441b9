use crate::error::{KdError, Result};

/// Initial number of slots reserved by [`MaxHeap::new`].
pub const DEFAULT_HEAP_CAPACITY: usize = 2048;

/// Array-backed binary max-heap keyed by `f64` priorities.
///
/// The k-nearest search uses it as a bounded result set: the head is always the worst of
/// the best candidates found so far. `T` carries a payload next to each priority (the
/// point index for query results); `MaxHeap<()>` is a plain heap of values.
///
/// The backing storage grows when full and is never released by [`MaxHeap::clear`], so a
/// heap reused across many queries stops allocating once it has reached its working size.
#[derive(Clone, Debug)]
pub struct MaxHeap<T = ()> {
    nodes: Vec<(f64, T)>,
}

impl<T> Default for MaxHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MaxHeap<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HEAP_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MaxHeap {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of entries currently stored.
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of entries the heap can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Largest priority in the heap.
    pub fn head_value(&self) -> Option<f64> {
        self.nodes.first().map(|(value, _)| *value)
    }

    /// Largest priority and its payload.
    pub fn head(&self) -> Option<(f64, &T)> {
        self.nodes.first().map(|(value, item)| (*value, item))
    }

    pub fn push(&mut self, value: f64, item: T) {
        self.nodes.push((value, item));
        self.sift_up(self.nodes.len() - 1);
    }

    /// Removes and returns the entry with the largest priority.
    pub fn pop(&mut self) -> Result<(f64, T)> {
        if self.nodes.is_empty() {
            return Err(KdError::EmptyHeap);
        }
        let head = self.nodes.swap_remove(0);
        if !self.nodes.is_empty() {
            self.sift_down(0);
        }
        Ok(head)
    }

    /// Replaces the head with a new entry, returning the old head.
    ///
    /// Equivalent to a pop followed by a push, with a single sift.
    pub fn replace_head(&mut self, value: f64, item: T) -> Result<(f64, T)> {
        if self.nodes.is_empty() {
            return Err(KdError::EmptyHeap);
        }
        let old = std::mem::replace(&mut self.nodes[0], (value, item));
        self.sift_down(0);
        Ok(old)
    }

    /// Empties the heap while keeping its allocation.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Pops every entry into `values` and `items`, largest priority first.
    pub fn flush_result(&mut self, values: &mut Vec<f64>, items: &mut Vec<T>) {
        values.reserve(self.nodes.len());
        items.reserve(self.nodes.len());
        while let Ok((value, item)) = self.pop() {
            values.push(value);
            items.push(item);
        }
    }

    /// Pops every entry into `sink` as `(priority, item)` pairs, largest priority first.
    pub fn drain_into(&mut self, sink: &mut Vec<(f64, T)>) {
        sink.reserve(self.nodes.len());
        while let Ok(entry) = self.pop() {
            sink.push(entry);
        }
    }

    /// Pops every priority into `sink`, largest first. Payloads are dropped.
    pub fn flush_heap_result(&mut self, sink: &mut Vec<f64>) {
        sink.reserve(self.nodes.len());
        while let Ok((value, _)) = self.pop() {
            sink.push(value);
        }
    }

    fn sift_up(&mut self, mut child: usize) {
        while child > 0 {
            let parent = (child - 1) / 2;
            if self.nodes[parent].0 >= self.nodes[child].0 {
                break;
            }
            self.nodes.swap(parent, child);
            child = parent;
        }
    }

    fn sift_down(&mut self, mut parent: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * parent + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let larger = if right < len && self.nodes[right].0 > self.nodes[left].0 { right } else { left };
            if self.nodes[parent].0 >= self.nodes[larger].0 {
                break;
            }
            self.nodes.swap(parent, larger);
            parent = larger;
        }
    }
}

impl MaxHeap<()> {
    pub fn push_value(&mut self, value: f64) {
        self.push(value, ());
    }

    pub fn pop_value(&mut self) -> Result<f64> {
        self.pop().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_new_heap_is_empty() {
        let heap: MaxHeap = MaxHeap::new();
        assert_eq!(heap.count(), 0);
        assert!(heap.capacity() >= DEFAULT_HEAP_CAPACITY);
        assert_eq!(heap.head_value(), None);
    }

    #[test]
    fn test_push_single() {
        let mut heap: MaxHeap = MaxHeap::new();
        heap.push_value(1.0);
        assert_eq!(heap.count(), 1);
        assert_eq!(heap.head_value(), Some(1.0));
    }

    #[test]
    fn test_push_past_capacity_grows() {
        let mut heap: MaxHeap = MaxHeap::with_capacity(2);
        heap.push_value(1.0);
        heap.push_value(2.0);
        heap.push_value(3.0);
        assert_eq!(heap.count(), 3);
        assert!(heap.capacity() >= 3);
        assert_eq!(heap.head_value(), Some(3.0));
    }

    #[test]
    fn test_pop_empty_is_error() {
        let mut heap: MaxHeap = MaxHeap::new();
        assert_eq!(heap.pop_value(), Err(KdError::EmptyHeap));
        let mut items: MaxHeap<usize> = MaxHeap::new();
        assert_eq!(items.replace_head(1.0, 0), Err(KdError::EmptyHeap));
    }

    #[test]
    fn test_pop_returns_max() {
        let mut heap: MaxHeap = MaxHeap::new();
        heap.push_value(1.0);
        heap.push_value(3.0);
        heap.push_value(2.0);
        assert_eq!(heap.pop_value(), Ok(3.0));
        assert_eq!(heap.count(), 2);
        assert_eq!(heap.head_value(), Some(2.0));
    }

    #[test]
    fn test_clear_keeps_allocation() {
        let mut heap: MaxHeap = MaxHeap::with_capacity(16);
        for i in 0..10 {
            heap.push_value(i as f64);
        }
        let capacity = heap.capacity();
        heap.clear();
        assert_eq!(heap.count(), 0);
        assert_eq!(heap.capacity(), capacity);
    }

    #[test]
    fn test_flush_is_descending() {
        let mut heap: MaxHeap = MaxHeap::with_capacity(10);
        heap.push_value(1.0);
        heap.push_value(3.0);
        heap.push_value(2.0);
        let mut out = Vec::new();
        heap.flush_heap_result(&mut out);
        assert_eq!(out, vec![3.0, 2.0, 1.0]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_payload_follows_priority() {
        let mut heap: MaxHeap<char> = MaxHeap::new();
        heap.push(4.0, 'a');
        heap.push(9.0, 'b');
        heap.push(1.0, 'c');
        assert_eq!(heap.head(), Some((9.0, &'b')));
        assert_eq!(heap.replace_head(0.5, 'd'), Ok((9.0, 'b')));

        let mut values = Vec::new();
        let mut items = Vec::new();
        heap.flush_result(&mut values, &mut items);
        assert_eq!(values, vec![4.0, 1.0, 0.5]);
        assert_eq!(items, vec!['a', 'c', 'd']);
    }

    #[test]
    fn test_head_tracks_max_under_random_ops() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut heap: MaxHeap = MaxHeap::with_capacity(4);
        let mut reference: Vec<f64> = Vec::new();

        for _ in 0..2000 {
            if reference.is_empty() || rng.gen_bool(0.6) {
                let v = rng.gen_range(-100.0..100.0);
                heap.push_value(v);
                reference.push(v);
            } else {
                let popped = heap.pop_value().unwrap();
                let (pos, _) = reference
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                    .unwrap();
                assert_eq!(popped, reference.swap_remove(pos));
            }

            let expected = reference.iter().cloned().fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            });
            assert_eq!(heap.head_value(), expected);
            assert_eq!(heap.count(), reference.len());
        }
    }
}
