//! A size-capped priority queue that keeps the lowest-priority entries seen so far.

use crate::error::{KnnTreeError, Result};

/// A min-priority queue holding at most `max_size` entries.
///
/// Enqueueing always inserts; if that pushes the queue over capacity, the single entry with the
/// highest priority is evicted. The queue therefore always holds the `max_size` lowest-priority
/// entries among everything enqueued so far. A capacity of zero is valid and keeps the queue
/// permanently empty.
///
/// Entries are kept in a vector sorted ascending by priority (compared with [`f64::total_cmp`]).
/// A new entry is placed after every existing entry of equal priority, so equal priorities
/// dequeue in insertion order, and on overflow the most recently enqueued of the equal maxima is
/// the one evicted. This is intended for the small `k` of a nearest neighbor search, where the
/// linear shift on insert is cheaper than a pair of heaps.
///
/// ```
/// use knn_tree::bpq::BoundedPriorityQueue;
///
/// let mut queue = BoundedPriorityQueue::new(2);
/// queue.enqueue("c", 3.0);
/// queue.enqueue("a", 1.0);
/// queue.enqueue("b", 2.0);
///
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue.worst(), 2.0);
/// assert_eq!(queue.dequeue_min().unwrap(), "a");
/// ```
#[derive(Debug, Clone)]
pub struct BoundedPriorityQueue<T> {
    elems: Vec<(f64, T)>,
    max_size: usize,
}

impl<T> BoundedPriorityQueue<T> {
    /// Create an empty queue that will hold at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            // Capacity is max_size + 1 to hold the entry about to be evicted
            elems: Vec::with_capacity(max_size.saturating_add(1).min(1024)),
            max_size,
        }
    }

    /// Add an entry, then evict the highest-priority entry if the queue is over capacity.
    pub fn enqueue(&mut self, value: T, priority: f64) {
        let pos = self
            .elems
            .partition_point(|(p, _)| p.total_cmp(&priority).is_le());
        self.elems.insert(pos, (priority, value));

        if self.elems.len() > self.max_size {
            self.elems.pop();
        }
    }

    /// Remove and return the entry with the smallest priority.
    pub fn dequeue_min(&mut self) -> Result<T> {
        if self.elems.is_empty() {
            return Err(KnnTreeError::EmptyCollection);
        }
        Ok(self.elems.remove(0).1)
    }

    /// The entry that [`dequeue_min`][Self::dequeue_min] would return, with its priority.
    pub fn peek_min(&self) -> Option<(&T, f64)> {
        self.elems.first().map(|(p, v)| (v, *p))
    }

    /// The smallest priority stored, or positive infinity if empty.
    #[inline]
    pub fn best(&self) -> f64 {
        self.elems.first().map_or(f64::INFINITY, |(p, _)| *p)
    }

    /// The largest priority stored, or positive infinity if empty.
    ///
    /// Once the queue is full, any entry enqueued with a priority above this is evicted
    /// immediately.
    #[inline]
    pub fn worst(&self) -> f64 {
        self.elems.last().map_or(f64::INFINITY, |(p, _)| *p)
    }

    /// The number of entries currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Returns `true` if the queue holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// The capacity fixed at construction.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether the queue holds `max_size` entries.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.elems.len() >= self.max_size
    }

    /// Iterate over entries in ascending priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> + '_ {
        self.elems.iter().map(|(p, v)| (v, *p))
    }

    /// Consume the queue, returning its entries in ascending priority order.
    pub fn into_sorted_vec(self) -> Vec<(T, f64)> {
        self.elems.into_iter().map(|(p, v)| (v, p)).collect()
    }

    /// Remove every entry. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.elems.clear();
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn empty_queue() {
        let mut queue = BoundedPriorityQueue::<u32>::new(3);
        assert!(queue.is_empty());
        assert_eq!(queue.best(), f64::INFINITY);
        assert_eq!(queue.worst(), f64::INFINITY);
        assert_eq!(queue.dequeue_min(), Err(KnnTreeError::EmptyCollection));
        assert!(queue.peek_min().is_none());
    }

    #[test]
    fn zero_capacity_stays_empty() {
        let mut queue = BoundedPriorityQueue::new(0);
        queue.enqueue('a', 1.0);
        queue.enqueue('b', -5.0);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.max_size(), 0);
        assert!(queue.is_full());
        assert_eq!(queue.worst(), f64::INFINITY);
    }

    #[test]
    fn evicts_highest_priority() {
        let mut queue = BoundedPriorityQueue::new(3);
        for (value, priority) in [(1, 5.0), (2, 1.0), (3, 4.0), (4, 2.0), (5, 9.0)] {
            queue.enqueue(value, priority);
            assert!(queue.len() <= 3);
        }

        assert!(queue.is_full());
        assert_eq!(queue.best(), 1.0);
        assert_eq!(queue.worst(), 4.0);
        assert_eq!(queue.into_sorted_vec(), vec![(2, 1.0), (4, 2.0), (3, 4.0)]);
    }

    #[test]
    fn equal_priorities_dequeue_in_insertion_order() {
        let mut queue = BoundedPriorityQueue::new(3);
        queue.enqueue("first", 1.0);
        queue.enqueue("second", 1.0);
        queue.enqueue("third", 1.0);
        // Evicts the newest of the equal maxima
        queue.enqueue("fourth", 1.0);

        assert_eq!(queue.dequeue_min().unwrap(), "first");
        assert_eq!(queue.dequeue_min().unwrap(), "second");
        assert_eq!(queue.dequeue_min().unwrap(), "third");
        assert!(queue.is_empty());
    }

    #[test]
    fn retains_k_smallest_of_random_stream() {
        let mut rng = StdRng::seed_from_u64(42);

        for k in [1, 2, 5, 17] {
            let mut queue = BoundedPriorityQueue::new(k);
            let mut seen: Vec<f64> = vec![];

            for i in 0..200 {
                let priority: f64 = rng.gen_range(-100.0..100.0);
                queue.enqueue(i, priority);
                seen.push(priority);

                assert!(queue.len() <= k);

                let mut expected = seen.clone();
                expected.sort_by(f64::total_cmp);
                expected.truncate(k);
                let retained: Vec<f64> = queue.iter().map(|(_, p)| p).collect();
                assert_eq!(retained, expected);
            }
        }
    }

    #[test]
    fn drains_in_non_decreasing_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut queue = BoundedPriorityQueue::new(50);
        for i in 0..50 {
            queue.enqueue(i, rng.gen_range(0.0..10.0));
        }

        let mut last = f64::NEG_INFINITY;
        while !queue.is_empty() {
            let best = queue.best();
            assert!(best >= last);
            last = best;
            let expected = *queue.peek_min().unwrap().0;
            assert_eq!(queue.dequeue_min().unwrap(), expected);
        }
        assert_eq!(queue.best(), f64::INFINITY);
    }
}
