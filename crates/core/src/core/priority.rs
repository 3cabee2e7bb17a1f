//! Priority queue for BPE merge candidates.
//!
//! The queue is the source of truth for live pair counts during training. Count
//! changes push a fresh heap entry; entries whose count no longer matches are
//! discarded lazily on pop.

use crate::core::merges::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;
use std::cmp::{Ordering, Reverse};

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol ids to merge
    pub pair: Pair,
    /// The frequency of this pair across the corpus
    pub count: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64) -> Self {
        Self { pair, count }
    }

    /// Max-heap key: highest count first, then the smallest pair.
    #[inline]
    fn heap_key(&self) -> (u64, Reverse<Pair>) {
        (self.count, Reverse(self.pair))
    }
}

impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
#[derive(Debug)]
pub struct PairPriorityQueue {
    /// The heap storing merge candidates, possibly stale
    heap: OctonaryHeap<MergeCandidate>,
    /// Current count of every live pair
    current_counts: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
            current_counts: AHashMap::new(),
        }
    }

    /// Build a queue from a complete `pair -> count` table.
    pub fn from_counts(counts: AHashMap<Pair, u64>) -> Self {
        let mut heap = OctonaryHeap::with_capacity(counts.len());
        for (&pair, &count) in &counts {
            if count > 0 {
                heap.push(MergeCandidate::new(pair, count));
            }
        }
        let mut current_counts = counts;
        current_counts.retain(|_, count| *count > 0);
        Self {
            heap,
            current_counts,
        }
    }

    /// Pop the highest priority merge candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    /// The returned pair is removed from the live counts.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.current_counts.get(&candidate.pair) == Some(&candidate.count) {
                self.current_counts.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Set the count for a pair.
    ///
    /// Any existing entry for the pair becomes stale. A count of zero removes the pair.
    pub fn update(&mut self, pair: Pair, new_count: u64) {
        if new_count == 0 {
            self.current_counts.remove(&pair);
            return;
        }
        if self.current_counts.insert(pair, new_count) != Some(new_count) {
            self.heap.push(MergeCandidate::new(pair, new_count));
        }
    }

    /// Get the number of (potentially stale) entries in the heap.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.current_counts.is_empty()
    }

    /// Number of pairs with a non-zero count.
    pub fn live_pairs(&self) -> usize {
        self.current_counts.len()
    }

    /// Get the current count for a pair.
    pub fn get_count(&self, pair: Pair) -> Option<u64> {
        self.current_counts.get(&pair).copied()
    }

    /// Iterate over live `(pair, count)` entries in arbitrary order.
    pub fn counts(&self) -> impl Iterator<Item = (Pair, u64)> + '_ {
        self.current_counts.iter().map(|(&pair, &count)| (pair, count))
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_pop() {
        let mut queue = PairPriorityQueue::new();

        queue.update((0, 1), 10);
        queue.update((1, 2), 20);
        queue.update((2, 3), 15);

        let first = queue.pop().unwrap();
        assert_eq!(first.pair, (1, 2));
        assert_eq!(first.count, 20);

        let second = queue.pop().unwrap();
        assert_eq!(second.pair, (2, 3));

        let third = queue.pop().unwrap();
        assert_eq!(third.pair, (0, 1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_ties_pop_smallest_pair() {
        let mut queue = PairPriorityQueue::new();
        queue.update((5, 1), 3);
        queue.update((2, 9), 3);
        queue.update((2, 4), 3);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|c| c.pair).collect();
        assert_eq!(order, vec![(2, 4), (2, 9), (5, 1)]);
    }

    #[test]
    fn test_stale_entry_detection() {
        let mut queue = PairPriorityQueue::new();

        queue.update((0, 1), 10);
        queue.update((1, 2), 20);

        // Update count for (0, 1), making first entry stale
        queue.update((0, 1), 15);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.live_pairs(), 2);

        let first = queue.pop().unwrap();
        assert_eq!(first.pair, (1, 2));

        // (0, 1) with updated count (15), not stale (10)
        let second = queue.pop().unwrap();
        assert_eq!(second.pair, (0, 1));
        assert_eq!(second.count, 15);

        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_count_returning_to_old_value_pops_once() {
        let mut queue = PairPriorityQueue::new();
        queue.update((0, 1), 5);
        queue.update((0, 1), 4);
        queue.update((0, 1), 5);

        assert_eq!(queue.pop(), Some(MergeCandidate::new((0, 1), 5)));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_zero_count_removes_pair() {
        let mut queue = PairPriorityQueue::new();
        queue.update((0, 1), 2);
        queue.update((0, 1), 0);

        assert_eq!(queue.get_count((0, 1)), None);
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_from_counts() {
        let mut counts = AHashMap::new();
        counts.insert((0, 1), 4);
        counts.insert((1, 2), 0);
        counts.insert((2, 3), 7);

        let mut queue = PairPriorityQueue::from_counts(counts);
        assert_eq!(queue.live_pairs(), 2);
        assert_eq!(queue.pop().map(|c| c.pair), Some((2, 3)));
        assert_eq!(queue.pop().map(|c| c.pair), Some((0, 1)));
        assert!(queue.pop().is_none());
    }
}
