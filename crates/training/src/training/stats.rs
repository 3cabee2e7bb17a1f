//! Pair statistics over the training words.
//!
//! Holds the aggregate count of every adjacent pair, the reverse index from a pair
//! to the words containing it, and the priority queue used to pick the next merge.
//! After every [`PairStatistics::merge`] the counts equal a full recount.

use super::word::WordModel;
use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use sharif_bpe_core::{MergeCandidate, Pair, PairPriorityQueue};

type PairCounts = AHashMap<Pair, u64>;
type PairIndex = AHashMap<Pair, AHashSet<usize>>;

/// Incrementally maintained pair counts.
#[derive(Debug, Default)]
pub struct PairStatistics {
    queue: PairPriorityQueue,
    /// Pair -> indices of words that contained it at some point.
    ///
    /// Entries are not pruned when a count drops; rewriting a word that no longer
    /// holds the pair is a no-op.
    where_to_update: PairIndex,
}

impl PairStatistics {
    /// Count all pairs of `words` on the current thread.
    pub fn from_words_sequential(words: &[WordModel]) -> Self {
        let mut counts = PairCounts::new();
        let mut index = PairIndex::new();
        for (i, word) in words.iter().enumerate() {
            observe(&mut counts, &mut index, i, word);
        }
        Self::from_parts(counts, index)
    }

    /// Count all pairs of `words` in parallel.
    pub fn from_words_parallel(words: &[WordModel]) -> Self {
        let (counts, index) = words
            .par_iter()
            .enumerate()
            .fold(
                || (PairCounts::new(), PairIndex::new()),
                |(mut counts, mut index), (i, word)| {
                    observe(&mut counts, &mut index, i, word);
                    (counts, index)
                },
            )
            .reduce(
                || (PairCounts::new(), PairIndex::new()),
                |(mut counts, mut index), (other_counts, other_index)| {
                    for (pair, count) in other_counts {
                        *counts.entry(pair).or_insert(0) += count;
                    }
                    for (pair, words) in other_index {
                        index.entry(pair).or_default().extend(words);
                    }
                    (counts, index)
                },
            );
        Self::from_parts(counts, index)
    }

    /// Count all pairs, in parallel if asked.
    pub fn from_words(words: &[WordModel], parallel: bool) -> Self {
        if parallel {
            Self::from_words_parallel(words)
        } else {
            Self::from_words_sequential(words)
        }
    }

    fn from_parts(counts: PairCounts, where_to_update: PairIndex) -> Self {
        Self {
            queue: PairPriorityQueue::from_counts(counts),
            where_to_update,
        }
    }

    /// Remove and return the most frequent pair.
    ///
    /// Ties go to the smallest pair. The pair's count is dropped from the statistics.
    pub fn pop_best(&mut self) -> Option<MergeCandidate> {
        self.queue.pop()
    }

    /// Current count of `pair`.
    pub fn count(&self, pair: Pair) -> u64 {
        self.queue.get_count(pair).unwrap_or(0)
    }

    /// Number of pairs with a positive count.
    pub fn live_pairs(&self) -> usize {
        self.queue.live_pairs()
    }

    /// Check if no pair is left to merge.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Indices of the words that may contain `pair`, ascending.
    pub fn words_with(&self, pair: Pair) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .where_to_update
            .get(&pair)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        indices.sort_unstable();
        indices
    }

    /// Apply the merge `pair -> new_id` to the affected words and update the counts.
    ///
    /// Each word's pair deltas are weighted by its occurrence count. Returns the
    /// number of words that changed.
    pub fn merge(&mut self, words: &mut [WordModel], pair: Pair, new_id: u32) -> usize {
        let affected = match self.where_to_update.remove(&pair) {
            Some(set) => {
                let mut indices: Vec<usize> = set.into_iter().collect();
                indices.sort_unstable();
                indices
            }
            None => return 0,
        };

        let mut deltas: AHashMap<Pair, i64> = AHashMap::new();
        let mut changed = 0;
        for i in affected {
            let word = &mut words[i];
            let weight = word.count() as i64;
            let index = &mut self.where_to_update;
            let replaced = word.merge_pair_cb(pair, new_id, &mut |p, d| {
                if p == pair {
                    return;
                }
                *deltas.entry(p).or_insert(0) += d * weight;
                if d > 0 {
                    index.entry(p).or_default().insert(i);
                }
            });
            if replaced > 0 {
                changed += 1;
            }
        }

        for (p, delta) in deltas {
            if delta == 0 {
                continue;
            }
            let current = self.queue.get_count(p).unwrap_or(0) as i64;
            let updated = current + delta;
            debug_assert!(updated >= 0, "negative count for pair {p:?}");
            self.queue.update(p, updated.max(0) as u64);
        }

        changed
    }

    /// All live counts, sorted by pair.
    pub fn snapshot(&self) -> Vec<(Pair, u64)> {
        let mut counts: Vec<_> = self.queue.counts().collect();
        counts.sort_unstable();
        counts
    }
}

fn observe(counts: &mut PairCounts, index: &mut PairIndex, i: usize, word: &WordModel) {
    for pair in word.pairs() {
        *counts.entry(pair).or_insert(0) += word.count();
        index.entry(pair).or_default().insert(i);
    }
}
