//! Merge rule management for BPE.
//!
//! Merge rules are stored using symbol ids rather than strings for fast comparison.
//! The rule list is kept in learned order, which is also the application priority.

use ahash::AHashMap;

/// A pair of symbol ids that can be merged.
pub type Pair = (u32, u32);

/// Merge rule lookup: pair -> (rank, new_symbol_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// A single learned merge: `(left, right) -> id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRule {
    pub left: u32,
    pub right: u32,
    /// The symbol created by this merge.
    pub id: u32,
}

impl MergeRule {
    /// The pair this rule merges.
    #[inline]
    pub fn pair(&self) -> Pair {
        (self.left, self.right)
    }
}

/// Ordered collection of BPE merge rules with an id-pair index.
///
/// Rule `i` always produces symbol `first_id + i`.
#[derive(Debug, Clone)]
pub struct MergeRules {
    /// Rules in learned order.
    rules: Vec<MergeRule>,
    /// pair -> (rank, new_symbol_id)
    index: MergeMap,
    /// Id produced by rank 0.
    first_id: u32,
}

impl MergeRules {
    /// Create an empty rule list whose first rule will produce `first_id`.
    pub fn new(first_id: u32) -> Self {
        Self {
            rules: Vec::new(),
            index: MergeMap::new(),
            first_id,
        }
    }

    /// Create an empty rule list with capacity.
    pub fn with_capacity(first_id: u32, capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
            index: MergeMap::with_capacity(capacity),
            first_id,
        }
    }

    /// Append a merge rule and return the id it produces.
    ///
    /// A pair that is already present keeps its earlier rank in the index.
    pub fn push(&mut self, pair: Pair) -> u32 {
        let rank = self.rules.len() as u32;
        let id = self.first_id + rank;
        self.rules.push(MergeRule {
            left: pair.0,
            right: pair.1,
            id,
        });
        self.index.entry(pair).or_insert((rank, id));
        id
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns `Some((rank, new_symbol_id))` if this pair should be merged.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.index.get(&pair).copied()
    }

    /// The rule at `rank`.
    #[inline]
    pub fn rule(&self, rank: usize) -> Option<&MergeRule> {
        self.rules.get(rank)
    }

    /// Iterate over the rules in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &MergeRule> + '_ {
        self.rules.iter()
    }

    /// The id produced by rank 0.
    #[inline]
    pub fn first_id(&self) -> u32 {
        self.first_id
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl PartialEq for MergeRules {
    fn eq(&self, other: &Self) -> bool {
        self.first_id == other.first_id && self.rules == other.rules
    }
}

impl Eq for MergeRules {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push() {
        let mut rules = MergeRules::new(256);
        assert_eq!(rules.push((0, 1)), 256);
        assert_eq!(rules.push((1, 2)), 257);

        assert_eq!(rules.get((0, 1)), Some((0, 256)));
        assert_eq!(rules.get((1, 2)), Some((1, 257)));
        assert_eq!(rules.get((2, 3)), None);
        assert_eq!(rules.rule(1).map(MergeRule::pair), Some((1, 2)));
    }

    #[test]
    fn test_duplicate_pair_keeps_first_rank() {
        let mut rules = MergeRules::new(4);
        rules.push((0, 1));
        rules.push((0, 1));
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get((0, 1)), Some((0, 4)));
    }
}
