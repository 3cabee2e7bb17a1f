//! The trained BPE model: a symbol table plus the ordered merge rules.

use crate::core::{MergeRules, Pair, SymbolTable};
use crate::error::Result;
use crate::split::{SplitPolicy, Splitter};

/// A learned BPE model.
///
/// Merge rule `i` produces symbol `base_size + i`, so the symbol table and the rule
/// list always grow together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    symbols: SymbolTable,
    merges: MergeRules,
    split: SplitPolicy,
}

impl Model {
    /// Create a model with the given base alphabet and no merges.
    pub fn new(base_units: impl IntoIterator<Item = u8>, split: SplitPolicy) -> Self {
        let symbols = SymbolTable::with_base_units(base_units);
        let merges = MergeRules::new(symbols.len() as u32);
        Self {
            symbols,
            merges,
            split,
        }
    }

    /// Rebuild a model from its serialized parts.
    ///
    /// Fails with [`crate::BpeError::UnknownSymbol`] if a rule references an id that
    /// does not exist yet at its rank.
    pub fn from_parts(
        base_units: impl IntoIterator<Item = u8>,
        merges: impl IntoIterator<Item = Pair>,
        split: SplitPolicy,
    ) -> Result<Self> {
        let mut model = Self::new(base_units, split);
        for (left, right) in merges {
            model.push_merge(left, right)?;
        }
        Ok(model)
    }

    /// Append a merge rule and return the id of the new symbol.
    pub fn push_merge(&mut self, left: u32, right: u32) -> Result<u32> {
        let id = self.symbols.create_merged(left, right)?;
        let rule_id = self.merges.push((left, right));
        debug_assert_eq!(id, rule_id);
        Ok(id)
    }

    /// The symbol table.
    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The merge rules, in rank order.
    #[inline]
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// The word splitting policy used to train this model.
    #[inline]
    pub fn split_policy(&self) -> SplitPolicy {
        self.split
    }

    /// A splitter applying this model's policy.
    #[inline]
    pub fn splitter(&self) -> Splitter {
        Splitter::new(self.split)
    }

    /// Total number of symbols.
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.symbols.len()
    }

    /// Number of base symbols.
    #[inline]
    pub fn base_size(&self) -> usize {
        self.symbols.base_len()
    }

    /// Number of merge rules.
    #[inline]
    pub fn merge_count(&self) -> usize {
        self.merges.len()
    }

    /// Concatenate the byte expansions of `ids`.
    pub fn decode(&self, ids: &[u32]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(ids.len() * 2);
        for &id in ids {
            self.symbols.decode_into(id, &mut out)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BpeError;

    #[test]
    fn test_push_merge_keeps_table_and_rules_aligned() {
        let mut model = Model::new(0..=u8::MAX, SplitPolicy::Whitespace);
        let id = model.push_merge(b'H' as u32, b'e' as u32).unwrap();

        assert_eq!(id, 256);
        assert_eq!(model.vocab_size(), 257);
        assert_eq!(model.merge_count(), 1);
        assert_eq!(model.merges().get((72, 101)), Some((0, 256)));
        assert_eq!(model.decode(&[256, b'y' as u32]).unwrap(), b"Hey");
    }

    #[test]
    fn test_from_parts_rejects_forward_reference() {
        let err = Model::from_parts(*b"ab", vec![(0, 1), (2, 3)], SplitPolicy::Whitespace)
            .unwrap_err();
        assert!(matches!(err, BpeError::UnknownSymbol(3)));
    }

    #[test]
    fn test_equality_covers_rules_and_policy() {
        let a = Model::from_parts(*b"ab", vec![(0, 1)], SplitPolicy::Whitespace).unwrap();
        let b = Model::from_parts(*b"ab", vec![(0, 1)], SplitPolicy::Whitespace).unwrap();
        let c = Model::from_parts(*b"ab", vec![(1, 0)], SplitPolicy::Whitespace).unwrap();
        let d = Model::from_parts(*b"ab", vec![(0, 1)], SplitPolicy::Gpt2).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
