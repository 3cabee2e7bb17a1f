//! Corpus words as mutable symbol sequences.

use sharif_bpe_core::{BpeError, Pair, Result, SymbolTable};

/// One distinct corpus word: its current symbols and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordModel {
    symbols: Vec<u32>,
    count: u64,
}

impl WordModel {
    /// Create a word from a list of symbol ids.
    pub fn new(symbols: Vec<u32>, count: u64) -> Self {
        Self { symbols, count }
    }

    /// Create a word from its text, mapping every byte to its base symbol.
    pub fn from_text(word: &str, count: u64, table: &SymbolTable) -> Result<Self> {
        let symbols = word
            .bytes()
            .map(|byte| {
                table.base_id(byte).ok_or_else(|| BpeError::UnknownBaseUnit {
                    word: word.to_string(),
                    byte,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { symbols, count })
    }

    /// The current symbol sequence.
    #[inline]
    pub fn symbols(&self) -> &[u32] {
        &self.symbols
    }

    /// Number of occurrences of this word in the corpus.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Get the number of symbols in this word.
    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Iterate over adjacent symbol pairs.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.symbols.windows(2).map(|w| (w[0], w[1]))
    }

    /// Replace every non-overlapping occurrence of `pair`, left to right, with `new_id`.
    ///
    /// `on_delta` receives each change to this word's neighbouring pairs: `-1` for a
    /// pair that disappeared, `+1` for one that was created. The merged pair itself is
    /// not reported. Returns the number of replacements.
    pub fn merge_pair_cb<F>(&mut self, pair: Pair, new_id: u32, on_delta: &mut F) -> usize
    where
        F: FnMut(Pair, i64),
    {
        let (a, b) = pair;
        let n = self.symbols.len();
        if n < 2 {
            return 0;
        }

        let mut replaced = 0;
        let mut write = 0;
        let mut read = 0;
        while read < n {
            if read + 1 < n && self.symbols[read] == a && self.symbols[read + 1] == b {
                if write > 0 {
                    let prev = self.symbols[write - 1];
                    on_delta((prev, a), -1);
                    on_delta((prev, new_id), 1);
                }
                if read + 2 < n {
                    let next = self.symbols[read + 2];
                    on_delta((b, next), -1);
                    on_delta((new_id, next), 1);
                }
                self.symbols[write] = new_id;
                write += 1;
                read += 2;
                replaced += 1;
            } else {
                self.symbols[write] = self.symbols[read];
                write += 1;
                read += 1;
            }
        }
        self.symbols.truncate(write);
        replaced
    }

    /// Same as [`WordModel::merge_pair_cb`], collecting the deltas into a list.
    pub fn merge_pair(&mut self, pair: Pair, new_id: u32) -> Vec<(Pair, i64)> {
        let mut deltas = Vec::with_capacity(4);
        self.merge_pair_cb(pair, new_id, &mut |p, d| deltas.push((p, d)));
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let table = SymbolTable::with_byte_alphabet();
        let word = WordModel::from_text("hello", 3, &table).unwrap();
        assert_eq!(word.symbols(), &[104, 101, 108, 108, 111]);
        assert_eq!(word.count(), 3);
    }

    #[test]
    fn test_from_text_unknown_byte() {
        let table = SymbolTable::with_base_units(*b"helo");
        let err = WordModel::from_text("help", 1, &table).unwrap_err();
        assert!(matches!(err, BpeError::UnknownBaseUnit { byte: b'p', .. }));
    }

    #[test]
    fn test_pairs() {
        let word = WordModel::new(vec![1, 2, 3], 1);
        assert_eq!(word.pairs().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn test_merge_pair() {
        let mut word = WordModel::new(vec![1, 2, 3, 1, 2, 2, 1], 1);

        let deltas = word.merge_pair((1, 2), 9);
        assert_eq!(word.symbols(), &[9, 3, 9, 2, 1]);

        assert_eq!(
            deltas,
            vec![
                // first match
                ((2, 3), -1),
                ((9, 3), 1),
                // second match
                ((3, 1), -1),
                ((3, 9), 1),
                ((2, 2), -1),
                ((9, 2), 1),
            ]
        );
    }

    #[test]
    fn test_merge_overlapping_run() {
        let mut word = WordModel::new(vec![5, 5, 5, 5, 5], 1);
        let deltas = word.merge_pair((5, 5), 7);
        assert_eq!(word.symbols(), &[7, 7, 5]);

        let mut net = ahash::AHashMap::new();
        for (pair, delta) in deltas {
            *net.entry(pair).or_insert(0i64) += delta;
        }
        net.retain(|_, d| *d != 0);
        // Before: (5,5) x4. After: (7,7) x1, (7,5) x1. The merged pair is not reported
        // so only the two created pairs remain.
        let mut net: Vec<_> = net.into_iter().collect();
        net.sort();
        assert_eq!(net, vec![((7, 5), 1), ((7, 7), 1)]);
    }

    #[test]
    fn test_merge_no_match() {
        let mut word = WordModel::new(vec![1], 4);
        assert_eq!(word.merge_pair_cb((1, 2), 9, &mut |_, _| panic!("no delta")), 0);
        assert_eq!(word.symbols(), &[1]);
    }
}
