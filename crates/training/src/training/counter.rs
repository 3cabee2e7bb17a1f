//! Word counting for BPE training.
//!
//! Turns a corpus into a `word -> occurrences` table. Large inputs are counted in
//! parallel: every rayon job fills a local map and the maps are merged at the end.

use ahash::AHashMap;
use compact_str::CompactString;
use rayon::prelude::*;
use sharif_bpe_core::{BpeError, Result, SplitPolicy, Splitter};
use std::path::Path;

type Counts = AHashMap<CompactString, u64>;

/// Counter for distinct corpus words.
#[derive(Debug, Clone, Default)]
pub struct WordCounter {
    splitter: Splitter,
    counts: Counts,
}

impl WordCounter {
    /// Create an empty counter splitting with `splitter`.
    pub fn new(splitter: Splitter) -> Self {
        Self {
            splitter,
            counts: AHashMap::new(),
        }
    }

    /// Split `text` and count its words.
    pub fn add_text(&mut self, text: &str) -> Result<()> {
        let Self { splitter, counts } = self;
        splitter.for_each_word(text, |word| bump(counts, word, 1))
    }

    /// Count one occurrence of a single word.
    pub fn add_word(&mut self, word: &str) {
        self.add_word_count(word, 1);
    }

    /// Count `count` occurrences of a single word.
    pub fn add_word_count(&mut self, word: &str, count: u64) {
        if !word.is_empty() && count > 0 {
            bump(&mut self.counts, word, count);
        }
    }

    /// Count the words of every chunk in parallel.
    pub fn count_chunks_parallel<S>(splitter: Splitter, chunks: &[S]) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        let counts = chunks
            .par_iter()
            .try_fold(Counts::new, |mut acc, chunk| {
                splitter.for_each_word(chunk.as_ref(), |word| bump(&mut acc, word, 1))?;
                Ok::<_, BpeError>(acc)
            })
            .try_reduce(Counts::new, |a, b| Ok(merge_counts(a, b)))?;

        Ok(Self { splitter, counts })
    }

    /// Count the words of every chunk on the current thread.
    pub fn count_chunks_sequential<S>(splitter: Splitter, chunks: &[S]) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let mut counter = Self::new(splitter);
        for chunk in chunks {
            counter.add_text(chunk.as_ref())?;
        }
        Ok(counter)
    }

    /// Read a UTF-8 file and count its words.
    ///
    /// With the whitespace policy and `parallel` set, lines are counted in parallel;
    /// no word spans a line break under that policy. The GPT-2 policy keeps newlines
    /// inside words, so the file is split as one text.
    pub fn count_file(splitter: Splitter, path: &Path, parallel: bool) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BpeError::io(path, e))?;
        log::debug!("Read {} bytes from {}", text.len(), path.display());

        if parallel && splitter.policy() == SplitPolicy::Whitespace {
            let counts = text
                .par_lines()
                .fold(Counts::new, |mut acc, line| {
                    line.split_whitespace()
                        .for_each(|word| bump(&mut acc, word, 1));
                    acc
                })
                .reduce(Counts::new, merge_counts);
            return Ok(Self { splitter, counts });
        }

        let mut counter = Self::new(splitter);
        counter.add_text(&text)?;
        Ok(counter)
    }

    /// The splitter used by this counter.
    pub fn splitter(&self) -> Splitter {
        self.splitter
    }

    /// Get the number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no word was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Get the total count of all word occurrences.
    pub fn total_occurrences(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Occurrences of `word`.
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Words with their counts, sorted by word bytes.
    ///
    /// The order is independent of hashing, so word indices derived from it are
    /// stable across runs.
    pub fn into_sorted(self) -> Vec<(CompactString, u64)> {
        let mut words: Vec<_> = self.counts.into_iter().collect();
        words.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        words
    }
}

#[inline]
fn bump(counts: &mut Counts, word: &str, by: u64) {
    if let Some(count) = counts.get_mut(word) {
        *count += by;
    } else {
        counts.insert(CompactString::from(word), by);
    }
}

fn merge_counts(mut acc: Counts, other: Counts) -> Counts {
    if acc.len() < other.len() {
        return merge_counts(other, acc);
    }
    for (word, count) in other {
        *acc.entry(word).or_insert(0) += count;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_add_text() {
        let mut counter = WordCounter::new(Splitter::whitespace());
        counter.add_text("low lower low\nlowest").unwrap();

        assert_eq!(counter.len(), 3);
        assert_eq!(counter.get("low"), 2);
        assert_eq!(counter.get("lowest"), 1);
        assert_eq!(counter.total_occurrences(), 4);
    }

    #[test]
    fn test_add_word_count_ignores_empty() {
        let mut counter = WordCounter::default();
        counter.add_word_count("", 4);
        counter.add_word_count("a", 0);
        assert!(counter.is_empty());

        counter.add_word("a");
        counter.add_word_count("a", 2);
        assert_eq!(counter.get("a"), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let chunks: Vec<String> = (0..64)
            .map(|i| format!("the cat {} sat on the mat {}", i % 5, i % 3))
            .collect();

        let serial = WordCounter::count_chunks_sequential(Splitter::whitespace(), &chunks)
            .unwrap()
            .into_sorted();
        let parallel = WordCounter::count_chunks_parallel(Splitter::whitespace(), &chunks)
            .unwrap()
            .into_sorted();

        assert_eq!(serial, parallel);
        assert_eq!(serial.first().map(|(w, c)| (w.as_str(), *c)), Some(("0", 35)));
    }

    #[test]
    fn test_into_sorted_is_byte_ordered() {
        let mut counter = WordCounter::default();
        counter.add_text("b a B é").unwrap();
        let words: Vec<_> = counter
            .into_sorted()
            .into_iter()
            .map(|(w, _)| w.to_string())
            .collect();
        assert_eq!(words, vec!["B", "a", "b", "é"]);
    }

    #[test]
    fn test_count_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hello world").unwrap();
        writeln!(file, "hello  again").unwrap();

        for parallel in [false, true] {
            let counter =
                WordCounter::count_file(Splitter::whitespace(), file.path(), parallel).unwrap();
            assert_eq!(counter.get("hello"), 2);
            assert_eq!(counter.len(), 3);
        }
    }

    #[test]
    fn test_count_missing_file() {
        let err = WordCounter::count_file(
            Splitter::whitespace(),
            Path::new("/definitely/not/here.txt"),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, BpeError::Io { .. }));
    }
}
