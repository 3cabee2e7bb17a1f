//! Merge application.
//!
//! A word is encoded by mapping its bytes to base symbols and then repeatedly
//! applying the lowest-ranked rule that matches any adjacent pair, every
//! non-overlapping occurrence at once, until no adjacent pair has a rule.

use super::TokenizerConfig;
use rayon::prelude::*;
use sharif_bpe_core::{BpeError, MergeRules, Model, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encoder borrowing a model.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    model: &'a Model,
    config: TokenizerConfig,
}

impl<'a> Encoder<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self::with_config(model, TokenizerConfig::default())
    }

    pub fn with_config(model: &'a Model, config: TokenizerConfig) -> Self {
        Self { model, config }
    }

    /// Encode a single word. The empty word encodes to an empty sequence.
    pub fn encode_word(&self, word: &str) -> Result<Vec<u32>> {
        let symbols = self.model.symbols();
        let mut ids = word
            .bytes()
            .map(|byte| {
                symbols.base_id(byte).ok_or_else(|| BpeError::UnknownBaseUnit {
                    word: word.to_string(),
                    byte,
                })
            })
            .collect::<Result<Vec<u32>>>()?;
        apply_merges(self.model.merges(), &mut ids);
        Ok(ids)
    }

    /// Encode a batch of words, one output sequence per word, in input order.
    ///
    /// If several words fail, the error of the first failing word is returned,
    /// whether or not the batch ran in parallel.
    pub fn encode_words<S>(&self, words: &[S]) -> Result<Vec<Vec<u32>>>
    where
        S: AsRef<str> + Sync,
    {
        if words.len() < self.config.parallel_threshold {
            return words.iter().map(|w| self.encode_word(w.as_ref())).collect();
        }

        let results: Vec<Result<Vec<u32>>> = words
            .par_iter()
            .map(|w| self.encode_word(w.as_ref()))
            .collect();
        results.into_iter().collect()
    }

    /// Split `text` with the model's policy and encode every word.
    pub fn encode_text_words(&self, text: &str) -> Result<Vec<Vec<u32>>> {
        let words = self.model.splitter().split(text)?;
        self.encode_words(&words)
    }

    /// Encode `text` as one flat id sequence.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        Ok(self.encode_text_words(text)?.concat())
    }

    /// Encode a text file, writing one line of space-separated ids per word.
    ///
    /// Returns the number of words written.
    pub fn encode_file(&self, input: &Path, output: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(input).map_err(|e| BpeError::io(input, e))?;
        let encoded = self.encode_text_words(&text)?;
        log::debug!(
            "Encoded {} words from {} ({} bytes)",
            encoded.len(),
            input.display(),
            text.len()
        );

        let file = File::create(output).map_err(|e| BpeError::io(output, e))?;
        let mut writer = BufWriter::new(file);
        write_lines(&mut writer, &encoded)
            .and_then(|()| writer.flush())
            .map_err(|e| BpeError::io(output, e))?;

        Ok(encoded.len())
    }
}

fn write_lines<W: Write>(writer: &mut W, encoded: &[Vec<u32>]) -> std::io::Result<()> {
    for ids in encoded {
        let mut first = true;
        for id in ids {
            if !first {
                writer.write_all(b" ")?;
            }
            write!(writer, "{id}")?;
            first = false;
        }
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Apply merge rules to `ids` in place until none matches.
pub fn apply_merges(merges: &MergeRules, ids: &mut Vec<u32>) {
    while ids.len() >= 2 {
        let best = ids
            .windows(2)
            .filter_map(|w| merges.get((w[0], w[1])).map(|(rank, id)| (rank, (w[0], w[1]), id)))
            .min_by_key(|&(rank, _, _)| rank);

        let Some((_, (left, right), new_id)) = best else {
            break;
        };

        let n = ids.len();
        let mut write = 0;
        let mut read = 0;
        while read < n {
            if read + 1 < n && ids[read] == left && ids[read + 1] == right {
                ids[write] = new_id;
                read += 2;
            } else {
                ids[write] = ids[read];
                read += 1;
            }
            write += 1;
        }
        ids.truncate(write);
    }
}
