//! SharifBPE tokenizer - model persistence and encoding
//!
//! This crate ties the learner and the core types together: it saves and loads
//! models, applies them to words, texts and files, and exposes the boundary
//! operations as plain functions.
//!
//! # Features
//!
//! - `SharifBPE v1` text layout and a JSON layout, detected on load
//! - Strict validation: malformed files fail with the path and line
//! - Deterministic merge application, parallel over word batches
//! - A shareable [`Tokenizer`] holding the model behind an `Arc`
//!
//! # Example
//!
//! ```rust
//! let model = sharif_bpe_tokenizer::learn(257, &["Hello", "He", "is", "Programmer"])?;
//!
//! assert_eq!(sharif_bpe_tokenizer::encode(&model, "is")?, vec![105, 115]);
//! assert_eq!(sharif_bpe_tokenizer::encode(&model, "He")?, vec![256]);
//! # Ok::<(), sharif_bpe_tokenizer::BpeError>(())
//! ```

pub use sharif_bpe_core::{BpeError, Model, Result, SplitPolicy};
pub use sharif_bpe_training::{AlphabetPolicy, BpeLearner, CancelToken, TrainingConfig};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoder, Tokenizer, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{ModelFormat, ModelLoader, ModelSaver};

use std::path::Path;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Learn a model with `vocab_size` symbols from text chunks, default settings.
pub fn learn<S>(vocab_size: usize, corpus: &[S]) -> Result<Model>
where
    S: AsRef<str> + Sync,
{
    BpeLearner::with_vocab_size(vocab_size).learn(corpus)
}

/// Learn a model with `vocab_size` symbols from a UTF-8 text file.
pub fn learn_file(vocab_size: usize, path: impl AsRef<Path>) -> Result<Model> {
    BpeLearner::with_vocab_size(vocab_size).learn_file(path)
}

/// Save a model in the text layout.
pub fn save(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    ModelSaver::new(model).save(path.as_ref())
}

/// Read a model saved in either layout.
pub fn read_model(path: impl AsRef<Path>) -> Result<Model> {
    ModelLoader::load(path.as_ref())
}

/// Encode text as one flat id sequence.
pub fn encode(model: &Model, text: &str) -> Result<Vec<u32>> {
    Encoder::new(model).encode(text)
}

/// Encode each word separately, preserving order and length.
pub fn encode_words<S>(model: &Model, words: &[S]) -> Result<Vec<Vec<u32>>>
where
    S: AsRef<str> + Sync,
{
    Encoder::new(model).encode_words(words)
}

/// Encode a text file into `output`, one line of ids per word.
pub fn encode_file(
    model: &Model,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<usize> {
    Encoder::new(model).encode_file(input.as_ref(), output.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: [&str; 4] = ["Hello", "He", "is", "Programmer"];

    #[test]
    fn test_boundary_operations() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.bpe");

        let model = learn(257, &CORPUS).unwrap();
        assert_eq!(model.vocab_size(), 257);
        save(&model, &model_path).unwrap();

        let loaded = read_model(&model_path).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(encode(&loaded, "is").unwrap(), vec![105, 115]);
        assert_eq!(
            encode_words(&loaded, &["He", "", "is"]).unwrap(),
            vec![vec![256], vec![], vec![105, 115]]
        );

        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "He is").unwrap();
        assert_eq!(encode_file(&loaded, &input, &output).unwrap(), 2);
    }

    #[test]
    fn test_training_is_reproducible_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let corpus: Vec<String> = (0..40)
            .map(|i| format!("aa ab ba bb {} abab baba", i % 3))
            .collect();

        let first = dir.path().join("first.bpe");
        let second = dir.path().join("second.bpe");
        save(&learn(300, &corpus).unwrap(), &first).unwrap();
        save(&learn(300, &corpus).unwrap(), &second).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn test_vocab_size_never_exceeds_target() {
        for target in [1, 255, 256, 257, 260, 10_000] {
            let model = learn(target, &["abcabc abcd dcba"]).unwrap();
            assert!(model.vocab_size() >= 256);
            if target >= 256 {
                assert!(model.vocab_size() <= target);
            }
        }
    }

    #[test]
    fn test_learn_file() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus.txt");
        std::fs::write(&corpus, "Hello\nHe\nis Programmer\n").unwrap();

        let model = learn_file(257, &corpus).unwrap();
        assert_eq!(model.merges().get((72, 101)), Some((0, 256)));
    }
}
