//! Error types for the SharifBPE library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type shared by the learner, the model loader and the tokenizer.
#[derive(Error, Debug)]
pub enum BpeError {
    /// The corpus produced no words after splitting.
    #[error("Empty corpus: no words to learn from")]
    EmptyCorpus,

    /// The requested vocabulary size cannot be trained.
    #[error("Invalid vocabulary size: {requested}")]
    InvalidVocabSize { requested: usize },

    /// A symbol id outside the symbol table.
    #[error("Unknown symbol id: {0}")]
    UnknownSymbol(u32),

    /// Input contains a byte that is not part of the model's base alphabet.
    #[error("Unknown base unit 0x{byte:02x} in word {word:?}")]
    UnknownBaseUnit { word: String, byte: u8 },

    /// A tokenizer was used before any model was loaded into it.
    #[error("No model loaded")]
    ModelNotLoaded,

    /// The model file is malformed.
    #[error("Corrupt model {path} (line {line}): {reason}")]
    CorruptModel {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The model file uses a format version this build cannot read.
    #[error("Unsupported model version {found} in {path} (supported: {supported})")]
    VersionMismatch {
        path: PathBuf,
        found: String,
        supported: String,
    },

    /// I/O error with file context.
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Training was cancelled between two merge steps.
    #[error("Training cancelled after {merges_done} merges")]
    Cancelled { merges_done: usize },

    /// The pre-tokenization pattern failed on some input.
    #[error("Pre-tokenization failed: {0}")]
    Split(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BpeError {
    /// Wrap an [`std::io::Error`] with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }

    /// Build a [`BpeError::CorruptModel`] for `path` at 1-based `line`.
    pub fn corrupt(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptModel {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for SharifBPE operations.
pub type Result<T> = std::result::Result<T, BpeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_input() {
        let err = BpeError::UnknownBaseUnit {
            word: "héllo".to_string(),
            byte: 0xc3,
        };
        assert_eq!(err.to_string(), "Unknown base unit 0xc3 in word \"héllo\"");

        let err = BpeError::corrupt("model.bpe", 3, "expected two ids");
        assert_eq!(
            err.to_string(),
            "Corrupt model model.bpe (line 3): expected two ids"
        );
    }

    #[test]
    fn test_io_keeps_source() {
        use std::error::Error;

        let err = BpeError::io(
            "missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("missing.txt"));
        assert!(err.source().is_some());
    }
}
