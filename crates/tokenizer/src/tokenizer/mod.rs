//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that holds a shared,
//! read-only model and applies it to words, texts and files.

pub mod encoder;

pub use encoder::{apply_merges, Encoder};

use crate::io::{ModelFormat, ModelLoader, ModelSaver};
use sharif_bpe_core::{BpeError, Model, Result};
use std::path::Path;
use std::sync::Arc;

/// Configuration for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Batches with at least this many words are encoded in parallel
    pub parallel_threshold: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 256,
        }
    }
}

/// Main tokenizer struct.
///
/// A tokenizer starts empty and becomes usable once a model is loaded. The model
/// is shared through an [`Arc`], so clones are cheap and can be sent to other
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    model: Option<Arc<Model>>,
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer with no model loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tokenizer for `model`.
    pub fn from_model(model: impl Into<Arc<Model>>) -> Self {
        Self {
            model: Some(model.into()),
            config: TokenizerConfig::default(),
        }
    }

    /// Load a model file into a new tokenizer.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut tokenizer = Self::new();
        tokenizer.load(path)?;
        Ok(tokenizer)
    }

    /// Set the encoding configuration.
    pub fn with_config(mut self, config: TokenizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Load a model file, replacing the current model.
    ///
    /// On failure the previous model is kept.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let model = ModelLoader::load(path)?;
        self.model = Some(Arc::new(model));
        Ok(())
    }

    /// Save the current model.
    pub fn save(&self, path: &Path, format: ModelFormat) -> Result<()> {
        ModelSaver::new(self.model()?).format(format).save(path)
    }

    /// The loaded model.
    pub fn model(&self) -> Result<&Arc<Model>> {
        self.model.as_ref().ok_or(BpeError::ModelNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> TokenizerConfig {
        self.config
    }

    /// Get the vocabulary size of the loaded model.
    pub fn vocab_size(&self) -> Result<usize> {
        Ok(self.model()?.vocab_size())
    }

    fn encoder(&self) -> Result<Encoder<'_>> {
        Ok(Encoder::with_config(self.model()?, self.config))
    }

    /// Encode a single word.
    pub fn encode_word(&self, word: &str) -> Result<Vec<u32>> {
        self.encoder()?.encode_word(word)
    }

    /// Encode text as one flat id sequence; word boundaries are not marked.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.encoder()?.encode(text)
    }

    /// Encode text, one id sequence per word.
    pub fn encode_text_words(&self, text: &str) -> Result<Vec<Vec<u32>>> {
        self.encoder()?.encode_text_words(text)
    }

    /// Encode a batch of words (parallelized for large batches).
    pub fn encode_words<S>(&self, words: &[S]) -> Result<Vec<Vec<u32>>>
    where
        S: AsRef<str> + Sync,
    {
        self.encoder()?.encode_words(words)
    }

    /// Encode `input` into `output`, one line per word. Returns the word count.
    pub fn encode_file(&self, input: &Path, output: &Path) -> Result<usize> {
        self.encoder()?.encode_file(input, output)
    }

    /// Decode token ids back to bytes.
    pub fn decode(&self, ids: &[u32]) -> Result<Vec<u8>> {
        self.model()?.decode(ids)
    }

    /// Decode token ids to text, replacing invalid UTF-8.
    pub fn decode_lossy(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.decode(ids)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
