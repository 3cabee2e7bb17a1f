//! Training configuration.

use sharif_bpe_core::{BpeError, Result, SplitPolicy};
use std::fmt;
use std::str::FromStr;

/// Which bytes become base symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlphabetPolicy {
    /// All 256 byte values, id = byte value.
    #[default]
    Full,
    /// Only the bytes seen in the corpus, in ascending order.
    Observed,
}

impl AlphabetPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlphabetPolicy::Full => "full",
            AlphabetPolicy::Observed => "observed",
        }
    }
}

impl fmt::Display for AlphabetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlphabetPolicy {
    type Err = BpeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(AlphabetPolicy::Full),
            "observed" => Ok(AlphabetPolicy::Observed),
            other => Err(BpeError::InvalidConfig(format!(
                "unknown alphabet policy {other:?} (expected \"full\" or \"observed\")"
            ))),
        }
    }
}

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    /// Target vocabulary size, base symbols included
    pub vocab_size: usize,
    /// Minimum count for a pair to be merged
    pub min_frequency: u64,
    /// Base alphabet policy
    pub alphabet: AlphabetPolicy,
    /// Word splitting policy, recorded in the model
    pub split: SplitPolicy,
    /// Whether to count words and pairs in parallel
    pub parallel: bool,
    /// Log progress every this many merges (0 disables progress lines)
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            min_frequency: 1,
            alphabet: AlphabetPolicy::Full,
            split: SplitPolicy::Whitespace,
            parallel: true,
            log_interval: 1_000,
        }
    }
}

impl TrainingConfig {
    /// Start a builder from the default configuration.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the values that can be checked before reading any corpus.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 || self.vocab_size > u32::MAX as usize {
            return Err(BpeError::InvalidVocabSize {
                requested: self.vocab_size,
            });
        }
        if self.min_frequency == 0 {
            return Err(BpeError::InvalidConfig(
                "min_frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the minimum pair count.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    pub fn alphabet(mut self, alphabet: AlphabetPolicy) -> Self {
        self.config.alphabet = alphabet;
        self
    }

    pub fn split(mut self, split: SplitPolicy) -> Self {
        self.config.split = split;
        self
    }

    /// Enable or disable parallel counting.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn log_interval(mut self, interval: usize) -> Self {
        self.config.log_interval = interval;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
