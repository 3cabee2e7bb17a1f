//! SharifBPE training - BPE vocabulary learning
//!
//! This crate learns an ordered list of merge rules from a text corpus and
//! returns them as a [`sharif_bpe_core::Model`].
//!
//! # Features
//!
//! - Word counting with parallel partition-then-merge
//! - Incremental pair statistics: only the words touched by a merge are rewritten
//! - Deterministic tie-breaking, so identical input gives identical models
//! - Cooperative cancellation between merge steps
//!
//! # Example
//!
//! ```rust
//! use sharif_bpe_training::{BpeLearner, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .vocab_size(257)
//!     .parallel(false)
//!     .build()?;
//!
//! let model = BpeLearner::new(config).learn(&["Hello", "He", "is", "Programmer"])?;
//! assert_eq!(model.merges().get((72, 101)), Some((0, 256)));
//! # Ok::<(), sharif_bpe_core::BpeError>(())
//! ```

pub use sharif_bpe_core::{BpeError, Result};

pub mod training;
pub use training::{
    AlphabetPolicy, BpeLearner, CancelToken, PairStatistics, ProgressCallback, TrainingConfig,
    TrainingConfigBuilder, WordCounter, WordModel,
};
