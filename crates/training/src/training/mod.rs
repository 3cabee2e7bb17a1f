//! Training infrastructure for BPE models.
//!
//! This module provides the learner and the data structures it maintains while
//! learning merge rules from text.

pub mod cancel;
pub mod config;
pub mod counter;
pub mod stats;
pub mod trainer;
pub mod word;

pub use cancel::CancelToken;
pub use config::{AlphabetPolicy, TrainingConfig, TrainingConfigBuilder};
pub use counter::WordCounter;
pub use stats::PairStatistics;
pub use trainer::{BpeLearner, ProgressCallback};
pub use word::WordModel;
