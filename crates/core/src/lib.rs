//! SharifBPE core - data structures shared by the learner and the tokenizer
//!
//! This crate provides the fundamental types of byte-pair encoding,
//! independent of how a model is trained or persisted.
//!
//! # Features
//!
//! - Append-only symbol table over a byte alphabet
//! - Ordered merge rules with constant-time pair lookup
//! - Lazy max-priority queue for pair counts
//! - The word splitting contract shared by training and encoding
//!
//! # Example
//!
//! ```rust
//! use sharif_bpe_core::{Model, SplitPolicy};
//!
//! let mut model = Model::new(0..=u8::MAX, SplitPolicy::Whitespace);
//! let he = model.push_merge(b'H' as u32, b'e' as u32)?;
//! assert_eq!(model.decode(&[he])?, b"He");
//! # Ok::<(), sharif_bpe_core::BpeError>(())
//! ```

pub mod error;
pub use error::{BpeError, Result};

pub mod core;
pub use core::{
    MergeCandidate, MergeMap, MergeRule, MergeRules, Pair, PairPriorityQueue, SymbolTable,
    BYTE_ALPHABET_SIZE,
};

pub mod split;
pub use split::{SplitPolicy, Splitter, GPT2_PATTERN};

pub mod model;
pub use model::Model;
