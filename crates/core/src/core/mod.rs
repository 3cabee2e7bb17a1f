//! Core BPE data structures.
//!
//! Symbols, merge rules and the pair priority queue used by the learner.

pub mod merges;
pub mod priority;
pub mod symbols;

pub use merges::{MergeMap, MergeRule, MergeRules, Pair};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use symbols::{SymbolTable, BYTE_ALPHABET_SIZE};
