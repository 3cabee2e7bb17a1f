//! Format definitions for model serialization.
//!
//! Two layouts carry the same content: the native line-oriented text layout and a
//! JSON record. Both store the base alphabet, the merge rules in rank order and the
//! split policy.

use serde::{Deserialize, Serialize};
use sharif_bpe_core::{Model, SplitPolicy};

/// Magic word opening every model file.
pub const MAGIC: &str = "SharifBPE";

/// Format version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Version token used in the text header.
pub fn version_token(version: u32) -> String {
    format!("v{version}")
}

/// Model file layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelFormat {
    /// `SharifBPE v1` header, base byte line, one `left right` line per rule
    #[default]
    Text,
    /// Serde JSON record
    Json,
}

impl ModelFormat {
    /// Guess the layout from file content: JSON starts with `{`.
    pub fn detect(content: &str) -> Self {
        match content.trim_start().as_bytes().first() {
            Some(b'{') => ModelFormat::Json,
            _ => ModelFormat::Text,
        }
    }
}

/// Model record in the JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Always [`MAGIC`]
    pub format: String,
    /// Format version
    pub version: u32,
    /// Word splitting policy used in training
    pub split: SplitPolicy,
    /// Base bytes in id order
    pub base: Vec<u8>,
    /// Merge rules in rank order
    pub merges: Vec<(u32, u32)>,
}

impl From<&Model> for SerializedModel {
    fn from(model: &Model) -> Self {
        Self {
            format: MAGIC.to_string(),
            version: FORMAT_VERSION,
            split: model.split_policy(),
            base: model.symbols().base_units().to_vec(),
            merges: model.merges().iter().map(|rule| rule.pair()).collect(),
        }
    }
}
