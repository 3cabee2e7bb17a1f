//! CLI commands for the sharif-bpe tool.

pub mod decode;
pub mod encode;
pub mod encode_file;
pub mod info;
pub mod train;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use encode_file::EncodeFileCommand;
pub use info::InfoCommand;
pub use train::TrainCommand;

use anyhow::{Context, Result as AnyhowResult};
use sharif_bpe_tokenizer::Tokenizer;
use std::path::Path;

/// Load a model file into a tokenizer.
pub fn load_tokenizer(path: &str) -> AnyhowResult<Tokenizer> {
    Tokenizer::from_file(Path::new(path)).with_context(|| format!("loading model {path} failed"))
}

/// Render ids as a space-separated line.
pub fn format_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
