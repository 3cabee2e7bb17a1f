//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub model: String,

    /// Comma-separated token IDs (e.g. "256,108,108,111")
    #[arg(short, long)]
    pub ids: String,
}

use super::load_tokenizer;
use anyhow::{Context, Result as AnyhowResult};

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = load_tokenizer(&cmd.model)?;
    let ids = parse_ids(&cmd.ids)?;
    println!("{}", tokenizer.decode_lossy(&ids)?);
    Ok(())
}

/// Parse a comma- or space-separated list of ids.
pub fn parse_ids(input: &str) -> AnyhowResult<Vec<u32>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid token ID: {s:?}"))
        })
        .collect()
}
