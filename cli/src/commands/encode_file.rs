//! Encode-file command implementation.

use clap::Parser;

/// Encode-file command arguments.
#[derive(Parser)]
pub struct EncodeFileCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub model: String,

    /// Text file to encode
    #[arg(short, long)]
    pub input: String,

    /// Output file, one line of IDs per word
    #[arg(short, long)]
    pub output: String,
}

use super::load_tokenizer;
use anyhow::{Context, Result as AnyhowResult};
use std::path::Path;
use std::time::Instant;

pub fn run(cmd: EncodeFileCommand) -> AnyhowResult<()> {
    let tokenizer = load_tokenizer(&cmd.model)?;

    let start = Instant::now();
    let words = tokenizer
        .encode_file(Path::new(&cmd.input), Path::new(&cmd.output))
        .with_context(|| format!("encoding {} failed", cmd.input))?;

    println!(
        "Encoded {} words to {} in {:.2}s",
        words,
        cmd.output,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
