//! Train command implementation.

use clap::Parser;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training data file
    #[arg(short, long)]
    pub input: String,

    /// Output path for the trained model
    #[arg(short, long)]
    pub output: String,

    /// Target vocabulary size, base symbols included
    #[arg(long, default_value_t = 30_000)]
    pub vocab_size: usize,

    /// Minimum count for a pair to be merged
    #[arg(long, default_value_t = 1)]
    pub min_frequency: u64,

    /// Base alphabet: "full" (all 256 bytes) or "observed" (bytes in the corpus)
    #[arg(long, default_value = "full")]
    pub alphabet: String,

    /// Word splitting: "whitespace" or "gpt2"
    #[arg(long, default_value = "whitespace")]
    pub split: String,

    /// Count words and pairs on a single thread
    #[arg(long, default_value_t = false)]
    pub serial: bool,

    /// Save the model as JSON instead of the text layout
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

use anyhow::{Context, Result as AnyhowResult};
use sharif_bpe_tokenizer::{BpeLearner, ModelFormat, ModelSaver, TrainingConfig};
use std::path::Path;
use std::time::Instant;

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    let config = TrainingConfig::builder()
        .vocab_size(cmd.vocab_size)
        .min_frequency(cmd.min_frequency)
        .alphabet(cmd.alphabet.parse()?)
        .split(cmd.split.parse()?)
        .parallel(!cmd.serial)
        .build()?;

    log::info!(
        "Training on {} (vocab {}, min frequency {}, alphabet {}, split {})",
        cmd.input,
        config.vocab_size,
        config.min_frequency,
        config.alphabet,
        config.split
    );

    let start = Instant::now();
    let model = BpeLearner::new(config)
        .learn_file(&cmd.input)
        .with_context(|| format!("training on {} failed", cmd.input))?;

    let format = if cmd.json {
        ModelFormat::Json
    } else {
        ModelFormat::Text
    };
    ModelSaver::new(&model)
        .format(format)
        .save(Path::new(&cmd.output))
        .with_context(|| format!("saving model to {} failed", cmd.output))?;

    println!(
        "Trained {} merges ({} symbols) in {:.2}s, saved to {}",
        model.merge_count(),
        model.vocab_size(),
        start.elapsed().as_secs_f64(),
        cmd.output
    );

    Ok(())
}
