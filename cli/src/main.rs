//! SharifBPE CLI - Command-line interface for the BPE tokenizer.
//!
//! This is the main entry point for the `sharif-bpe` command-line tool.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use commands::{DecodeCommand, EncodeCommand, EncodeFileCommand, InfoCommand, TrainCommand};
use env_logger::Env;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "sharif-bpe")]
#[command(about = "Byte-pair encoding trainer and tokenizer", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn a model from a text file
    Train(TrainCommand),
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Encode a text file, one line of IDs per word
    EncodeFile(EncodeFileCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Show a model summary and its first rules
    Info(InfoCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::EncodeFile(cmd) => commands::encode_file::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Info(cmd) => commands::info::run(cmd)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    // Without -v/-q, RUST_LOG decides.
    if let Some(level) = level_override(verbose, quiet) {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn level_override(verbose: u8, quiet: u8) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Debug),
        (0, _) => Some(LevelFilter::Trace),
        (1, _) => Some(LevelFilter::Warn),
        _ => Some(LevelFilter::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_level_override() {
        assert_eq!(level_override(0, 0), None);
        assert_eq!(level_override(1, 0), Some(LevelFilter::Debug));
        assert_eq!(level_override(3, 0), Some(LevelFilter::Trace));
        assert_eq!(level_override(0, 1), Some(LevelFilter::Warn));
        assert_eq!(level_override(2, 2), Some(LevelFilter::Error));
    }

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from([
            "sharif-bpe",
            "-vv",
            "train",
            "--input",
            "corpus.txt",
            "--output",
            "model.bpe",
            "--vocab-size",
            "512",
            "--split",
            "gpt2",
            "--serial",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Train(cmd) => {
                assert_eq!(cmd.vocab_size, 512);
                assert_eq!(cmd.split, "gpt2");
                assert!(cmd.serial);
                assert!(!cmd.json);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_parse_encode_file() {
        let cli = Cli::try_parse_from([
            "sharif-bpe",
            "encode-file",
            "--model",
            "m.bpe",
            "--input",
            "in.txt",
            "--output",
            "out.txt",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.quiet, 1);
        assert!(matches!(cli.command, Commands::EncodeFile(_)));
    }
}
