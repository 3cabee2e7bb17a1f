//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub model: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub text: String,

    /// Print one line of IDs per word
    #[arg(long, default_value_t = false)]
    pub per_word: bool,
}

use super::{format_ids, load_tokenizer};
use anyhow::Result as AnyhowResult;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = load_tokenizer(&cmd.model)?;

    // Read input text (from stdin if "-")
    let input_text = if cmd.text == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        cmd.text
    };

    if cmd.per_word {
        for ids in tokenizer.encode_text_words(&input_text)? {
            println!("{}", format_ids(&ids));
        }
    } else {
        let ids = tokenizer.encode(&input_text)?;
        println!("{}", format_ids(&ids));
    }

    Ok(())
}
