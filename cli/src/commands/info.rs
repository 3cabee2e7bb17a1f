//! Info command implementation.

use clap::Parser;

/// Info command arguments.
#[derive(Parser)]
pub struct InfoCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub model: String,

    /// Number of merge rules to show
    #[arg(short, long, default_value_t = 10)]
    pub rules: usize,
}

use super::load_tokenizer;
use anyhow::Result as AnyhowResult;

pub fn run(cmd: InfoCommand) -> AnyhowResult<()> {
    let tokenizer = load_tokenizer(&cmd.model)?;
    let model = tokenizer.model()?;
    let symbols = model.symbols();

    println!("Model: {}", cmd.model);
    println!("  Vocab size: {}", model.vocab_size());
    println!("  Base symbols: {}", model.base_size());
    println!("  Merges: {}", model.merge_count());
    println!("  Split: {}", model.split_policy());

    if cmd.rules > 0 && model.merge_count() > 0 {
        println!();
        println!("First {} rules:", cmd.rules.min(model.merge_count()));
        for (rank, rule) in model.merges().iter().take(cmd.rules).enumerate() {
            println!(
                "  {:>6}  {:>6} {:>6} -> {:<6} {:?}",
                rank,
                rule.left,
                rule.right,
                rule.id,
                symbols.render(rule.id)?
            );
        }
    }

    Ok(())
}
