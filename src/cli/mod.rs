// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`     — trains the summarizer on a JSONL corpus
//   2. `summarize` — loads a checkpoint and summarises a passage
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SummarizeArgs, TrainArgs};

use crate::domain::traits::Summarizer;

#[derive(Parser, Debug)]
#[command(
    name = "rra-summarizer",
    version = "0.1.0",
    about = "Train a residual-recurrent-attention seq2seq summarizer, then summarise text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case; the CLI only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => run_train(args),
            Commands::Summarize(args) => run_summarize(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus: {}", args.corpus);

    let use_case = TrainUseCase::new(args.into());
    let history  = use_case.execute()?;

    if let Some(last) = history.last() {
        println!(
            "Training complete after {} epochs. Final val_loss={:.4}. Checkpoint saved.",
            last.epoch, last.val_loss,
        );
    }
    Ok(())
}

fn run_summarize(args: SummarizeArgs) -> Result<()> {
    use crate::application::summarize_use_case::SummarizeUseCase;

    let use_case = SummarizeUseCase::new(&args.checkpoint_dir, args.vectors, args.length)?;
    let summary  = use_case.summarize(&args.text)?;
    println!("\nSummary: {}", summary);
    Ok(())
}
