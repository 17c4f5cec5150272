// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `summarize`, and
// all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::ml::decoder::FeedbackMode;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the summarizer on a JSONL corpus of text/summary pairs
    Train(TrainArgs),

    /// Summarise a passage with a trained checkpoint
    Summarize(SummarizeArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSON Lines file, one {"text": ..., "summary": ...} per line
    #[arg(long, default_value = "data/corpus.jsonl")]
    pub corpus: String,

    /// Pretrained word vectors, one `token v1 .. vn` row per line
    #[arg(long, default_value = "data/glove.6B.50d.txt")]
    pub vectors: String,

    /// Directory for checkpoints, vocabulary, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Longest summary kept, in tokens (end marker excluded)
    #[arg(long, default_value_t = 7)]
    pub max_summary_len: usize,

    /// Longest text kept, in tokens
    #[arg(long, default_value_t = 80)]
    pub max_text_len: usize,

    /// D: local attention covers 2D+1 encoder positions
    #[arg(long, default_value_t = 10)]
    pub window_radius: usize,

    /// K: number of past hidden states in the residual attention term
    #[arg(long, default_value_t = 5)]
    pub residual_depth: usize,

    /// Encoder hidden size per direction; the decoder uses twice this
    #[arg(long, default_value_t = 500)]
    pub hidden_size: usize,

    /// Width of the projection that predicts the attention centre
    #[arg(long, default_value_t = 50)]
    pub alignment_dim: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.003)]
    pub lr: f64,

    /// Number of full passes through the training split
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Standard deviation of the normal weight initialiser
    #[arg(long, default_value_t = 0.01)]
    pub init_std: f64,

    /// Log a predicted/actual report every N examples (0 = never)
    #[arg(long, default_value_t = 1)]
    pub display_step: usize,

    #[arg(long, default_value_t = 0.7)]
    pub train_fraction: f64,

    #[arg(long, default_value_t = 0.15)]
    pub val_fraction: f64,

    /// Decoder input during training: greedy or teacher-forced
    #[arg(long, default_value_t = FeedbackMode::Greedy)]
    pub feedback_mode: FeedbackMode,

    /// Give the decoder's input and output gates their own biases
    #[arg(long)]
    pub per_gate_decoder_bias: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_path:     a.corpus,
            vectors_path:    a.vectors,
            checkpoint_dir:  a.checkpoint_dir,
            max_summary_len: a.max_summary_len,
            max_text_len:    a.max_text_len,
            window_radius:   a.window_radius,
            residual_depth:  a.residual_depth,
            hidden_size:     a.hidden_size,
            alignment_dim:   a.alignment_dim,
            learning_rate:   a.lr,
            epochs:          a.epochs,
            init_std:        a.init_std,
            display_step:    a.display_step,
            train_fraction:  a.train_fraction,
            val_fraction:    a.val_fraction,
            feedback_mode:   a.feedback_mode,
            decoder_shared_bias_bug: !a.per_gate_decoder_bias,
        }
    }
}

/// All arguments for the `summarize` command
#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// The passage to summarise
    #[arg(long)]
    pub text: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Word vectors file; defaults to the one used for training
    #[arg(long)]
    pub vectors: Option<String>,

    /// Decoder steps; defaults to the training max_summary_len
    #[arg(long)]
    pub length: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["rra-summarizer", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(TrainConfig::from(args), TrainConfig::default());
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "rra-summarizer", "train",
            "--window-radius", "3",
            "--feedback-mode", "teacher-forced",
            "--per-gate-decoder-bias",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg = TrainConfig::from(args);
        assert_eq!(cfg.window_radius, 3);
        assert_eq!(cfg.feedback_mode, FeedbackMode::TeacherForced);
        assert!(!cfg.decoder_shared_bias_bug);
    }

    #[test]
    fn test_summarize_requires_text() {
        assert!(Cli::try_parse_from(["rra-summarizer", "summarize"]).is_err());
        let cli = Cli::try_parse_from(["rra-summarizer", "summarize", "--text", "a b c", "--length", "4"]).unwrap();
        let Commands::Summarize(args) = cli.command else { panic!("expected summarize") };
        assert_eq!(args.length, Some(4));
        assert!(args.vectors.is_none());
    }
}
