// ============================================================
// Layer 3 — Summarizer Errors
// ============================================================
// Every failure on the encode → decode → loss → update path is
// fatal for the current example, and the training loop treats a
// failed example as fatal for the whole run. Nothing here is
// retried: the same input fails the same way every time.
//
// Workflow code wraps these in anyhow::Error with context; the
// variants stay matchable for tests and callers that care.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SummarizerError {
    /// An encoder input or decoder output of length zero
    #[error("sequence is empty: {what}")]
    EmptySequence { what: &'static str },

    /// The local attention window 2D+1 does not fit in the input
    #[error("attention window of {window} positions exceeds input length {seq_len}")]
    WindowExceedsSequence { seq_len: usize, window: usize },

    /// A target token that the limited vocabulary cannot index
    #[error("target token '{token}' is not in the limited vocabulary")]
    UnknownTarget { token: String },

    /// NaN or infinite loss; parameters must not be updated from it
    #[error("non-finite loss {loss} on example {example}")]
    NumericInstability { example: usize, loss: f64 },

    /// A control token (unk, eos, <SOS>, ...) missing from a vocabulary
    #[error("required token '{token}' is missing")]
    MissingControlToken { token: String },

    /// Word vectors of inconsistent width
    #[error("expected vectors of width {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
