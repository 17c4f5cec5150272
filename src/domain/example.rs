// ============================================================
// Layer 3 — Summary Example Domain Types
// ============================================================
// A training example for abstractive summarization is a pair of
// sequences:
//   - the input text, one word vector per token
//   - the target summary, one word vector per token, always
//     terminated by the vector of the end marker ("eos")
//
// Word vectors are shared, never mutated after loading.
// `Arc<[f32]>` lets every example point at the same row of the
// vector space without copying it.
//
// Reference: Rust Book §5 (Structs), §15 (Smart Pointers)

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A fixed-width, immutable word embedding.
pub type WordVector = Arc<[f32]>;

/// One line of the raw corpus before tokenisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExample {
    /// The review / article body to be summarised
    pub text: String,

    /// The reference summary
    pub summary: String,
}

impl RawExample {
    pub fn new(text: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            text:    text.into(),
            summary: summary.into(),
        }
    }
}

/// A vectorised example, ready for the encoder and decoder.
#[derive(Debug, Clone)]
pub struct SummaryExample {
    /// Input text as word vectors, one per token
    pub input: Vec<WordVector>,

    /// Target summary as word vectors, including the trailing end marker
    pub target: Vec<WordVector>,
}

impl SummaryExample {
    pub fn new(input: Vec<WordVector>, target: Vec<WordVector>) -> Self {
        Self { input, target }
    }

    /// Number of encoder timesteps
    pub fn seq_len(&self) -> usize {
        self.input.len()
    }

    /// Number of decoder steps: the target without its end marker
    pub fn output_len(&self) -> usize {
        self.target.len().saturating_sub(1)
    }
}
