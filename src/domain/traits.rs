// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The model never talks to a concrete embedding file. It only
// needs two lookups, so the application layer programs against
// `VectorLookup` and any source of word vectors can stand in
// (GloVe text files today, a test fixture in unit tests).
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::example::WordVector;

// ─── VectorLookup ─────────────────────────────────────────────────────────────
/// Maps tokens to fixed-width vectors and back.
///
/// Implementations:
///   - VectorSpace → pretrained GloVe vectors with `unk` fallback
pub trait VectorLookup {
    /// Width shared by every vector
    fn dim(&self) -> usize;

    /// Vector for `token`, falling back to the `unk` vector.
    /// Defined for every token.
    fn word_to_vector(&self, token: &str) -> WordVector;

    /// Token whose vector equals `vector`, otherwise the token with
    /// the most similar vector (cosine similarity).
    fn vector_to_token(&self, vector: &[f32]) -> &str;
}

// ─── Summarizer ───────────────────────────────────────────────────────────────
/// Any component that can turn a passage into a short summary.
///
/// Implementations:
///   - SummarizeUseCase → greedy decoding with a trained checkpoint
pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String>;
}
