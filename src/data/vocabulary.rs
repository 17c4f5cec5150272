// ============================================================
// Layer 4 — Limited Vocabulary
// ============================================================
// The decoder scores only the words that actually occur in the
// corpus, not the whole pretrained vocabulary. That keeps the
// output projection Ws at [2H, vocab_len] instead of
// [2H, 400_000].
//
// Layout (indices are stable once built):
//   0  unk     vector of "unk" in the vector space
//   1  <PAD>   vector the space gives "<PAD>" (normally unk's)
//   2  eos     end-of-summary marker
//   3… every distinct corpus word, first appearance order
//   n  <SOS>   start-of-decoding marker, the zero vector
//
// The embedding table rows mirror the tokens; the decoder uses
// it to look up the vector of the word it just predicted.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::loader::END_TOKEN;
use crate::data::vector_space::UNK_TOKEN;
use crate::domain::{
    error::SummarizerError,
    example::{SummaryExample, WordVector},
    traits::VectorLookup,
};

pub const PAD_TOKEN:   &str = "<PAD>";
pub const START_TOKEN: &str = "<SOS>";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "VocabularyFile", into = "VocabularyFile")]
pub struct LimitedVocabulary {
    tokens:     Vec<String>,
    embeddings: Vec<Vec<f32>>,
    index:      HashMap<String, usize>,
}

/// On-disk shape; the index is rebuilt on load
#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    tokens:     Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl From<VocabularyFile> for LimitedVocabulary {
    fn from(file: VocabularyFile) -> Self {
        Self::from_parts(file.tokens, file.embeddings)
    }
}

impl From<LimitedVocabulary> for VocabularyFile {
    fn from(vocab: LimitedVocabulary) -> Self {
        Self { tokens: vocab.tokens, embeddings: vocab.embeddings }
    }
}

impl LimitedVocabulary {
    /// Build from parallel token/embedding lists. First occurrence of a
    /// duplicated token wins the index.
    pub fn from_parts(tokens: Vec<String>, embeddings: Vec<Vec<f32>>) -> Self {
        let mut index = HashMap::with_capacity(tokens.len());
        for (i, t) in tokens.iter().enumerate() {
            index.entry(t.clone()).or_insert(i);
        }
        Self { tokens, embeddings, index }
    }

    /// Collect every word used by `examples`, resolved back to tokens
    /// through the vector space, plus the control tokens.
    pub fn build<L: VectorLookup>(lookup: &L, examples: &[SummaryExample]) -> Self {
        let mut tokens     = Vec::new();
        let mut embeddings = Vec::new();
        let mut seen       = HashSet::new();

        let mut push = |token: &str, vector: &[f32]| {
            if seen.insert(token.to_string()) {
                tokens.push(token.to_string());
                embeddings.push(vector.to_vec());
            }
        };

        for control in [UNK_TOKEN, PAD_TOKEN, END_TOKEN] {
            push(control, &lookup.word_to_vector(control)[..]);
        }

        for example in examples {
            for vector in example.target.iter().chain(&example.input) {
                push(lookup.vector_to_token(vector), &vector[..]);
            }
        }

        push(START_TOKEN, vec![0.0f32; lookup.dim()].as_slice());

        tracing::info!("Limited vocabulary holds {} tokens", tokens.len());
        Self::from_parts(tokens, embeddings)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Width of the embedding rows
    pub fn dim(&self) -> usize {
        self.embeddings.first().map_or(0, Vec::len)
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Row-major [len, dim] embedding table
    pub fn flat_embeddings(&self) -> Vec<f32> {
        self.embeddings.iter().flatten().copied().collect()
    }

    /// Vector fed to the decoder before anything has been predicted
    pub fn start_vector(&self) -> Result<&[f32], SummarizerError> {
        self.control_index(START_TOKEN).map(|i| self.embeddings[i].as_slice())
    }

    pub fn end_index(&self) -> Result<usize, SummarizerError> {
        self.control_index(END_TOKEN)
    }

    fn control_index(&self, token: &str) -> Result<usize, SummarizerError> {
        self.index_of(token)
            .ok_or_else(|| SummarizerError::MissingControlToken { token: token.to_string() })
    }

    /// Class indices of a target summary, dropping its trailing end marker.
    pub fn target_indices<L: VectorLookup>(
        &self,
        lookup: &L,
        target: &[WordVector],
    ) -> Result<Vec<usize>, SummarizerError> {
        let body = &target[..target.len().saturating_sub(1)];
        body.iter()
            .map(|vector| {
                let token = lookup.vector_to_token(vector);
                self.index_of(token)
                    .ok_or_else(|| SummarizerError::UnknownTarget { token: token.to_string() })
            })
            .collect()
    }

    /// Human-readable text for predicted indices. Punctuation attaches
    /// to the previous word.
    pub fn render(&self, indices: &[usize]) -> String {
        let mut out = String::new();
        for token in indices.iter().filter_map(|&i| self.token(i)) {
            let is_punct = token.chars().all(|c| c.is_ascii_punctuation());
            if !out.is_empty() && !is_punct {
                out.push(' ');
            }
            out.push_str(token);
        }
        out
    }
}
