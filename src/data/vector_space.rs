// ============================================================
// Layer 4 — Vector Space (pretrained GloVe embeddings)
// ============================================================
// Loads pretrained word vectors and answers the two lookups the
// rest of the system needs:
//
//   word_to_vector  token  → vector   (unknown words map to "unk")
//   vector_to_token vector → token    (exact match first, then the
//                                      nearest neighbour by cosine
//                                      similarity)
//
// File format (glove.6B.50d.txt and friends):
//   the 0.418 0.24968 -0.41242 ...
//   ,   0.013441 0.23682 -0.16899 ...
// One row per token, the token followed by its components,
// separated by single spaces.
//
// Reference: Pennington et al. (2014) GloVe
//            Rust Book §8 (HashMap)

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::Arc,
};

use crate::domain::{error::SummarizerError, example::WordVector, traits::VectorLookup};

/// Token used for every word without its own vector
pub const UNK_TOKEN: &str = "unk";

pub struct VectorSpace {
    tokens:  Vec<String>,
    vectors: Vec<WordVector>,
    /// L2 norm of every row, cached for nearest-neighbour search
    norms:   Vec<f32>,
    index:   HashMap<String, usize>,
    /// Bit patterns of every row, for exact vector → token matches
    exact:   HashMap<Vec<u32>, usize>,
    unk:     usize,
    dim:     usize,
}

impl VectorSpace {
    /// Load a GloVe-format text file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Cannot open word vectors '{}'", path.display()))?;

        let space = Self::from_glove_reader(BufReader::new(file))
            .with_context(|| format!("Cannot parse word vectors '{}'", path.display()))?;

        tracing::info!(
            "Loaded {} word vectors of width {} from '{}'",
            space.len(),
            space.dim,
            path.display()
        );
        Ok(space)
    }

    /// Parse GloVe rows from any buffered reader.
    pub fn from_glove_reader(reader: impl BufRead) -> Result<Self> {
        let mut tokens  = Vec::new();
        let mut vectors = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.trim().split(' ');
            let Some(token) = fields.next().filter(|t| !t.is_empty()) else {
                continue;
            };
            let values = fields
                .map(str::parse::<f32>)
                .collect::<Result<Vec<f32>, _>>()
                .with_context(|| format!("Bad number on line {}", line_no + 1))?;
            tokens.push(token.to_string());
            vectors.push(values);
        }

        Ok(Self::from_rows(tokens, vectors)?)
    }

    /// Build a vector space from parallel token/vector lists.
    /// The first occurrence of a duplicated token wins the index.
    pub fn from_rows(
        tokens:  Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, SummarizerError> {
        let dim = vectors.first().map_or(0, Vec::len);

        let mut index = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            index.entry(token.clone()).or_insert(i);
        }

        let mut rows  = Vec::with_capacity(vectors.len());
        let mut norms = Vec::with_capacity(vectors.len());
        let mut exact = HashMap::with_capacity(vectors.len());
        for (i, v) in vectors.into_iter().enumerate() {
            if v.len() != dim {
                return Err(SummarizerError::DimensionMismatch { expected: dim, found: v.len() });
            }
            norms.push(v.iter().map(|x| x * x).sum::<f32>().sqrt());
            exact.entry(bit_key(&v)).or_insert(i);
            rows.push(WordVector::from(v));
        }

        let unk = *index
            .get(UNK_TOKEN)
            .ok_or_else(|| SummarizerError::MissingControlToken { token: UNK_TOKEN.to_string() })?;

        Ok(Self { tokens, vectors: rows, norms, index, exact, unk, dim })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Index of the row most similar to `vector` by cosine similarity.
    /// Rows (or queries) with zero norm have undefined similarity and
    /// never win unless every row is undefined.
    fn nearest_neighbour(&self, vector: &[f32]) -> usize {
        let query_norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

        let mut best       = self.unk;
        let mut best_score = f32::NEG_INFINITY;
        for (i, row) in self.vectors.iter().enumerate() {
            let dot: f32 = row.iter().zip(vector).map(|(a, b)| a * b).sum();
            let score = dot / (query_norm * self.norms[i]);
            if score.is_finite() && score > best_score {
                best_score = score;
                best       = i;
            }
        }
        best
    }
}

/// Hashable key for exact float equality; -0.0 and 0.0 share a key.
fn bit_key(vector: &[f32]) -> Vec<u32> {
    vector.iter().map(|x| (x + 0.0).to_bits()).collect()
}

impl VectorLookup for VectorSpace {
    fn dim(&self) -> usize {
        self.dim
    }

    fn word_to_vector(&self, token: &str) -> WordVector {
        let i = self.index.get(token).copied().unwrap_or(self.unk);
        Arc::clone(&self.vectors[i])
    }

    fn vector_to_token(&self, vector: &[f32]) -> &str {
        if let Some(&i) = self.exact.get(&bit_key(vector)) {
            return &self.tokens[i];
        }
        &self.tokens[self.nearest_neighbour(vector)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOVE: &str = "\
unk 0.0 0.0 1.0
the 1.0 0.0 0.0
cat 0.0 1.0 0.0
sat 0.7 0.7 0.0
";

    fn space() -> VectorSpace {
        VectorSpace::from_glove_reader(GLOVE.as_bytes()).unwrap()
    }

    #[test]
    fn test_loads_rows_and_width() {
        let s = space();
        assert_eq!(s.len(), 4);
        assert_eq!(s.dim(), 3);
    }

    #[test]
    fn test_unknown_word_falls_back_to_unk() {
        let s = space();
        assert_eq!(s.word_to_vector("dog").as_ref(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_round_trip_returns_original_token() {
        let s = space();
        for token in ["the", "cat", "sat", "unk"] {
            let v = s.word_to_vector(token);
            assert_eq!(s.vector_to_token(&v), token);
        }
    }

    #[test]
    fn test_unseen_vector_resolves_to_nearest_neighbour() {
        let s = space();
        // Closest in angle to "cat" (0,1,0)
        assert_eq!(s.vector_to_token(&[0.1, 2.0, 0.05]), "cat");
        // Between "the" and "cat" but nearer the diagonal
        assert_eq!(s.vector_to_token(&[0.5, 0.55, 0.0]), "sat");
    }

    #[test]
    fn test_zero_vector_does_not_panic() {
        let s = space();
        // Similarity is undefined for every row, so unk is returned
        assert_eq!(s.vector_to_token(&[0.0, 0.0, 0.0]), "unk");
    }

    #[test]
    fn test_negative_zero_matches_exactly() {
        let s = space();
        assert_eq!(s.vector_to_token(&[-0.0, 1.0, 0.0]), "cat");
    }

    #[test]
    fn test_missing_unk_is_rejected() {
        let err = VectorSpace::from_glove_reader("the 1.0 0.0\n".as_bytes());
        assert!(err.is_err());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = VectorSpace::from_rows(
            vec!["unk".into(), "the".into()],
            vec![vec![0.0, 1.0], vec![1.0]],
        );
        assert_eq!(
            err.err(),
            Some(SummarizerError::DimensionMismatch { expected: 2, found: 1 })
        );
    }
}
