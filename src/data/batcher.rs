// ============================================================
// Layer 4 — Example Batcher
// ============================================================
// Converts ONE vectorised example into the tensors a forward
// pass needs. Training is strictly per-example (no mini-batches),
// so a "batch" here is a single input sequence and its targets:
//
//   input   [seq_len, word_dim]    float, one row per word
//   targets [output_len]           int, limited-vocabulary classes
//
// The sequence lengths travel alongside as plain usizes; the
// encoder and decoder loop on them directly.
//
// It also builds the two constant tables the decoder reads from
// the limited vocabulary: the embedding table used for feeding
// back predictions and the <SOS> start vector.
//
// Reference: Burn Book §4 (Batcher)

use burn::{prelude::*, tensor::TensorData};

use crate::data::vocabulary::LimitedVocabulary;
use crate::domain::{
    error::SummarizerError,
    example::{SummaryExample, WordVector},
};

/// Tensors for one example.
#[derive(Debug, Clone)]
pub struct SummaryBatch<B: Backend> {
    /// Word vectors of the input text — shape: [seq_len, word_dim]
    pub input: Tensor<B, 2>,

    /// Target class per decoder step — shape: [output_len]
    pub targets: Tensor<B, 1, Int>,

    /// Target classes on the host, for teacher forcing and accuracy
    pub target_indices: Vec<usize>,

    pub seq_len:    usize,
    pub output_len: usize,
}

/// Embedding table and start vector, resident on the device.
#[derive(Debug, Clone)]
pub struct VocabularyTables<B: Backend> {
    /// shape: [vocab_len, word_dim]
    pub embeddings: Tensor<B, 2>,
    /// shape: [1, word_dim]
    pub start: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct SummaryBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SummaryBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack the input vectors row by row and attach the target classes.
    pub fn batch(
        &self,
        example:        &SummaryExample,
        target_indices: Vec<usize>,
    ) -> Result<SummaryBatch<B>, SummarizerError> {
        let input = self.input(&example.input)?;

        let classes: Vec<i32> = target_indices.iter().map(|&i| i as i32).collect();
        let targets = Tensor::<B, 1, Int>::from_ints(classes.as_slice(), &self.device);

        Ok(SummaryBatch {
            input,
            targets,
            output_len: target_indices.len(),
            target_indices,
            seq_len: example.seq_len(),
        })
    }

    /// Input vectors only, as a [seq_len, word_dim] tensor.
    pub fn input(&self, vectors: &[WordVector]) -> Result<Tensor<B, 2>, SummarizerError> {
        let seq_len  = vectors.len();
        let word_dim = vectors.first().map_or(0, |v| v.len());
        if seq_len == 0 {
            return Err(SummarizerError::EmptySequence { what: "input text" });
        }

        let mut flat = Vec::with_capacity(seq_len * word_dim);
        for v in vectors {
            if v.len() != word_dim {
                return Err(SummarizerError::DimensionMismatch { expected: word_dim, found: v.len() });
            }
            flat.extend_from_slice(v);
        }

        Ok(Tensor::<B, 2>::from_data(TensorData::new(flat, [seq_len, word_dim]), &self.device))
    }

    pub fn vocabulary_tables(
        &self,
        vocab: &LimitedVocabulary,
    ) -> Result<VocabularyTables<B>, SummarizerError> {
        let dim   = vocab.dim();
        let start = vocab.start_vector()?.to_vec();

        let embeddings = Tensor::<B, 2>::from_data(
            TensorData::new(vocab.flat_embeddings(), [vocab.len(), dim]),
            &self.device,
        );
        let start = Tensor::<B, 2>::from_data(TensorData::new(start, [1, dim]), &self.device);

        Ok(VocabularyTables { embeddings, start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::sync::Arc;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_shapes() {
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());
        let v: Arc<[f32]> = Arc::from(&[0.5f32, -0.5][..]);
        let ex = SummaryExample::new(vec![v.clone(); 4], vec![v.clone(); 3]);

        let batch = batcher.batch(&ex, vec![3, 4]).unwrap();
        assert_eq!(batch.input.dims(), [4, 2]);
        assert_eq!(batch.targets.dims(), [2]);
        assert_eq!((batch.seq_len, batch.output_len), (4, 2));
    }

    #[test]
    fn test_empty_input_rejected() {
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());
        let ex = SummaryExample::new(Vec::new(), Vec::new());
        assert!(matches!(
            batcher.batch(&ex, Vec::new()),
            Err(SummarizerError::EmptySequence { .. })
        ));
    }

    #[test]
    fn test_ragged_input_rejected() {
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());
        let a: Arc<[f32]> = Arc::from(&[0.5f32, -0.5][..]);
        let b: Arc<[f32]> = Arc::from(&[0.5f32][..]);
        assert_eq!(
            batcher.input(&[a, b]).unwrap_err(),
            SummarizerError::DimensionMismatch { expected: 2, found: 1 }
        );
    }

    #[test]
    fn test_vocabulary_tables_shapes() {
        let batcher = SummaryBatcher::<TestBackend>::new(Default::default());
        let vocab = LimitedVocabulary::from_parts(
            vec!["unk".into(), "<PAD>".into(), "eos".into(), "<SOS>".into()],
            vec![vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 1.0], vec![0.0, 0.0]],
        );
        let tables = batcher.vocabulary_tables(&vocab).unwrap();
        assert_eq!(tables.embeddings.dims(), [4, 2]);
        assert_eq!(tables.start.dims(), [1, 2]);
    }
}
