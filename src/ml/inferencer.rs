// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the trained architecture from train_config.json,
// restores the latest checkpoint and greedy-decodes summaries.
// The decoded classes are cut at the first end marker.

use anyhow::{Context, Result};
use burn::prelude::*;

use crate::data::{
    batcher::{SummaryBatcher, VocabularyTables},
    vocabulary::LimitedVocabulary,
};
use crate::domain::example::WordVector;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    decoder::{DecodeOptions, FeedbackMode},
    default_device,
    model::{greedy_indices, SummarizerModel},
    InnerBackend,
};

pub struct Inferencer {
    model:     SummarizerModel<InnerBackend>,
    batcher:   SummaryBatcher<InnerBackend>,
    tables:    VocabularyTables<InnerBackend>,
    end_index: usize,
    options:   DecodeOptions,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, vocab: &LimitedVocabulary) -> Result<Self> {
        let device    = default_device();
        let cfg       = ckpt_manager.load_config()?;
        let model_cfg = cfg.model_config(vocab.dim(), vocab.len());

        let model: SummarizerModel<InnerBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Self::new(model, vocab, DecodeOptions::new(FeedbackMode::Greedy, cfg.decoder_shared_bias_bug))
    }

    pub fn new(
        model:   SummarizerModel<InnerBackend>,
        vocab:   &LimitedVocabulary,
        options: DecodeOptions,
    ) -> Result<Self> {
        let batcher   = SummaryBatcher::new(default_device());
        let tables    = batcher.vocabulary_tables(vocab)?;
        let end_index = vocab.end_index()?;
        Ok(Self { model, batcher, tables, end_index, options })
    }

    /// Smallest input the model accepts
    pub fn min_input_len(&self) -> usize {
        self.model.min_input_len()
    }

    /// Decode `length` steps for the given input vectors and return the
    /// predicted classes up to (not including) the first end marker.
    pub fn predict(&self, input: &[WordVector], length: usize) -> Result<Vec<usize>> {
        let tensor = self.batcher.input(input)?;

        let scores = self
            .model
            .forward(&tensor, input.len(), length, &self.tables, None, self.options)
            .context("Decoding failed")?;

        let predicted = truncate_at_end(greedy_indices(scores), self.end_index);
        tracing::debug!("Decoded {} of {} steps before the end marker", predicted.len(), length);
        Ok(predicted)
    }
}

/// Drop the first occurrence of `end` and everything after it.
pub fn truncate_at_end(mut indices: Vec<usize>, end: usize) -> Vec<usize> {
    if let Some(pos) = indices.iter().position(|&i| i == end) {
        indices.truncate(pos);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SummarizerConfig;
    use std::sync::Arc;

    fn vocab() -> LimitedVocabulary {
        LimitedVocabulary::from_parts(
            ["unk", "<PAD>", "eos", "cat", "sat", "<SOS>"].iter().map(|t| t.to_string()).collect(),
            vec![
                vec![0.1, 0.2], vec![0.0, 0.0], vec![0.9, 0.9],
                vec![0.4, -0.3], vec![-0.6, 0.5], vec![0.0, 0.0],
            ],
        )
    }

    #[test]
    fn test_truncate_at_first_end_marker() {
        assert_eq!(truncate_at_end(vec![4, 3, 2, 4, 2], 2), vec![4, 3]);
        assert_eq!(truncate_at_end(vec![2, 3], 2), Vec::<usize>::new());
        assert_eq!(truncate_at_end(vec![3, 4], 2), vec![3, 4]);
    }

    #[test]
    fn test_predict_stays_within_length_and_vocabulary() {
        let vocab = vocab();
        let model = SummarizerConfig::new(2, 2, vocab.len())
            .with_window_radius(1)
            .with_residual_depth(1)
            .init(&default_device());
        let inferencer = Inferencer::new(model, &vocab, DecodeOptions::inference()).unwrap();

        let word: WordVector = Arc::from(&[0.4f32, -0.3][..]);
        let predicted = inferencer.predict(&vec![word; 4], 3).unwrap();
        assert!(predicted.len() <= 3);
        assert!(predicted.iter().all(|&i| i < vocab.len() && i != 2));
    }

    #[test]
    fn test_predict_rejects_short_input() {
        let vocab = vocab();
        let model = SummarizerConfig::new(2, 2, vocab.len())
            .with_window_radius(2)
            .init(&default_device());
        let inferencer = Inferencer::new(model, &vocab, DecodeOptions::inference()).unwrap();
        assert_eq!(inferencer.min_input_len(), 5);

        let word: WordVector = Arc::from(&[0.4f32, -0.3][..]);
        assert!(inferencer.predict(&vec![word; 3], 2).is_err());
    }
}
