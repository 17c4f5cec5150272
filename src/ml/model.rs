use burn::{nn::loss::CrossEntropyLossConfig, prelude::*};

use crate::data::batcher::{SummaryBatch, VocabularyTables};
use crate::domain::error::SummarizerError;
use crate::ml::decoder::{AttentionDecoder, AttentionDecoderConfig, DecodeOptions};
use crate::ml::encoder::{BidirectionalEncoder, BidirectionalEncoderConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SummarizerConfig {
    pub word_dim:       usize,
    pub hidden_size:    usize,
    pub vocab_len:      usize,
    #[config(default = 10)]
    pub window_radius:  usize,
    #[config(default = 5)]
    pub residual_depth: usize,
    #[config(default = 50)]
    pub alignment_dim:  usize,
    #[config(default = 0.01)]
    pub init_std:       f64,
}

impl SummarizerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SummarizerModel<B> {
        let encoder = BidirectionalEncoderConfig::new(self.word_dim, self.hidden_size, self.residual_depth)
            .with_init_std(self.init_std)
            .init(device);
        let decoder = AttentionDecoderConfig::new(
            self.word_dim, self.hidden_size, self.vocab_len,
            self.window_radius, self.residual_depth,
        )
        .with_alignment_dim(self.alignment_dim)
        .with_init_std(self.init_std)
        .init(device);

        SummarizerModel { encoder, decoder, window_radius: self.window_radius }
    }
}

#[derive(Module, Debug)]
pub struct SummarizerModel<B: Backend> {
    pub encoder:       BidirectionalEncoder<B>,
    pub decoder:       AttentionDecoder<B>,
    pub window_radius: usize,
}

impl<B: Backend> SummarizerModel<B> {
    /// Smallest input the local attention window fits in (2D+1)
    pub fn min_input_len(&self) -> usize {
        2 * self.window_radius + 1
    }

    /// input: [seq_len, word_dim] → scores: [output_len, vocab_len]
    pub fn forward(
        &self,
        input:      &Tensor<B, 2>,
        seq_len:    usize,
        output_len: usize,
        tables:     &VocabularyTables<B>,
        targets:    Option<&[usize]>,
        options:    DecodeOptions,
    ) -> Result<Tensor<B, 2>, SummarizerError> {
        let window = self.min_input_len();
        if seq_len > 0 && seq_len < window {
            return Err(SummarizerError::WindowExceedsSequence { seq_len, window });
        }

        let encoding = self.encoder.encode(input, seq_len)?;
        self.decoder.decode(&encoding, output_len, tables, targets, options)
    }

    /// Mean per-step cross entropy of one example, plus the raw scores.
    pub fn forward_loss(
        &self,
        batch:   &SummaryBatch<B>,
        tables:  &VocabularyTables<B>,
        options: DecodeOptions,
    ) -> Result<(Tensor<B, 1>, Tensor<B, 2>), SummarizerError> {
        let logits = self.forward(
            &batch.input,
            batch.seq_len,
            batch.output_len,
            tables,
            Some(batch.target_indices.as_slice()),
            options,
        )?;
        let loss = sequence_cross_entropy(logits.clone(), batch.targets.clone());
        Ok((loss, logits))
    }
}

/// logits: [T, V], targets: [T] → mean of the T per-step cross entropies
pub fn sequence_cross_entropy<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let ce = CrossEntropyLossConfig::new().init(&logits.device());
    ce.forward(logits, targets)
}

/// Greedy class per step: argmax over the vocabulary axis.
pub fn greedy_indices<B: Backend>(logits: Tensor<B, 2>) -> Vec<usize> {
    logits
        .argmax(1)
        .into_data()
        .iter::<i64>()
        .map(|i| i as usize)
        .collect()
}
