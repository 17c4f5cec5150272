// ============================================================
// Layer 2 — Summarize Use Case
// ============================================================
// Rebuilds everything a trained run left behind and turns a
// passage into a summary:
//
//   train_config.json → architecture, default summary length
//   vocabulary.json   → output classes and feedback embeddings
//   word vectors      → input vectorisation
//   latest checkpoint → weights
//
// The passage is cleaned and tokenized exactly like the training
// corpus; unknown words become `unk`.

use anyhow::{Context, Result};

use crate::data::{
    loader::Vectorizer,
    vector_space::VectorSpace,
    vocabulary::LimitedVocabulary,
};
use crate::domain::{error::SummarizerError, traits::Summarizer};
use crate::infra::{checkpoint::CheckpointManager, vocabulary_store::VocabularyStore};
use crate::ml::inferencer::Inferencer;

pub struct SummarizeUseCase {
    space:      VectorSpace,
    vocab:      LimitedVocabulary,
    inferencer: Inferencer,
    length:     usize,
}

impl SummarizeUseCase {
    /// `vectors_path` and `length` override what the training run recorded.
    pub fn new(checkpoint_dir: &str, vectors_path: Option<String>, length: Option<usize>) -> Result<Self> {
        let ckpt = CheckpointManager::new(checkpoint_dir)?;
        let cfg  = ckpt.load_config()?;

        let vectors_path = vectors_path.unwrap_or_else(|| cfg.vectors_path.clone());
        let space = VectorSpace::load(&vectors_path)
            .with_context(|| format!("Loading word vectors for inference from '{vectors_path}'"))?;

        let vocab      = VocabularyStore::new(checkpoint_dir).load()?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, &vocab)?;
        let length     = length.unwrap_or(cfg.max_summary_len);

        Ok(Self { space, vocab, inferencer, length })
    }
}

impl Summarizer for SummarizeUseCase {
    fn summarize(&self, text: &str) -> Result<String> {
        let vectors = Vectorizer::new(&self.space).vectorize_text(text);

        let window = self.inferencer.min_input_len();
        if vectors.len() < window {
            return Err(SummarizerError::WindowExceedsSequence { seq_len: vectors.len(), window }.into());
        }

        let predicted = self.inferencer.predict(&vectors, self.length)?;
        tracing::info!("Summarised {} tokens into {}", vectors.len(), predicted.len());
        Ok(self.vocab.render(&predicted))
    }
}
