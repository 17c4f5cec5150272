// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the limited vocabulary next to the checkpoints so the
// output projection at inference time indexes the same tokens,
// in the same order, as during training.
//
//   checkpoints/vocabulary.json
//     { "tokens": [...], "embeddings": [[...], ...] }

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::vocabulary::LimitedVocabulary;

pub struct VocabularyStore {
    dir: PathBuf,
}

impl VocabularyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("vocabulary.json")
    }

    pub fn save(&self, vocab: &LimitedVocabulary) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create vocabulary directory '{}'", self.dir.display()))?;
        let path = self.path();
        let json = serde_json::to_string(vocab)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;

        tracing::info!("Saved vocabulary of {} tokens to '{}'", vocab.len(), path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<LimitedVocabulary> {
        let path = self.path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!("Cannot read vocabulary from '{}'. Have you run 'train' first?", path.display())
        })?;

        let vocab: LimitedVocabulary = serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary in '{}'", path.display()))?;
        tracing::debug!("Loaded vocabulary of {} tokens", vocab.len());
        Ok(vocab)
    }
}
