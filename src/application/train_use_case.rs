// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load word vectors          (Layer 4 - data)
//   Step 2: Load the JSONL corpus      (Layer 4 - data)
//   Step 3: Tokenize + vectorize       (Layer 4 - data)
//   Step 4: Length filter              (Layer 4 - data)
//   Step 5: Build limited vocabulary   (Layer 4 - data)
//   Step 6: Train/val/test split       (Layer 4 - data)
//   Step 7: Save vocabulary + config   (Layer 6 - infra)
//   Step 8: Run training loop          (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::SummaryDataset,
    filter::LengthFilter,
    loader::{CorpusLoader, Vectorizer},
    splitter::split_train_val_test,
    vector_space::VectorSpace,
    vocabulary::LimitedVocabulary,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    vocabulary_store::VocabularyStore,
};
use crate::ml::{
    decoder::{DecodeOptions, FeedbackMode},
    model::SummarizerConfig,
    trainer::{run_training, TrainingData},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded for inference;
// missing fields in an older file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub corpus_path:     String,
    pub vectors_path:    String,
    pub checkpoint_dir:  String,
    /// Longest kept summary, end marker excluded
    pub max_summary_len: usize,
    pub max_text_len:    usize,
    /// D, local attention half-width
    pub window_radius:   usize,
    /// K, residual attention depth
    pub residual_depth:  usize,
    pub hidden_size:     usize,
    pub alignment_dim:   usize,
    pub learning_rate:   f64,
    pub epochs:          usize,
    pub init_std:        f64,
    /// Log a per-example report every N examples, 0 disables
    pub display_step:    usize,
    pub train_fraction:  f64,
    pub val_fraction:    f64,
    pub feedback_mode:   FeedbackMode,
    /// Decoder input/output gates read the forget-gate bias
    pub decoder_shared_bias_bug: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_path:     "data/corpus.jsonl".to_string(),
            vectors_path:    "data/glove.6B.50d.txt".to_string(),
            checkpoint_dir:  "checkpoints".to_string(),
            max_summary_len: 7,
            max_text_len:    80,
            window_radius:   10,
            residual_depth:  5,
            hidden_size:     500,
            alignment_dim:   50,
            learning_rate:   0.003,
            epochs:          5,
            init_std:        0.01,
            display_step:    1,
            train_fraction:  0.7,
            val_fraction:    0.15,
            feedback_mode:   FeedbackMode::Greedy,
            decoder_shared_bias_bug: true,
        }
    }
}

impl TrainConfig {
    /// Decoding behaviour used for both training and validation
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new(self.feedback_mode, self.decoder_shared_bias_bug)
    }

    /// Architecture for vectors of width `word_dim` and `vocab_len` classes
    pub fn model_config(&self, word_dim: usize, vocab_len: usize) -> SummarizerConfig {
        SummarizerConfig::new(word_dim, self.hidden_size, vocab_len)
            .with_window_radius(self.window_radius)
            .with_residual_depth(self.residual_depth)
            .with_alignment_dim(self.alignment_dim)
            .with_init_std(self.init_std)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        let cfg = &self.config;

        // ── Step 1: Word vectors ──────────────────────────────────────────────
        let space = VectorSpace::load(&cfg.vectors_path)?;

        // ── Step 2: Corpus ────────────────────────────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.corpus_path);
        let raw = CorpusLoader::new(&cfg.corpus_path).load_all()?;
        tracing::info!("Loaded {} text/summary pairs", raw.len());

        // ── Step 3: Tokenize + vectorize ──────────────────────────────────────
        // Summaries gain a trailing `eos` vector here
        let vectorizer = Vectorizer::new(&space);
        let examples: Vec<_> = raw.iter().map(|r| vectorizer.vectorize(r)).collect();

        // ── Step 4: Length filter ─────────────────────────────────────────────
        // Drops texts too short for the 2D+1 attention window
        let filter   = LengthFilter::new(cfg.max_summary_len, cfg.max_text_len, cfg.window_radius);
        let examples = filter.apply(examples);
        ensure!(!examples.is_empty(), "No example survived the length filter");

        // ── Step 5: Limited vocabulary over every split ───────────────────────
        let vocab = LimitedVocabulary::build(&space, &examples);
        tracing::info!("Limited vocabulary: {} tokens", vocab.len());

        // ── Step 6: Ordered split ─────────────────────────────────────────────
        let splits = split_train_val_test(examples, cfg.train_fraction, cfg.val_fraction);
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            splits.train.len(),
            splits.val.len(),
            splits.test.len(),
        );
        ensure!(!splits.train.is_empty(), "Training split is empty");

        // ── Step 7: Persist what inference needs ──────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        VocabularyStore::new(&cfg.checkpoint_dir).save(&vocab)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        let data = TrainingData {
            lookup: &space,
            vocab:  &vocab,
            train:  SummaryDataset::new(splits.train),
            val:    SummaryDataset::new(splits.val),
        };
        run_training(cfg, data, &ckpt_manager, &metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let cfg = TrainConfig::default();
        assert_eq!((cfg.window_radius, cfg.residual_depth, cfg.hidden_size), (10, 5, 500));
        assert_eq!(cfg.learning_rate, 0.003);
        assert_eq!(cfg.feedback_mode, FeedbackMode::Greedy);
        assert!(cfg.decoder_shared_bias_bug);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let cfg: TrainConfig = serde_json::from_str(r#"{"hidden_size": 8, "feedback_mode": "teacher-forced"}"#).unwrap();
        assert_eq!(cfg.hidden_size, 8);
        assert_eq!(cfg.feedback_mode, FeedbackMode::TeacherForced);
        assert_eq!(cfg.max_text_len, 80);
    }

    #[test]
    fn test_model_config_mirrors_hyperparameters() {
        let cfg = TrainConfig { hidden_size: 12, window_radius: 2, residual_depth: 3, ..TrainConfig::default() };
        let model = cfg.model_config(50, 99);
        assert_eq!((model.word_dim, model.hidden_size, model.vocab_len), (50, 12, 99));
        assert_eq!((model.window_radius, model.residual_depth), (2, 3));
    }

    #[test]
    fn test_decode_options_follow_config() {
        use crate::ml::cell::BiasWiring;

        let cfg = TrainConfig::default();
        let options = cfg.decode_options();
        assert_eq!(options.feedback, FeedbackMode::Greedy);
        assert_eq!(options.bias_wiring, BiasWiring::ForgetShared);

        let cfg = TrainConfig {
            feedback_mode: FeedbackMode::TeacherForced,
            decoder_shared_bias_bug: false,
            ..TrainConfig::default()
        };
        let options = cfg.decode_options();
        assert_eq!(options.feedback, FeedbackMode::TeacherForced);
        assert_eq!(options.bias_wiring, BiasWiring::PerGate);
    }

    #[test]
    fn test_tiny_end_to_end_run_writes_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let vectors = tmp.path().join("vectors.txt");
        let corpus  = tmp.path().join("corpus.jsonl");
        let ckpt    = tmp.path().join("ckpt");

        fs::write(
            &vectors,
            "unk 0.1 0.2\neos 0.9 0.9\nthe 0.3 -0.7\ncat 0.4 -0.3\nsat -0.6 0.5\non 0.2 0.1\nmat 0.2 0.8\n. -0.1 -0.9\n",
        )
        .unwrap();
        let line = r#"{"text": "The cat sat on the mat.", "summary": "Cat sat."}"#;
        fs::write(&corpus, [line; 4].join("\n")).unwrap();

        let cfg = TrainConfig {
            corpus_path:    corpus.display().to_string(),
            vectors_path:   vectors.display().to_string(),
            checkpoint_dir: ckpt.display().to_string(),
            window_radius:  1,
            residual_depth: 1,
            hidden_size:    2,
            alignment_dim:  3,
            epochs:         1,
            display_step:   0,
            train_fraction: 0.5,
            val_fraction:   0.25,
            ..TrainConfig::default()
        };

        let history = TrainUseCase::new(cfg).execute().unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].train_loss.is_finite());

        for file in ["train_config.json", "vocabulary.json", "metrics.csv", "latest_epoch.json"] {
            assert!(ckpt.join(file).exists(), "{file} missing");
        }
    }
}
