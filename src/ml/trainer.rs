// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Strictly per-example training with Adam: every example is
// encoded, decoded, scored and used for one parameter update
// before the next one is touched. No shuffling, no batching,
// no gradient accumulation.
//
// Key Burn 0.20 insight:
//   - Training uses TrainBackend (Autodiff<Inner>) for gradients
//   - model.valid() returns the model on InnerBackend
//   - Validation tensors must also live on InnerBackend
//   - argmax(1) returns [T,1], flattened when read back
//
// A non-finite loss aborts the run BEFORE backward/step so the
// parameters are never updated from it.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{Context, Result};
use burn::{
    data::dataset::Dataset,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{SummaryBatch, SummaryBatcher, VocabularyTables},
    dataset::SummaryDataset,
    vocabulary::LimitedVocabulary,
};
use crate::domain::{error::SummarizerError, example::SummaryExample, traits::VectorLookup};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    decoder::DecodeOptions,
    default_device,
    model::{greedy_indices, SummarizerModel},
    InnerBackend, TrainBackend,
};

/// Per-example result handed to the reporting layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleReport {
    pub loss:      f64,
    pub predicted: Vec<usize>,
}

/// Everything the loop reads besides the model itself.
pub struct TrainingData<'a, L: VectorLookup> {
    pub lookup: &'a L,
    pub vocab:  &'a LimitedVocabulary,
    pub train:  SummaryDataset,
    pub val:    SummaryDataset,
}

/// One forward pass, finite check, backward pass and Adam update.
///
/// `example` is only used to label a numeric failure.
pub fn train_step<B, O>(
    model:   SummarizerModel<B>,
    optim:   &mut O,
    batch:   &SummaryBatch<B>,
    tables:  &VocabularyTables<B>,
    options: DecodeOptions,
    lr:      f64,
    example: usize,
) -> Result<(SummarizerModel<B>, ExampleReport), SummarizerError>
where
    B: AutodiffBackend,
    O: Optimizer<SummarizerModel<B>, B>,
{
    let (loss, logits) = model.forward_loss(batch, tables, options)?;

    let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
    if !loss_val.is_finite() {
        return Err(SummarizerError::NumericInstability { example, loss: loss_val });
    }
    let predicted = greedy_indices(logits);

    // Backward pass + Adam update
    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    let model = optim.step(lr, model, grads);

    Ok((model, ExampleReport { loss: loss_val, predicted }))
}

/// Mean loss and token accuracy over a split, without gradients.
pub fn evaluate<B: Backend, L: VectorLookup>(
    model:   &SummarizerModel<B>,
    dataset: &SummaryDataset,
    lookup:  &L,
    vocab:   &LimitedVocabulary,
    batcher: &SummaryBatcher<B>,
    tables:  &VocabularyTables<B>,
    options: DecodeOptions,
) -> Result<(f64, f64), SummarizerError> {
    let mut loss_sum = 0.0f64;
    let mut examples = 0usize;
    let mut correct  = 0usize;
    let mut steps    = 0usize;

    for example in dataset.iter() {
        let targets = vocab.target_indices(lookup, &example.target)?;
        let batch   = batcher.batch(&example, targets)?;
        let (loss, logits) = model.forward_loss(&batch, tables, options)?;

        loss_sum += loss.into_scalar().elem::<f64>();
        examples += 1;

        correct += greedy_indices(logits)
            .iter()
            .zip(&batch.target_indices)
            .filter(|(p, t)| p == t)
            .count();
        steps += batch.output_len;
    }

    let avg_loss = if examples > 0 { loss_sum / examples as f64 } else { f64::NAN };
    let accuracy = if steps    > 0 { correct as f64 / steps as f64 } else { 0.0 };
    Ok((avg_loss, accuracy))
}

pub fn run_training<L: VectorLookup>(
    cfg:          &TrainConfig,
    data:         TrainingData<'_, L>,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<Vec<EpochMetrics>> {
    let device = default_device();
    tracing::info!("Using device: {:?}", device);
    train_loop(cfg, data, ckpt_manager, metrics, device)
}

fn train_loop<L: VectorLookup>(
    cfg:          &TrainConfig,
    data:         TrainingData<'_, L>,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    device:       <InnerBackend as Backend>::Device,
) -> Result<Vec<EpochMetrics>> {
    let TrainingData { lookup, vocab, train, val } = data;
    let options = cfg.decode_options();

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config(lookup.dim(), vocab.len());
    let mut model: SummarizerModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: hidden={}, vocab={}, D={}, K={}, feedback={}",
        cfg.hidden_size, vocab.len(), cfg.window_radius, cfg.residual_depth, cfg.feedback_mode,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Constant tables, one copy per backend ────────────────────────────────
    let train_batcher = SummaryBatcher::<TrainBackend>::new(device.clone());
    let train_tables  = train_batcher.vocabulary_tables(vocab)?;
    let val_batcher   = SummaryBatcher::<InnerBackend>::new(device.clone());
    let val_tables    = val_batcher.vocabulary_tables(vocab)?;

    let mut history       = Vec::with_capacity(cfg.epochs);
    let mut best_val_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_examples = 0usize;

        for (index, example) in train.iter().enumerate() {
            let targets = vocab
                .target_indices(lookup, &example.target)
                .with_context(|| format!("Training example {index}"))?;
            let batch = train_batcher.batch(&example, targets)?;

            let (next, report) = train_step(
                model, &mut optim, &batch, &train_tables, options, cfg.learning_rate, index,
            )
            .with_context(|| format!("Epoch {epoch}, training example {index}"))?;
            model = next;

            train_loss_sum += report.loss;
            train_examples += 1;

            if cfg.display_step > 0 && index % cfg.display_step == 0 {
                log_report(epoch, index, &example, &batch.target_indices, &report, lookup, vocab);
            }
        }

        let avg_train_loss = if train_examples > 0 {
            train_loss_sum / train_examples as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → SummarizerModel<InnerBackend>, no autodiff overhead
        let model_valid = model.valid();
        let (avg_val_loss, val_accuracy) = evaluate(
            &model_valid, &val, lookup, vocab, &val_batcher, &val_tables, options,
        )
        .with_context(|| format!("Validation after epoch {epoch}"))?;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_accuracy * 100.0,
        );

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_accuracy);
        metrics.log(&row)?;
        if row.is_improvement(best_val_loss) {
            best_val_loss = row.val_loss;
            tracing::info!("Epoch {} has the best validation loss so far ({:.4})", epoch, best_val_loss);
        }
        history.push(row);

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());
    Ok(history)
}

fn log_report<L: VectorLookup>(
    epoch:   usize,
    index:   usize,
    example: &SummaryExample,
    targets: &[usize],
    report:  &ExampleReport,
    lookup:  &L,
    vocab:   &LimitedVocabulary,
) {
    let text: Vec<&str> = example.input.iter().map(|v| lookup.vector_to_token(v)).collect();
    tracing::info!(
        "Epoch {} example {} | loss={:.4}\n  text:      {}\n  predicted: {}\n  actual:    {}",
        epoch,
        index,
        report.loss,
        text.join(" "),
        vocab.render(&report.predicted),
        vocab.render(targets),
    );
}
