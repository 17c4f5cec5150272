// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code apart
// from the tensor batcher in the data layer.
//
// What's in this layer:
//
//   cell.rs       — LSTM cell with the residual recurrent
//                   attention (RRA) term inside tanh
//
//   residual.rs   — History window of the last K hidden states
//                   and the learned convex mixture over them
//
//   encoder.rs    — Forward + backward RRA-LSTM scans,
//                   concatenated into [seq_len, 2H]
//
//   attention.rs  — Local attention: predicted centre, window
//                   of 2D+1 encoder states, Gaussian decay
//
//   decoder.rs    — Autoregressive decoder: attention, hidden
//                   mixing, vocabulary scores, next-input feedback
//
//   model.rs      — Encoder + decoder, sequence cross-entropy
//
//   trainer.rs    — Per-example Adam loop with validation,
//                   metrics and checkpoint saving per epoch
//
//   inferencer.rs — Loads a checkpoint and decodes summaries
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation

/// LSTM cell with residual recurrent attention
pub mod cell;

/// Residual attention history window
pub mod residual;

/// Bidirectional RRA-LSTM encoder
pub mod encoder;

/// Local attention with a predicted centre
pub mod attention;

/// Autoregressive attention decoder
pub mod decoder;

/// Full summarizer model and sequence loss
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and decodes summaries
pub mod inferencer;

/// Backend used for evaluation and inference.
#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray;
#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

/// Backend used for training (gradients tracked).
pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;

/// Default device of the inner backend.
pub fn default_device() -> <InnerBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}

#[cfg(test)]
pub(crate) mod test_util {
    use burn::prelude::*;

    pub type TestBackend         = burn::backend::NdArray;
    pub type TestAutodiffBackend = burn::backend::Autodiff<TestBackend>;

    pub fn device() -> <TestBackend as Backend>::Device {
        Default::default()
    }

    pub fn values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
        tensor.into_data().to_vec::<f32>().unwrap()
    }
}
