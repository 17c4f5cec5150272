// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the file-system concerns shared by training and
// inference:
//
//   checkpoint.rs       — Saving and loading model weights
//                         with Burn's CompactRecorder, plus
//                         TrainConfig as JSON so inference can
//                         rebuild the model.
//
//   vocabulary_store.rs — Limited vocabulary persistence, so
//                         inference indexes the same classes.
//
//   metrics.rs          — Epoch-level loss/accuracy appended
//                         to a CSV file.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Limited vocabulary saving and loading
pub mod vocabulary_store;

/// Training metrics CSV logger
pub mod metrics;
