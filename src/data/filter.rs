// ============================================================
// Layer 4 — Length Filter
// ============================================================
// Drops examples the model cannot (or should not) train on.
//
// Three thresholds:
//   - summaries longer than max_summary_len words (not counting
//     the end marker) are dropped; a few very long summaries
//     would otherwise dominate decoding time
//   - texts shorter than the local attention window 2D+1 are
//     dropped; the window must fit inside the encoded sequence
//   - texts longer than max_text_len are dropped; every word is
//     one encoder timestep
//
// An empty summary (only the end marker) is also dropped: it
// leaves the decoder nothing to predict.

use crate::domain::example::SummaryExample;

#[derive(Debug, Clone, Copy)]
pub struct LengthFilter {
    pub max_summary_len: usize,
    pub max_text_len:    usize,
    /// Half-width D of the local attention window
    pub window_radius:   usize,
}

impl LengthFilter {
    pub fn new(max_summary_len: usize, max_text_len: usize, window_radius: usize) -> Self {
        Self { max_summary_len, max_text_len, window_radius }
    }

    /// Number of encoder states the attention window covers
    pub fn window_size(&self) -> usize {
        2 * self.window_radius + 1
    }

    pub fn accepts(&self, example: &SummaryExample) -> bool {
        let summary_len = example.output_len();
        let text_len    = example.seq_len();

        summary_len >= 1
            && summary_len <= self.max_summary_len
            && text_len >= self.window_size()
            && text_len <= self.max_text_len
    }

    /// Keep the accepted examples, preserving their order.
    pub fn apply(&self, examples: Vec<SummaryExample>) -> Vec<SummaryExample> {
        let before = examples.len();
        let kept: Vec<_> = examples.into_iter().filter(|e| self.accepts(e)).collect();

        tracing::info!(
            "Length filter kept {} of {} examples (summary ≤ {}, {} ≤ text ≤ {})",
            kept.len(),
            before,
            self.max_summary_len,
            self.window_size(),
            self.max_text_len,
        );
        kept
    }
}
