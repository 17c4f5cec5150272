// ============================================================
// Layer 5 — Autoregressive Attention Decoder
// ============================================================
// State machine:  INIT → STEP(i = 0..output_len-1) → DONE
//
// INIT
//   hidden = encoded[0]            (width 2H)
//   cell   = 0
//   window = K zeros
//   one cell step on the <SOS> vector, RRA from the seeded window
//
// STEP(i)
//   context  = LocalAttention(encoded, hidden)
//   attended = tanh( [context, hidden] · Wc )     [1, 2H]
//   scores   = attended · Ws                      [1, V]  ← output
//   next     = embedding[argmax(scores)]          (greedy feedback)
//            | embedding[target[i]]              (teacher forcing)
//   cell step on `next`, record hidden in the window
//
// DONE after output_len score rows; the length is supplied by
// the caller, never predicted.
//
// The decoder's residual window spans output_len + 1 steps
// (the INIT step plus one per output), so the hidden state of
// the final, unused step is never written.

use std::{fmt, str::FromStr};

use burn::{module::Param, nn::Initializer, prelude::*, tensor::activation};
use serde::{Deserialize, Serialize};

use crate::data::batcher::VocabularyTables;
use crate::domain::error::SummarizerError;
use crate::ml::attention::{LocalAttention, LocalAttentionConfig};
use crate::ml::cell::{BiasWiring, CellState, RraLstmCell, RraLstmCellConfig};
use crate::ml::encoder::Encoding;
use crate::ml::residual::{normalize_weights, ResidualWindow};

/// Which token vector is fed back as the next decoder input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackMode {
    /// The model's own argmax, also during training
    #[default]
    Greedy,
    /// The ground-truth target of the current step
    TeacherForced,
}

impl fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackMode::Greedy        => write!(f, "greedy"),
            FeedbackMode::TeacherForced => write!(f, "teacher-forced"),
        }
    }
}

impl FromStr for FeedbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "greedy"                          => Ok(FeedbackMode::Greedy),
            "teacher-forced" | "teacher_forced" => Ok(FeedbackMode::TeacherForced),
            other => Err(format!("unknown feedback mode '{other}' (expected greedy or teacher-forced)")),
        }
    }
}

/// Per-call decoding behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub feedback:    FeedbackMode,
    pub bias_wiring: BiasWiring,
}

impl DecodeOptions {
    pub fn new(feedback: FeedbackMode, shared_bias: bool) -> Self {
        let bias_wiring = if shared_bias { BiasWiring::ForgetShared } else { BiasWiring::PerGate };
        Self { feedback, bias_wiring }
    }

    /// Greedy feedback with the decoder bias wiring of the trained model.
    pub fn inference() -> Self {
        Self::new(FeedbackMode::Greedy, true)
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::inference()
    }
}

#[derive(Config, Debug)]
pub struct AttentionDecoderConfig {
    pub word_dim:       usize,
    /// H of the encoder; the decoder state is 2H wide
    pub hidden_size:    usize,
    pub vocab_len:      usize,
    pub window_radius:  usize,
    pub residual_depth: usize,
    #[config(default = 50)]
    pub alignment_dim:  usize,
    #[config(default = 0.01)]
    pub init_std:       f64,
}

impl AttentionDecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AttentionDecoder<B> {
        let state  = 2 * self.hidden_size;
        let normal = Initializer::Normal { mean: 0.0, std: self.init_std };

        AttentionDecoder {
            cell: RraLstmCellConfig::new(self.word_dim, state)
                .with_init_std(self.init_std)
                .init(device),
            residual_weights: Initializer::Zeros.init([self.residual_depth, 1], device),
            attention: LocalAttentionConfig::new(state, self.window_radius)
                .with_alignment_dim(self.alignment_dim)
                .with_init_std(self.init_std)
                .init(device),
            w_c: normal.init([2 * state, state], device),
            w_s: normal.init([state, self.vocab_len], device),
            residual_depth: self.residual_depth,
        }
    }
}

#[derive(Module, Debug)]
pub struct AttentionDecoder<B: Backend> {
    cell:             RraLstmCell<B>,
    residual_weights: Param<Tensor<B, 2>>,
    attention:        LocalAttention<B>,
    w_c:              Param<Tensor<B, 2>>,
    w_s:              Param<Tensor<B, 2>>,
    residual_depth:   usize,
}

impl<B: Backend> AttentionDecoder<B> {
    /// Run the decode loop and return `[output_len, vocab_len]` scores.
    ///
    /// `targets` is only read in teacher-forced mode; without it the
    /// decoder falls back to greedy feedback.
    pub fn decode(
        &self,
        encoding:   &Encoding<B>,
        output_len: usize,
        tables:     &VocabularyTables<B>,
        targets:    Option<&[usize]>,
        options:    DecodeOptions,
    ) -> Result<Tensor<B, 2>, SummarizerError> {
        if output_len == 0 {
            return Err(SummarizerError::EmptySequence { what: "decoder output" });
        }
        let seq_len      = encoding.seq_len();
        let state_size   = self.cell.hidden_size();
        let [vocab_len, word_dim] = tables.embeddings.dims();
        let device       = encoding.states.device();

        let teacher = match (options.feedback, targets) {
            (FeedbackMode::TeacherForced, Some(t)) if t.len() >= output_len => Some(t),
            (FeedbackMode::TeacherForced, _) => {
                tracing::debug!("Teacher forcing without enough targets, feeding back predictions");
                None
            }
            (FeedbackMode::Greedy, _) => None,
        };

        // ── INIT ─────────────────────────────────────────────────────────────
        let weights    = normalize_weights(self.residual_weights.val());
        let mut window = ResidualWindow::new(self.residual_depth, state_size, output_len + 1, &device);
        let mut state  = CellState {
            hidden: encoding.states.clone().slice([0..1, 0..state_size]),
            cell:   Tensor::zeros([1, state_size], &device),
        };

        state = self.cell.step(tables.start.clone(), &state, window.term(&weights), options.bias_wiring);
        window.advance(state.hidden.clone());

        // ── STEP(i) ──────────────────────────────────────────────────────────
        let mut outputs = Vec::with_capacity(output_len);
        for i in 0..output_len {
            let context  = self.attention.align(&encoding.states, &state.hidden, seq_len).context();
            let attended = activation::tanh(
                Tensor::cat(vec![context, state.hidden.clone()], 1).matmul(self.w_c.val()),
            );
            let scores = attended.matmul(self.w_s.val());

            let next = match teacher {
                Some(t) => {
                    let class = t[i];
                    if class >= vocab_len {
                        return Err(SummarizerError::DimensionMismatch { expected: vocab_len, found: class + 1 });
                    }
                    tables.embeddings.clone().slice([class..class + 1, 0..word_dim])
                }
                None => {
                    let class = scores.clone().argmax(1).reshape([1]);
                    tables.embeddings.clone().select(0, class)
                }
            };
            outputs.push(scores);

            state = self.cell.step(next, &state, window.term(&weights), options.bias_wiring);
            window.advance(state.hidden.clone());
        }

        Ok(Tensor::cat(outputs, 0))
    }
}
