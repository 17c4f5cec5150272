// ============================================================
// Layer 5 — Bidirectional RRA-LSTM Encoder
// ============================================================
// Two independent scans over the same input sequence:
//
//   forward   i = 0 .. seq_len-1      (context of earlier words)
//   backward  i = seq_len-1 .. 0      (context of later words)
//
// Each scan starts from zero hidden/cell state, owns its own
// RraLstmCell and its own ResidualWindow, and softmax-normalises
// its [K,1] attention weights once before the first step.
//
// Output: per position i, concat(forward[i], backward[i]) — the
// encoded sequence is [seq_len, 2H].
//
// The scans run for exactly `seq_len` steps; that length is a
// runtime argument, not the row count of some padded buffer.

use burn::{module::Param, nn::Initializer, prelude::*};

use crate::domain::error::SummarizerError;
use crate::ml::cell::{BiasWiring, CellState, RraLstmCell, RraLstmCellConfig};
use crate::ml::residual::{normalize_weights, ResidualWindow};

#[derive(Config, Debug)]
pub struct BidirectionalEncoderConfig {
    pub word_dim:       usize,
    pub hidden_size:    usize,
    /// K, number of past hidden states mixed into the RRA term
    pub residual_depth: usize,
    #[config(default = 0.01)]
    pub init_std:       f64,
}

impl BidirectionalEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> BidirectionalEncoder<B> {
        BidirectionalEncoder {
            forward_scan:  self.init_scan(device),
            backward_scan: self.init_scan(device),
        }
    }

    fn init_scan<B: Backend>(&self, device: &B::Device) -> RecurrentScan<B> {
        RecurrentScan {
            cell: RraLstmCellConfig::new(self.word_dim, self.hidden_size)
                .with_init_std(self.init_std)
                .init(device),
            residual_weights: Initializer::Zeros.init([self.residual_depth, 1], device),
            residual_depth:   self.residual_depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One direction of the encoder: a cell plus its residual attention weights.
#[derive(Module, Debug)]
pub struct RecurrentScan<B: Backend> {
    cell:             RraLstmCell<B>,
    /// Raw [K, 1] weights, softmax-normalised per scan
    residual_weights: Param<Tensor<B, 2>>,
    residual_depth:   usize,
}

impl<B: Backend> RecurrentScan<B> {
    /// Hidden states in ORIGINAL position order, one [1, H] row each.
    pub fn run(&self, input: &Tensor<B, 2>, seq_len: usize, direction: Direction) -> Vec<Tensor<B, 2>> {
        let device      = input.device();
        let [_, width]  = input.dims();
        let hidden_size = self.cell.hidden_size();

        let weights    = normalize_weights(self.residual_weights.val());
        let mut window = ResidualWindow::new(self.residual_depth, hidden_size, seq_len, &device);
        let mut state  = CellState::zeros(hidden_size, &device);
        let mut states = Vec::with_capacity(seq_len);

        for step in 0..seq_len {
            let i = match direction {
                Direction::Forward  => step,
                Direction::Backward => seq_len - 1 - step,
            };
            let x   = input.clone().slice([i..i + 1, 0..width]);
            let rra = window.term(&weights);

            state = self.cell.step(x, &state, rra, BiasWiring::PerGate);
            window.advance(state.hidden.clone());
            states.push(state.hidden.clone());
        }

        if direction == Direction::Backward {
            states.reverse();
        }
        states
    }
}

#[derive(Module, Debug)]
pub struct BidirectionalEncoder<B: Backend> {
    forward_scan:  RecurrentScan<B>,
    backward_scan: RecurrentScan<B>,
}

/// Output of the encoder.
#[derive(Debug, Clone)]
pub struct Encoding<B: Backend> {
    /// [seq_len, 2H]: forward state then backward state, both indexed
    /// by original position
    pub states: Tensor<B, 2>,
}

impl<B: Backend> Encoding<B> {
    pub fn seq_len(&self) -> usize {
        self.states.dims()[0]
    }
}

impl<B: Backend> BidirectionalEncoder<B> {
    /// Encode the first `seq_len` rows of `input` ([rows, word_dim]).
    pub fn encode(&self, input: &Tensor<B, 2>, seq_len: usize) -> Result<Encoding<B>, SummarizerError> {
        let [rows, _] = input.dims();
        if seq_len == 0 {
            return Err(SummarizerError::EmptySequence { what: "encoder input" });
        }
        if seq_len > rows {
            return Err(SummarizerError::DimensionMismatch { expected: seq_len, found: rows });
        }

        let forward  = Tensor::cat(self.forward_scan.run(input, seq_len, Direction::Forward), 0);
        let backward = Tensor::cat(self.backward_scan.run(input, seq_len, Direction::Backward), 0);
        let states   = Tensor::cat(vec![forward, backward], 1);

        tracing::trace!("Encoded {} positions into {:?}", seq_len, states.dims());
        Ok(Encoding { states })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_util::{device, values, TestBackend};
    use burn::tensor::TensorData;

    fn input(rows: usize, width: usize) -> Tensor<TestBackend, 2> {
        let data: Vec<f32> = (0..rows * width).map(|i| (i as f32 * 0.37).sin()).collect();
        Tensor::from_data(TensorData::new(data, [rows, width]), &device())
    }

    fn encoder(hidden: usize) -> BidirectionalEncoder<TestBackend> {
        BidirectionalEncoderConfig::new(3, hidden, 2).init(&device())
    }

    #[test]
    fn test_both_scans_cover_every_position() {
        let enc = encoder(4).encode(&input(5, 3), 5).unwrap();
        assert_eq!(enc.states.dims(), [5, 8]);
        assert_eq!(enc.seq_len(), 5);
    }

    #[test]
    fn test_runtime_length_limits_the_scan() {
        // Padded buffer of 7 rows, only 4 are real
        let enc = encoder(2).encode(&input(7, 3), 4).unwrap();
        assert_eq!(enc.states.dims(), [4, 4]);
    }

    #[test]
    fn test_concatenation_order() {
        let e        = encoder(2);
        let x        = input(3, 3);
        let enc      = e.encode(&x, 3).unwrap();
        let states   = values(enc.states);
        let forward  = values(e.forward_scan.run(&x, 3, Direction::Forward)[1].clone());
        let backward = values(e.backward_scan.run(&x, 3, Direction::Backward)[1].clone());
        // Row 1: forward[1] then backward[1]
        assert_eq!(&states[4..6], forward.as_slice());
        assert_eq!(&states[6..8], backward.as_slice());
    }

    #[test]
    fn test_backward_last_position_sees_only_itself() {
        // The backward scan starts at the last word, so its state there
        // equals a one-step scan over that word alone
        let e     = encoder(3);
        let full  = e.encode(&input(4, 3), 4).unwrap();
        let last  = input(4, 3).slice([3..4, 0..3]);
        let alone = e.backward_scan.run(&last, 1, Direction::Backward);

        let a = values(full.states.slice([3..4, 3..6]));
        let b = values(alone[0].clone());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            encoder(2).encode(&input(3, 3), 0),
            Err(SummarizerError::EmptySequence { .. })
        ));
    }
}
