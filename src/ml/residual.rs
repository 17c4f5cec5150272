// ============================================================
// Layer 5 — Residual Attention Window
// ============================================================
// History buffer for the RRA term of one recurrent scan.
//
// Before the scan starts the buffer holds K zero vectors. At
// step j (j starts at K) the RRA term is
//
//   rra_j = Σ_{k=0}^{K-1} softmax(w)_k · history[j-K+k]
//
// i.e. a learned convex mixture of the last K hidden states,
// computed as one [1,K]·[K,H] product. After the step the new
// hidden state is written at slot j, except at the very last
// step of the scan, whose slot is past the declared capacity
// (steps + K - 1) and is never read anyway.
//
// Each scan (forward encoder, backward encoder, decoder) owns
// its own window and its own learned weights.

use burn::{prelude::*, tensor::activation};

/// Normalise a raw `[K, 1]` attention weight column so it sums to 1.
pub fn normalize_weights<B: Backend>(raw: Tensor<B, 2>) -> Tensor<B, 2> {
    if raw.dims()[0] == 0 {
        return raw;
    }
    activation::softmax(raw, 0)
}

#[derive(Debug, Clone)]
pub struct ResidualWindow<B: Backend> {
    history:   Vec<Tensor<B, 2>>,
    depth:     usize,
    width:     usize,
    cursor:    usize,
    last_slot: usize,
    device:    B::Device,
}

impl<B: Backend> ResidualWindow<B> {
    /// A window of `depth` zero states for a scan of `steps` timesteps.
    pub fn new(depth: usize, width: usize, steps: usize, device: &B::Device) -> Self {
        let history = (0..depth).map(|_| Tensor::zeros([1, width], device)).collect();
        Self {
            history,
            depth,
            width,
            cursor: depth,
            last_slot: (steps + depth).saturating_sub(1),
            device: device.clone(),
        }
    }

    /// RRA term for the current step: `[1, width]`.
    /// `weights` must already be normalised (see `normalize_weights`).
    pub fn term(&self, weights: &Tensor<B, 2>) -> Tensor<B, 2> {
        if self.depth == 0 {
            return Tensor::zeros([1, self.width], &self.device);
        }
        let recent = self.history[self.cursor - self.depth..self.cursor].to_vec();
        weights.clone().transpose().matmul(Tensor::cat(recent, 0))
    }

    /// Record the hidden state produced at the current step and move on.
    pub fn advance(&mut self, hidden: Tensor<B, 2>) {
        if self.cursor != self.last_slot {
            debug_assert_eq!(self.history.len(), self.cursor);
            self.history.push(hidden);
        }
        self.cursor += 1;
    }
}
