// ============================================================
// Layer 5 — Local Attention
// ============================================================
// Attention restricted to a window of 2D+1 encoder states around
// a centre position predicted from the decoder hidden state.
//
//   m   = σ( tanh(h·Wp) · Vp )                    scalar in (0,1)
//   pt  = D + ⌊(seq_len - 1 - 2D) · m⌋             in [D, seq_len-1-D]
//   a_k = softmax_k( hs_k · Wa · hᵀ )              k = pt-D .. pt+D
//   g_k = exp( -(k-pt)² / (2σ²) ),  σ = D/2
//   w_k = a_k · g_k                                (not renormalised)
//
//   context = Σ_k w_k · hs_k
//
// pt is an integer read back from the device, so Wp and Vp sit
// outside the gradient path: the loss never updates them.
//
// Reference: Luong et al. (2015), §3.2 "local-p" attention

use burn::{
    module::Param,
    nn::Initializer,
    prelude::*,
    tensor::{activation, TensorData},
};

#[derive(Config, Debug)]
pub struct LocalAttentionConfig {
    /// Width of an encoder state and of the decoder hidden state (2H)
    pub state_size:    usize,
    /// D, half-width of the window
    pub window_radius: usize,
    #[config(default = 50)]
    pub alignment_dim: usize,
    #[config(default = 0.01)]
    pub init_std:      f64,
}

impl LocalAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LocalAttention<B> {
        let normal = Initializer::Normal { mean: 0.0, std: self.init_std };
        LocalAttention {
            w_p: normal.init([self.state_size, self.alignment_dim], device),
            v_p: normal.init([self.alignment_dim, 1], device),
            w_a: normal.init([self.state_size, self.state_size], device),
            window_radius: self.window_radius,
        }
    }
}

#[derive(Module, Debug)]
pub struct LocalAttention<B: Backend> {
    w_p: Param<Tensor<B, 2>>,
    v_p: Param<Tensor<B, 2>>,
    w_a: Param<Tensor<B, 2>>,
    window_radius: usize,
}

/// Result of one alignment step.
#[derive(Debug, Clone)]
pub struct Alignment<B: Backend> {
    /// [2D+1, 1] final weights (content score × decay)
    pub weights: Tensor<B, 2>,
    /// pt, index of the window centre in the encoded sequence
    pub center:  usize,
    /// [2D+1, 2H] encoder states inside the window
    pub local:   Tensor<B, 2>,
}

impl<B: Backend> Alignment<B> {
    /// [1, 2H] weighted sum of the windowed encoder states
    pub fn context(&self) -> Tensor<B, 2> {
        self.weights.clone().transpose().matmul(self.local.clone())
    }
}

/// Window centre for a given multiplier in (0,1).
///
/// Out-of-range or NaN multipliers are clamped so the result
/// always lies in `[radius, seq_len-1-radius]`.
pub fn center_position(seq_len: usize, radius: usize, multiplier: f64) -> usize {
    let positions = seq_len.saturating_sub(1 + 2 * radius);
    let offset    = (positions as f64 * multiplier).floor() as usize;
    radius + offset.min(positions)
}

/// Gaussian locality prior over offsets `-radius..=radius`.
pub fn gaussian_decay(radius: usize) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f64 / 2.0;
    let r     = radius as i64;
    (-r..=r)
        .map(|k| (-((k * k) as f64) / (2.0 * sigma * sigma)).exp() as f32)
        .collect()
}

impl<B: Backend> LocalAttention<B> {
    /// Number of encoder states inside the window (2D+1)
    pub fn window_size(&self) -> usize {
        2 * self.window_radius + 1
    }

    /// Sigmoid multiplier m for the given decoder hidden state ([1, 2H]).
    pub fn multiplier(&self, hidden: &Tensor<B, 2>) -> f64 {
        let projected = activation::tanh(hidden.clone().matmul(self.w_p.val())).matmul(self.v_p.val());
        activation::sigmoid(projected).into_scalar().elem::<f64>()
    }

    /// Align the decoder hidden state against the encoded sequence.
    ///
    /// encoded: [seq_len, 2H], hidden: [1, 2H]. The caller guarantees
    /// `seq_len >= 2D+1`.
    pub fn align(&self, encoded: &Tensor<B, 2>, hidden: &Tensor<B, 2>, seq_len: usize) -> Alignment<B> {
        let device     = encoded.device();
        let [_, width] = encoded.dims();
        let radius     = self.window_radius;

        // ── Centre (integer, outside the gradient path) ──────────────────────
        let center = center_position(seq_len, radius, self.multiplier(hidden));
        let local  = encoded.clone().slice([center - radius..center + radius + 1, 0..width]);

        // ── Content scores: hs·Wa·hᵀ, softmax over the window ────────────────
        let scores  = local.clone().matmul(self.w_a.val()).matmul(hidden.clone().transpose());
        let content = activation::softmax(scores, 0);

        // ── Locality prior ───────────────────────────────────────────────────
        let decay   = gaussian_decay(radius);
        let decay   = Tensor::<B, 2>::from_data(TensorData::new(decay, [self.window_size(), 1]), &device);
        let weights = content * decay;

        tracing::trace!("Local attention centred at {} of {}", center, seq_len);
        Alignment { weights, center, local }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_util::{device, values, TestBackend};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_center_always_inside_legal_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let radius  = rng.gen_range(0..12);
            let seq_len = 2 * radius + 1 + rng.gen_range(0..60);
            let m: f64  = rng.gen_range(f64::EPSILON..1.0);

            let center = center_position(seq_len, radius, m);
            assert!(center >= radius, "center {center} below {radius}");
            assert!(center <= seq_len - 1 - radius, "center {center} past {seq_len}-1-{radius}");
        }
    }

    #[test]
    fn test_center_boundaries() {
        assert_eq!(center_position(30, 10, 0.0), 10);
        assert_eq!(center_position(30, 10, 1e-9), 10);
        assert_eq!(center_position(30, 10, 1.0), 30 - 1 - 10);
        // Exactly fitting sequence has one legal centre
        assert_eq!(center_position(21, 10, 0.73), 10);
    }

    #[test]
    fn test_center_nan_multiplier_clamped() {
        assert_eq!(center_position(30, 3, f64::NAN), 3);
        assert_eq!(center_position(30, 3, 7.5), 30 - 1 - 3);
    }

    #[test]
    fn test_decay_peak_and_symmetry() {
        for radius in [1usize, 2, 5, 10] {
            let decay = gaussian_decay(radius);
            assert_eq!(decay.len(), 2 * radius + 1);
            assert_eq!(decay[radius], 1.0);
            for k in 0..radius {
                assert_eq!(decay[k], decay[2 * radius - k]);
                assert!(decay[k] < decay[k + 1]);
            }
        }
        assert_eq!(gaussian_decay(0), vec![1.0]);
    }

    #[test]
    fn test_decay_at_sigma() {
        // D = 4 → σ = 2, so offset 2 gives exp(-1/2)
        let decay = gaussian_decay(4);
        assert!((decay[6] - (-0.5f32).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_window_weights_shape_and_bounds() {
        let attention: LocalAttention<TestBackend> = LocalAttentionConfig::new(4, 2).init(&device());
        let encoded = Tensor::<TestBackend, 2>::random(
            [9, 4], burn::tensor::Distribution::Uniform(-1.0, 1.0), &device(),
        );
        let hidden = Tensor::<TestBackend, 2>::ones([1, 4], &device());

        let alignment = attention.align(&encoded, &hidden, 9);
        assert_eq!(alignment.weights.dims(), [5, 1]);
        assert_eq!(alignment.local.dims(), [5, 4]);
        assert_eq!(alignment.context().dims(), [1, 4]);
        assert!((2..=6).contains(&alignment.center));

        let w = values(alignment.weights);
        assert!(w.iter().all(|x| *x >= 0.0 && *x <= 1.0));
        // Product with the decay is not renormalised
        assert!(w.iter().sum::<f32>() <= 1.0 + 1e-6);
    }

    #[test]
    fn test_weights_and_context_match_host_computation() {
        let (seq_len, width, radius) = (9, 4, 2);
        let attention: LocalAttention<TestBackend> =
            LocalAttentionConfig::new(width, radius).with_init_std(0.5).init(&device());

        let enc: Vec<f32> = (0..seq_len * width).map(|i| (i as f32 * 0.43).sin()).collect();
        let h:   Vec<f32> = vec![0.7, -0.2, 0.4, 1.1];
        let encoded = Tensor::<TestBackend, 2>::from_data(TensorData::new(enc.clone(), [seq_len, width]), &device());
        let hidden  = Tensor::<TestBackend, 2>::from_data(TensorData::new(h.clone(), [1, width]), &device());

        let alignment = attention.align(&encoded, &hidden, seq_len);
        let start     = alignment.center - radius;
        let local     = &enc[start * width..(start + 2 * radius + 1) * width];
        assert_eq!(values(alignment.local.clone()), local.to_vec());

        // scores_k = hs_k · Wa · hᵀ
        let w_a = values(attention.w_a.val());
        let scores: Vec<f32> = local
            .chunks(width)
            .map(|hs| {
                (0..width)
                    .map(|i| (0..width).map(|j| hs[i] * w_a[i * width + j] * h[j]).sum::<f32>())
                    .sum()
            })
            .collect();
        let max   = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
        let total = exp.iter().sum::<f32>();
        let decay = gaussian_decay(radius);
        let expected: Vec<f32> = exp.iter().zip(&decay).map(|(e, g)| e / total * g).collect();

        let weights = values(alignment.weights.clone());
        for (got, want) in weights.iter().zip(&expected) {
            assert!((got - want).abs() < 1e-5, "weight {got} vs {want}");
        }

        // context = Σ_k w_k · hs_k
        let context = values(alignment.context());
        for c in 0..width {
            let want: f32 = local.chunks(width).zip(&expected).map(|(hs, w)| w * hs[c]).sum();
            assert!((context[c] - want).abs() < 1e-5, "context[{c}] {} vs {want}", context[c]);
        }
    }
}
