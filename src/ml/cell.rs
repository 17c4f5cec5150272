// ============================================================
// Layer 5 — LSTM Cell with Residual Recurrent Attention (RRA)
// ============================================================
// A standard LSTM cell (no peepholes) with one change: the RRA
// term, a learned mixture of the cell's own last K hidden states,
// is added inside the output nonlinearity.
//
//   f  = σ(x·Wf + h·Uf + bf)
//   i  = σ(x·Wi + h·Ui + bi)
//   o  = σ(x·Wo + h·Uo + bo)
//   c̃  = σ(x·Wc + h·Uc + bc)
//   c' = f ⊙ c + i ⊙ c̃
//   h' = o ⊙ tanh(c' + rra)
//
// Note the candidate uses σ, not tanh, as in the model this
// reproduces.
//
// Initialisation: W ~ N(0, init_std), U = I, b = 0.
//
// The forward encoder, backward encoder and decoder each own a
// separate cell; nothing is shared between them.
//
// Reference: Wang et al. (2017) Residual Recurrent Attention
//            Hochreiter & Schmidhuber (1997) LSTM

use burn::{
    module::Param,
    nn::Initializer,
    prelude::*,
    tensor::{activation, TensorData},
};

#[derive(Config, Debug)]
pub struct RraLstmCellConfig {
    pub input_size:  usize,
    pub hidden_size: usize,
    #[config(default = 0.01)]
    pub init_std:    f64,
}

/// Which bias vector feeds the input and output gates.
///
/// The decoder of the reference model passes the forget-gate bias
/// to all three sigmoid gates. `ForgetShared` reproduces that
/// wiring; `PerGate` is the textbook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiasWiring {
    PerGate,
    ForgetShared,
}

impl RraLstmCellConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RraLstmCell<B> {
        let input = Initializer::Normal { mean: 0.0, std: self.init_std };
        let w     = || input.init([self.input_size, self.hidden_size], device);
        let u     = || Param::from_tensor(identity::<B>(self.hidden_size, device));
        let b     = || Initializer::Zeros.init([1, self.hidden_size], device);

        RraLstmCell {
            w_f: w(), u_f: u(), b_f: b(),
            w_i: w(), u_i: u(), b_i: b(),
            w_o: w(), u_o: u(), b_o: b(),
            w_c: w(), u_c: u(), b_c: b(),
            hidden_size: self.hidden_size,
        }
    }
}

fn identity<B: Backend>(size: usize, device: &B::Device) -> Tensor<B, 2> {
    let mut values = vec![0.0f32; size * size];
    for i in 0..size {
        values[i * size + i] = 1.0;
    }
    Tensor::from_data(TensorData::new(values, [size, size]), device)
}

#[derive(Module, Debug)]
pub struct RraLstmCell<B: Backend> {
    w_f: Param<Tensor<B, 2>>,
    u_f: Param<Tensor<B, 2>>,
    pub(crate) b_f: Param<Tensor<B, 2>>,
    w_i: Param<Tensor<B, 2>>,
    u_i: Param<Tensor<B, 2>>,
    pub(crate) b_i: Param<Tensor<B, 2>>,
    w_o: Param<Tensor<B, 2>>,
    u_o: Param<Tensor<B, 2>>,
    pub(crate) b_o: Param<Tensor<B, 2>>,
    w_c: Param<Tensor<B, 2>>,
    u_c: Param<Tensor<B, 2>>,
    b_c: Param<Tensor<B, 2>>,
    hidden_size: usize,
}

/// Hidden and cell state of one recurrent step, both [1, hidden].
#[derive(Debug, Clone)]
pub struct CellState<B: Backend> {
    pub hidden: Tensor<B, 2>,
    pub cell:   Tensor<B, 2>,
}

impl<B: Backend> CellState<B> {
    pub fn zeros(size: usize, device: &B::Device) -> Self {
        Self {
            hidden: Tensor::zeros([1, size], device),
            cell:   Tensor::zeros([1, size], device),
        }
    }
}

impl<B: Backend> RraLstmCell<B> {
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Advance one timestep.
    ///
    /// input: [1, input_size], residual: [1, hidden]
    pub fn step(
        &self,
        input:    Tensor<B, 2>,
        state:    &CellState<B>,
        residual: Tensor<B, 2>,
        wiring:   BiasWiring,
    ) -> CellState<B> {
        let gate = |w: &Param<Tensor<B, 2>>, u: &Param<Tensor<B, 2>>, b: &Param<Tensor<B, 2>>| {
            activation::sigmoid(
                input.clone().matmul(w.val()) + state.hidden.clone().matmul(u.val()) + b.val(),
            )
        };

        let (b_i, b_o) = match wiring {
            BiasWiring::PerGate      => (&self.b_i, &self.b_o),
            BiasWiring::ForgetShared => (&self.b_f, &self.b_f),
        };

        let forget     = gate(&self.w_f, &self.u_f, &self.b_f);
        let input_gate = gate(&self.w_i, &self.u_i, b_i);
        let output     = gate(&self.w_o, &self.u_o, b_o);
        let candidate  = gate(&self.w_c, &self.u_c, &self.b_c);

        let cell   = forget * state.cell.clone() + input_gate * candidate;
        let hidden = output * activation::tanh(cell.clone() + residual);

        CellState { hidden, cell }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_util::{device, values, TestBackend};

    fn cell(input: usize, hidden: usize) -> RraLstmCell<TestBackend> {
        RraLstmCellConfig::new(input, hidden).init(&device())
    }

    fn row(v: &[f32]) -> Tensor<TestBackend, 2> {
        Tensor::from_data(TensorData::new(v.to_vec(), [1, v.len()]), &device())
    }

    #[test]
    fn test_step_shapes() {
        let c     = cell(3, 4);
        let state = CellState::zeros(4, &device());
        let next  = c.step(row(&[0.1, 0.2, 0.3]), &state, row(&[0.0; 4]), BiasWiring::PerGate);
        assert_eq!(next.hidden.dims(), [1, 4]);
        assert_eq!(next.cell.dims(), [1, 4]);
    }

    #[test]
    fn test_saturated_gates_carry_cell_through() {
        let device = device();
        let mut c  = cell(2, 3);
        // forget = 1, input gate = 0
        c.b_f = Param::from_tensor(Tensor::full([1, 3], 60.0, &device));
        c.b_i = Param::from_tensor(Tensor::full([1, 3], -60.0, &device));

        let previous = [0.3, -0.2, 0.9];
        let state = CellState { hidden: row(&[0.0; 3]), cell: row(&previous) };
        let next  = c.step(row(&[0.5, -0.5]), &state, row(&[0.0; 3]), BiasWiring::PerGate);

        for (got, want) in values(next.cell).iter().zip(previous) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn test_residual_enters_output_nonlinearity() {
        let c     = cell(2, 3);
        let state = CellState::zeros(3, &device());
        let x     = row(&[0.4, 0.1]);

        let plain    = c.step(x.clone(), &state, row(&[0.0; 3]), BiasWiring::PerGate);
        let residual = c.step(x, &state, row(&[1.0; 3]), BiasWiring::PerGate);

        // The cell state ignores the residual term; the hidden state does not
        assert_eq!(values(plain.cell.clone()), values(residual.cell));
        let (p, r) = (values(plain.hidden), values(residual.hidden));
        assert!(p.iter().zip(&r).all(|(a, b)| b > a));
    }

    #[test]
    fn test_forget_shared_wiring_changes_gates() {
        let device = device();
        let mut c  = cell(2, 3);
        c.b_f = Param::from_tensor(Tensor::full([1, 3], 2.0, &device));

        let state = CellState { hidden: row(&[0.1, 0.1, 0.1]), cell: row(&[0.5, 0.5, 0.5]) };
        let x     = row(&[0.2, 0.3]);
        let textbook = c.step(x.clone(), &state, row(&[0.0; 3]), BiasWiring::PerGate);
        let shared   = c.step(x, &state, row(&[0.0; 3]), BiasWiring::ForgetShared);

        assert_ne!(values(textbook.hidden), values(shared.hidden));
    }
}
