use burn::{
    config::Config,
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::sigmoid, backend::Backend, Tensor},
};

/// Configuration for a bidirectional LSTM
#[derive(Config)]
pub struct BiLstmConfig {
    /// Size of each input step
    pub d_input: usize,

    /// Size of the hidden state of a single direction
    pub d_hidden: usize,

    /// Use `hard_sigmoid` for the gates instead of the logistic sigmoid
    #[config(default = true)]
    pub hard_sigmoid_gates: bool,
}

impl BiLstmConfig {
    /// Initialize a new bidirectional LSTM
    pub fn init<B: Backend>(&self, device: &B::Device) -> BiLstm<B> {
        BiLstm {
            forward_lstm: self.init_direction(device),
            backward_lstm: self.init_direction(device),
            d_hidden: self.d_hidden,
        }
    }

    fn init_direction<B: Backend>(&self, device: &B::Device) -> Lstm<B> {
        Lstm {
            input: LinearConfig::new(self.d_input, 4 * self.d_hidden).init(device),
            recurrent: LinearConfig::new(self.d_hidden, 4 * self.d_hidden)
                .with_bias(false)
                .init(device),
            d_hidden: self.d_hidden,
            hard_sigmoid_gates: self.hard_sigmoid_gates,
        }
    }
}

/// A single LSTM direction.
///
/// Gates are packed along the output features of both projections in the order
/// input, forget, cell, output, so kernels exported from Keras can be loaded without reordering.
#[derive(Module, Debug)]
pub struct Lstm<B: Backend> {
    /// Projection of the input step onto the four gates
    pub input: Linear<B>,

    /// Projection of the previous hidden state onto the four gates
    pub recurrent: Linear<B>,

    /// Size of the hidden state
    pub d_hidden: usize,

    /// Gate activation switch
    pub hard_sigmoid_gates: bool,
}

impl<B: Backend> Lstm<B> {
    /// Run over `[batch_size, seq_length, d_input]`, returning every hidden state as
    /// `[batch_size, seq_length, d_hidden]`.
    ///
    /// When `reverse` is set the steps are consumed from last to first, but the output is still
    /// indexed by the original time step.
    pub fn forward(&self, input: Tensor<B, 3>, reverse: bool) -> Tensor<B, 3> {
        let [batch_size, seq_length, d_input] = input.dims();
        let device = input.device();

        let mut hidden = Tensor::zeros([batch_size, self.d_hidden], &device);
        let mut cell = Tensor::zeros([batch_size, self.d_hidden], &device);

        let steps: Vec<usize> = if reverse {
            (0..seq_length).rev().collect()
        } else {
            (0..seq_length).collect()
        };

        let mut outputs = Vec::with_capacity(seq_length);

        for t in steps {
            let x_t = input
                .clone()
                .slice([0..batch_size, t..t + 1, 0..d_input])
                .reshape([batch_size, d_input]);

            (hidden, cell) = self.step(x_t, hidden, cell);

            outputs.push(hidden.clone().reshape([batch_size, 1, self.d_hidden]));
        }

        if reverse {
            outputs.reverse();
        }

        Tensor::cat(outputs, 1)
    }

    fn step(
        &self,
        x_t: Tensor<B, 2>,
        hidden: Tensor<B, 2>,
        cell: Tensor<B, 2>,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let [batch_size, _] = x_t.dims();
        let d = self.d_hidden;

        let gates = self.input.forward(x_t) + self.recurrent.forward(hidden);

        let input_gate = self.gate(gates.clone().slice([0..batch_size, 0..d]));
        let forget_gate = self.gate(gates.clone().slice([0..batch_size, d..2 * d]));
        let candidate = gates.clone().slice([0..batch_size, 2 * d..3 * d]).tanh();
        let output_gate = self.gate(gates.slice([0..batch_size, 3 * d..4 * d]));

        let cell = forget_gate * cell + input_gate * candidate;
        let hidden = output_gate * cell.clone().tanh();

        (hidden, cell)
    }

    fn gate(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        if self.hard_sigmoid_gates {
            // clip(0.2 * x + 0.5, 0, 1)
            x.mul_scalar(0.2).add_scalar(0.5).clamp(0.0, 1.0)
        } else {
            sigmoid(x)
        }
    }
}

/// Bidirectional LSTM returning the full sequence of concatenated `[forward, backward]` states
#[derive(Module, Debug)]
pub struct BiLstm<B: Backend> {
    /// Left-to-right direction
    pub forward_lstm: Lstm<B>,

    /// Right-to-left direction
    pub backward_lstm: Lstm<B>,

    /// Size of the hidden state of a single direction
    pub d_hidden: usize,
}

impl<B: Backend> BiLstm<B> {
    /// `[batch_size, seq_length, d_input]` -> `[batch_size, seq_length, 2 * d_hidden]`
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let forward = self.forward_lstm.forward(input.clone(), false);
        let backward = self.backward_lstm.forward(input, true);

        Tensor::cat(vec![forward, backward], 2)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use burn::tensor::Distribution;
    use pretty_assertions::assert_eq;

    use super::*;

    type B = NdArray;

    #[test]
    fn bilstm_keeps_every_time_step() {
        let device = NdArrayDevice::Cpu;
        let lstm = BiLstmConfig::new(6, 4).init::<B>(&device);

        let input = Tensor::<B, 3>::random([2, 5, 6], Distribution::Default, &device);
        let output = lstm.forward(input);

        assert_eq!(output.dims(), [2, 5, 8]);
    }

    #[test]
    fn hard_sigmoid_gates_stay_in_the_unit_interval() {
        let device = NdArrayDevice::Cpu;
        let lstm = BiLstmConfig::new(2, 3).init::<B>(&device);

        let x = Tensor::<B, 2>::from_floats([[-10.0, -2.5, 0.0, 2.5, 10.0]], &device);
        let gated = lstm.forward_lstm.gate(x).into_data().convert::<f32>().value;

        assert_eq!(gated, vec![0.0, 0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn backward_direction_is_aligned_to_forward_time() {
        let device = NdArrayDevice::Cpu;
        let lstm = BiLstmConfig::new(3, 2).init::<B>(&device);

        let input = Tensor::<B, 3>::random([1, 4, 3], Distribution::Default, &device);

        // The last step of a backward pass has only seen the last input, which is the same as
        // running the same direction forwards over that single step.
        let full = lstm.backward_lstm.forward(input.clone(), true);
        let last_only = lstm
            .backward_lstm
            .forward(input.slice([0..1, 3..4, 0..3]), false);

        let full_last = full.slice([0..1, 3..4, 0..2]).into_data().convert::<f32>().value;
        let last_only = last_only.into_data().convert::<f32>().value;

        for (a, b) in full_last.iter().zip(last_only.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} != {b}");
        }
    }
}
