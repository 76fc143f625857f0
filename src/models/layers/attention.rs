use burn::{
    config::Config,
    module::{Module, Param},
    tensor::{backend::Backend, Distribution, Tensor},
};

/// Configuration for additive attention pooling over a fixed number of steps
#[derive(Config)]
pub struct AttentionConfig {
    /// Number of time steps in every input sequence
    pub step_dim: usize,

    /// Width of the hidden state at each step
    pub features_dim: usize,

    /// Added to the normalizing sum so equal energies can never divide by zero
    #[config(default = 1e-7)]
    pub epsilon: f64,
}

impl AttentionConfig {
    /// Initialize the layer with Glorot-uniform weights and a zero bias
    pub fn init<B: Backend>(&self, device: &B::Device) -> Attention<B> {
        // Glorot limit for a vector, where fan in and fan out are both its length
        let limit = (3.0 / self.features_dim as f64).sqrt();

        let weight = Tensor::random(
            [self.features_dim],
            Distribution::Uniform(-limit, limit),
            device,
        );
        let bias = Tensor::zeros([self.step_dim], device);

        Attention {
            weight: Param::from_tensor(weight),
            bias: Param::from_tensor(bias),
            step_dim: self.step_dim,
            features_dim: self.features_dim,
            epsilon: self.epsilon,
        }
    }
}

/// Collapses `[batch_size, step_dim, features_dim]` hidden states into one
/// `[batch_size, features_dim]` vector.
///
/// For each step `t`: `e_t = tanh(h_t · W + b_t)`, `a_t = exp(e_t) / (Σ exp(e) + ε)`, and the
/// output is `Σ a_t * h_t`.
#[derive(Module, Debug)]
pub struct Attention<B: Backend> {
    /// Scoring vector, dotted with each hidden state
    pub weight: Param<Tensor<B, 1>>,

    /// Position-specific bias, one per step
    pub bias: Param<Tensor<B, 1>>,

    /// Number of time steps
    pub step_dim: usize,

    /// Width of the hidden state
    pub features_dim: usize,

    /// Normalization epsilon
    pub epsilon: f64,
}

impl<B: Backend> Attention<B> {
    /// The normalized per-step weights, `[batch_size, step_dim]`
    pub fn weights(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, step_dim, features_dim] = input.dims();

        let energies = (input * self.weight.val().reshape([1, 1, features_dim]))
            .sum_dim(2)
            .reshape([batch_size, step_dim]);

        let energies = (energies + self.bias.val().reshape([1, step_dim])).tanh();

        let scores = energies.exp();
        let total = scores.clone().sum_dim(1).add_scalar(self.epsilon);

        scores / total
    }

    /// Attention-weighted sum of the hidden states
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, step_dim, features_dim] = input.dims();

        let weights = self
            .weights(input.clone())
            .reshape([batch_size, step_dim, 1]);

        (input * weights)
            .sum_dim(1)
            .reshape([batch_size, features_dim])
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use pretty_assertions::assert_eq;

    use super::*;

    type B = NdArray;

    #[test]
    fn weights_sum_to_one() {
        let device = NdArrayDevice::Cpu;
        let attention = AttentionConfig::new(50, 16).init::<B>(&device);

        let input = Tensor::<B, 3>::random([3, 50, 16], Distribution::Default, &device);
        let weights = attention.weights(input);

        assert_eq!(weights.dims(), [3, 50]);

        let sums = weights.sum_dim(1).into_data().convert::<f32>().value;

        for sum in sums {
            assert!((sum - 1.0).abs() < 1e-5, "weights sum to {sum}");
        }
    }

    #[test]
    fn equal_energies_give_uniform_weights() {
        let device = NdArrayDevice::Cpu;
        let attention = AttentionConfig::new(4, 3).init::<B>(&device);

        let weights = attention
            .weights(Tensor::zeros([1, 4, 3], &device))
            .into_data()
            .convert::<f32>()
            .value;

        for weight in weights {
            assert!((weight - 0.25).abs() < 1e-6, "weight {weight}");
        }
    }

    #[test]
    fn identical_steps_pool_to_the_same_vector() {
        let device = NdArrayDevice::Cpu;
        let attention = AttentionConfig::new(5, 2).init::<B>(&device);

        let step = Tensor::<B, 3>::from_floats([[[0.5, -1.5]]], &device);
        let input = Tensor::cat(vec![step; 5], 1);

        let pooled = attention.forward(input).into_data().convert::<f32>().value;

        assert!((pooled[0] - 0.5).abs() < 1e-5);
        assert!((pooled[1] + 1.5).abs() < 1e-5);
    }
}
