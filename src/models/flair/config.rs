use burn::{
    nn::{BatchNormConfig, DropoutConfig, EmbeddingConfig, LinearConfig},
    tensor::backend::Backend,
};

use crate::models::layers::{AttentionConfig, BiLstmConfig};

use super::Model;

/// The Model Configuration.
///
/// Every default matches the values the published weights were trained with.
#[derive(burn::config::Config)]
pub struct Config {
    /// Fixed length every title is padded or truncated to
    #[config(default = 50)]
    pub max_seq_len: usize,

    /// Largest token id; the embedding table has one extra row for padding
    #[config(default = 33001)]
    pub vocab_size: usize,

    /// Width of each word embedding
    #[config(default = 100)]
    pub embedding_size: usize,

    /// Hidden size of a single LSTM direction
    #[config(default = 512)]
    pub hidden_size: usize,

    /// Width of the dense layer after attention
    #[config(default = 256)]
    pub dense_size: usize,

    /// Number of flair classes
    #[config(default = 14)]
    pub n_classes: usize,

    /// Dropout probability, only active while training
    #[config(default = 0.3)]
    pub dropout: f64,

    /// Attention normalization epsilon
    #[config(default = 1e-7)]
    pub attention_epsilon: f64,

    /// Batch normalization epsilon
    #[config(default = 1e-3)]
    pub norm_epsilon: f64,

    /// Use `hard_sigmoid` for the LSTM gates
    #[config(default = true)]
    pub hard_sigmoid_gates: bool,

    /// The padding token ID
    #[config(default = 0)]
    pub pad_token_id: usize,
}

impl Config {
    /// Width of the concatenated bidirectional hidden state
    pub fn encoded_size(&self) -> usize {
        2 * self.hidden_size
    }

    /// Initializes a model with default weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size + 1, self.embedding_size).init(device);

        let encoder = BiLstmConfig::new(self.embedding_size, self.hidden_size)
            .with_hard_sigmoid_gates(self.hard_sigmoid_gates)
            .init(device);

        let attention = AttentionConfig::new(self.max_seq_len, self.encoded_size())
            .with_epsilon(self.attention_epsilon)
            .init(device);

        let dense = LinearConfig::new(self.encoded_size(), self.dense_size).init(device);

        let norm = BatchNormConfig::new(self.dense_size)
            .with_epsilon(self.norm_epsilon)
            .init(device);

        let output = LinearConfig::new(self.dense_size, self.n_classes).init(device);

        Model {
            embedding,
            encoder,
            attention,
            dense,
            norm,
            output,
            dropout: DropoutConfig::new(self.dropout).init(),
            n_classes: self.n_classes,
        }
    }
}
