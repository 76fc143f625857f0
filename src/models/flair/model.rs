use burn::{
    module::Module,
    nn::{BatchNorm, Dropout, Embedding, Linear},
    tensor::{
        activation::{relu, softmax},
        backend::Backend,
        Int, Tensor,
    },
};

use crate::models::layers::{Attention, BiLstm};

/// Attention-weighted BiLSTM for flair classification
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Word embeddings, one row per vocabulary id plus the padding row
    pub embedding: Embedding<B>,

    /// Bidirectional recurrent encoder
    pub encoder: BiLstm<B>,

    /// Attention pooling over the encoder states
    pub attention: Attention<B>,

    /// Dense layer after pooling
    pub dense: Linear<B>,

    /// Normalization with running statistics
    pub norm: BatchNorm<B, 0>,

    /// Linear layer for flair classification
    pub output: Linear<B>,

    /// Shared dropout, the identity outside of training
    pub dropout: Dropout,

    /// Total number of classes
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Embed and run the recurrent encoder, keeping every step:
    /// `[batch_size, seq_length]` -> `[batch_size, seq_length, 2 * hidden_size]`
    pub fn hidden_states(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let embedded = self.embedding.forward(tokens);
        let states = self.encoder.forward(embedded);

        self.dropout.forward(states)
    }

    /// Encode a normalized token batch into one attended vector per input
    pub fn encode(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        self.attention.forward(self.hidden_states(tokens))
    }

    /// The attention weights the encoder assigns to every step, `[batch_size, seq_length]`
    pub fn attention_weights(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        self.attention.weights(self.hidden_states(tokens))
    }

    /// Map encoded vectors to a probability distribution over the classes
    pub fn classify(&self, encoded: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.dense.forward(encoded));
        let x = self.dropout.forward(x);
        let x = self.norm.forward(x);

        softmax(self.output.forward(x), 1)
    }

    /// Defines forward pass for inference
    pub fn infer(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        self.classify(self.encode(tokens))
    }
}
