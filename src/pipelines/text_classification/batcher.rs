use burn::{
    data::dataloader,
    tensor::{backend::Backend, Int, Tensor},
};
use derive_new::new;

use crate::{models::flair, utils::tensors::pad_to};

use super::Vocabulary;

/// An inference batch for flair classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Normalized token ids as 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,
}

/// Struct for batching titles into fixed-length token tensors
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Vocabulary for converting text to token IDs
    pub vocabulary: Vocabulary,

    /// Every sequence is padded or truncated to this length
    pub max_seq_length: usize,

    /// ID of the padding token
    pub pad_token_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher
    pub fn new(vocabulary: Vocabulary, config: &flair::Config, device: B::Device) -> Self {
        Self {
            vocabulary,
            max_seq_length: config.max_seq_len,
            pad_token_id: config.pad_token_id,
            device,
        }
    }

    /// Tokenize every title, without normalizing the lengths
    pub fn tokenize(&self, items: &[String]) -> Vec<Vec<usize>> {
        items
            .iter()
            .map(|input| self.vocabulary.tokenize(input))
            .collect()
    }
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<String, Infer<B>> for Batcher<B> {
    /// Collects a vector of titles into a inference batch
    fn batch(&self, items: Vec<String>) -> Infer<B> {
        let token_ids_list = self.tokenize(&items);

        Infer {
            tokens: pad_to(
                self.pad_token_id,
                token_ids_list,
                self.max_seq_length,
                &self.device,
            ),
        }
    }
}
