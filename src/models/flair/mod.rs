/// Attention-weighted BiLSTM for flair classification
pub mod model;

/// The model configuration
pub mod config;

pub use config::Config;
pub use model::{Model, ModelRecord};
