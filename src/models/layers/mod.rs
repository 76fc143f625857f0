/// Additive attention pooling
pub mod attention;

/// Bidirectional LSTM
pub mod lstm;

pub use attention::{Attention, AttentionConfig};
pub use lstm::{BiLstm, BiLstmConfig, Lstm};
