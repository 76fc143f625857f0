/// Batcher
pub mod batcher;

/// Classifier errors
pub mod error;

/// Inference
pub mod inference;

/// The flair label table
pub mod labels;

/// Tokenizer vocabulary
pub mod vocab;

pub use batcher::{Batcher, Infer};
pub use error::ClassifierError;
pub use inference::{Classifier, Predictions};
pub use labels::{Flair, FLAIRS};
pub use vocab::Vocabulary;
