use std::path::PathBuf;

/// Classifier Error
#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    /// A startup artifact is missing or unreadable
    #[error("unable to load {path}: {reason}")]
    Artifact {
        /// The artifact that failed to load
        path: PathBuf,

        /// Why it failed
        reason: String,
    },

    /// The artifacts load but disagree with each other
    #[error("invalid model configuration: {0}")]
    Config(String),

    /// Titles and identifiers were not paired one to one
    #[error("got {titles} titles for {ids} identifiers")]
    ShapeMismatch {
        /// Number of titles
        titles: usize,

        /// Number of identifiers
        ids: usize,
    },

    /// A previous inference panicked while holding the model
    #[error("the shared model is poisoned")]
    Poisoned,

    /// The model produced output that can't be mapped back to a flair
    #[error("inference failed: {0}")]
    Inference(String),
}

impl ClassifierError {
    /// Helper for artifact load failures
    pub fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Artifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
