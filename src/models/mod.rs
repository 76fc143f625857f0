/// Building blocks shared by the models
pub mod layers;

/// Flair classification model
pub mod flair;
