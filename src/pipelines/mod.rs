/// Flair classification of post titles
pub mod text_classification;
