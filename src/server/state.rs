use std::sync::Arc;

use burn::backend::NdArray;

use crate::{
    pipelines::text_classification::{Classifier, Predictions},
    reddit::TitleResolver,
};

use super::{error::ServerError, templates::Templates};

/// The backend used for serving
pub type InferBackend = NdArray;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The process-wide classifier, loaded once at startup
    pub classifier: Arc<Classifier<InferBackend>>,

    /// Turns post URLs into titles
    pub resolver: Arc<dyn TitleResolver>,

    /// Parsed HTML pages
    pub templates: Arc<Templates>,

    /// How many URLs of an uploaded batch are resolved at once
    pub resolve_concurrency: usize,
}

impl AppState {
    /// Create new server state
    pub fn new(
        classifier: Arc<Classifier<InferBackend>>,
        resolver: Arc<dyn TitleResolver>,
        resolve_concurrency: usize,
    ) -> Result<Self, ServerError> {
        Ok(Self {
            classifier,
            resolver,
            templates: Arc::new(Templates::new()?),
            resolve_concurrency: resolve_concurrency.max(1),
        })
    }

    /// Run a prediction on the blocking pool so the numeric work doesn't stall the runtime
    pub async fn classify(
        &self,
        titles: Vec<String>,
        ids: Vec<String>,
    ) -> Result<Predictions, ServerError> {
        let classifier = self.classifier.clone();

        let predictions = tokio::task::spawn_blocking(move || classifier.predict(&titles, &ids))
            .await
            .map_err(|e| ServerError::Internal(format!("inference task failed: {}", e)))??;

        Ok(predictions)
    }
}
