use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::pipelines::text_classification::ClassifierError;

/// Message returned for every failure that isn't the caller's fault
pub static GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Server Error
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    /// The request is malformed
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The classifier failed
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// A page failed to render
    #[error("unable to render page: {0}")]
    Template(#[from] liquid::Error),

    /// Anything else, such as a panicked inference task
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Classifier(_) | ServerError::Template(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            log::error!("{}", self);

            GENERIC_FAILURE.to_string()
        } else {
            log::warn!("{}", self);

            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
