use std::{sync::Arc, time::Duration};

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use burn::backend::ndarray::NdArrayDevice;
use tower_http::timeout::TimeoutLayer;

use crate::{pipelines::text_classification::Classifier, reddit::RedditClient};

/// Environment configuration
pub mod config;

/// Error responses
pub mod error;

/// Request handlers
pub mod routes;

/// Shared state
pub mod state;

/// HTML pages
pub mod templates;

pub use config::ServerConfig;
pub use error::ServerError;
pub use state::{AppState, InferBackend};

/// Build the application router
pub fn router(state: AppState, timeout: Duration) -> Router {
    Router::new()
        .route("/", get(routes::index).post(routes::predict))
        .route("/automated_testing", post(routes::predict_batch))
        .route("/health", get(routes::health))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .with_state(state)
}

/// Load the classifier and serve until interrupted.
///
/// Fails before binding if the model artifacts can't be loaded.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    log::info!("Loading artifacts from {}", config.artifact_dir.display());

    let artifact_dir = config.artifact_dir.clone();
    let classifier = tokio::task::spawn_blocking(move || {
        Classifier::<InferBackend>::load(artifact_dir, NdArrayDevice::Cpu)
    })
    .await??;

    let timeout = Duration::from_secs(config.timeout_secs);

    if config.credentials.is_none() {
        log::warn!("No reddit credentials configured, using the public endpoints");
    }

    let resolver = RedditClient::new(&config.user_agent, config.credentials.clone(), timeout)?;

    let state = AppState::new(
        Arc::new(classifier),
        Arc::new(resolver),
        config.resolve_concurrency,
    )?;

    let app = router(state, timeout);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;

    log::info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => log::info!("Received SIGTERM, shutting down..."),
    }
}
