use std::collections::BTreeMap;

use axum::{
    extract::{rejection::FormRejection, Multipart, State},
    response::Html,
    Form, Json,
};
use futures::{stream, StreamExt};
use serde::Deserialize;

use crate::reddit::{ResolveError, Submission};

use super::{
    error::ServerError,
    state::AppState,
    templates::ResultPage,
};

/// Reported in place of a flair for URLs that couldn't be classified
pub static ERROR_MARKER: &str = "error!";

/// The multipart field holding the uploaded list of URLs
pub static UPLOAD_FIELD: &str = "upload_file";

/// The single URL form
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    /// Link to a post
    #[serde(default)]
    pub url: String,
}

/// The URL entry page
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    Ok(Html(state.templates.main()?))
}

/// Predict the flair of a single post and render the result page.
///
/// Any failure along the way, including a malformed form, is logged and shown as a "try again"
/// page.
pub async fn predict(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Result<Html<String>, ServerError> {
    let page = match form {
        Ok(Form(form)) => {
            let url = form.url.trim();

            match classify_one(&state, url).await {
                Ok(page) => page,
                Err(err) => {
                    log::warn!("Unable to predict a flair for {:?}: {}", url, err);

                    ResultPage::failure()
                }
            }
        }
        Err(rejection) => {
            log::warn!("Unable to read the prediction form: {}", rejection);

            ResultPage::failure()
        }
    };

    Ok(Html(state.templates.predicted(&page)?))
}

async fn classify_one(state: &AppState, url: &str) -> anyhow::Result<ResultPage> {
    let submission = state.resolver.resolve(url).await?;

    let predictions = state
        .classify(vec![submission.title.clone()], vec![url.to_string()])
        .await?;

    let flair = predictions
        .get(url)
        .copied()
        .ok_or_else(|| anyhow!("no prediction for {}", url))?;

    Ok(ResultPage::success(&submission, flair))
}

/// Predict flairs for an uploaded, newline-delimited list of post URLs.
///
/// URLs that can't be resolved are reported with the error marker and left out of the batch.
/// Everything that resolves is classified in a single call.
pub async fn predict_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BTreeMap<String, String>>, ServerError> {
    let upload = read_upload(multipart).await?;

    let urls: Vec<(usize, String)> = upload
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .filter(|(_, url)| !url.is_empty())
        .collect();

    log::info!("Resolving {} uploaded URLs", urls.len());

    let resolver = state.resolver.clone();
    let resolved: Vec<(usize, String, Result<Submission, ResolveError>)> = stream::iter(urls)
        .map(|(line, url)| {
            let resolver = resolver.clone();

            async move {
                let submission = resolver.resolve(&url).await;

                (line, url, submission)
            }
        })
        .buffered(state.resolve_concurrency)
        .collect()
        .await;

    let mut titles = Vec::new();
    let mut ids = Vec::new();
    let mut errors = BTreeMap::new();

    for (line, url, submission) in resolved {
        match submission {
            Ok(submission) => {
                titles.push(submission.title);
                ids.push(url);
            }
            Err(err) => {
                log::warn!("There was an error in parsing query on line {}: {}", line, err);

                errors.insert(url, ERROR_MARKER.to_string());
            }
        }
    }

    let predictions = state.classify(titles, ids).await?;

    let mut response: BTreeMap<String, String> = predictions
        .into_iter()
        .map(|(url, flair)| (url, flair.to_string()))
        .collect();

    response.extend(errors);

    Ok(Json(response))
}

async fn read_upload(mut multipart: Multipart) -> Result<String, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;

        return String::from_utf8(bytes.to_vec())
            .map_err(|_| ServerError::BadRequest(format!("{} must be UTF-8 text", UPLOAD_FIELD)));
    }

    Err(ServerError::BadRequest(format!(
        "missing multipart field {}",
        UPLOAD_FIELD
    )))
}

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}
