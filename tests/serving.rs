use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use burn::backend::ndarray::NdArrayDevice;
use flair_classifier::{
    models::flair,
    pipelines::text_classification::{Classifier, Vocabulary, FLAIRS},
    reddit::{ResolveError, Submission, TitleResolver},
    server::{router, AppState, InferBackend},
};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

static BOUNDARY: &str = "flair-boundary";

/// Resolves a fixed set of URLs without touching the network
struct FakeResolver {
    submissions: HashMap<String, Submission>,
}

#[async_trait]
impl TitleResolver for FakeResolver {
    async fn resolve(&self, url: &str) -> Result<Submission, ResolveError> {
        self.submissions
            .get(url)
            .cloned()
            .ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))
    }
}

fn app() -> Router {
    let device = NdArrayDevice::Cpu;
    let config = flair::Config::new()
        .with_vocab_size(20)
        .with_embedding_size(8)
        .with_hidden_size(6)
        .with_dense_size(10);
    let model = config.init::<InferBackend>(&device);

    let word_index = ["india", "reports", "record", "vaccine", "rollout", "cricket"]
        .iter()
        .enumerate()
        .map(|(i, word)| (word.to_string(), i as u32 + 1))
        .collect();
    let vocabulary = Vocabulary::from_word_index(word_index, config.vocab_size).unwrap();

    let classifier = Classifier::new(model, vocabulary, config, device).unwrap();

    let submissions = [
        (
            "https://redd.it/aaa111",
            "India reports record vaccine rollout",
            Some("Coronavirus"),
        ),
        ("https://redd.it/bbb222", "Cricket world cup final", None),
    ]
    .into_iter()
    .map(|(url, title, current)| {
        (
            url.to_string(),
            Submission::new(title.to_string(), current.map(str::to_string)),
        )
    })
    .collect();

    let state = AppState::new(
        Arc::new(classifier),
        Arc::new(FakeResolver { submissions }),
        2,
    )
    .unwrap();

    router(state, Duration::from_secs(30))
}

fn upload(field: &str, contents: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"urls.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::post("/automated_testing")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn form(url: &str) -> Request<Body> {
    Request::post("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("url={}", url)))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn batch_upload_isolates_failed_urls() {
    let response = app()
        .oneshot(upload(
            "upload_file",
            "https://redd.it/aaa111\n\nhttps://redd.it/deleted\nhttps://redd.it/bbb222\n",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let labels: HashMap<String, String> = serde_json::from_str(&body_text(response).await).unwrap();
    let known: Vec<&str> = FLAIRS.iter().map(|flair| flair.as_str()).collect();

    assert_eq!(labels.len(), 3);
    assert_eq!(labels["https://redd.it/deleted"], "error!");
    assert!(known.contains(&labels["https://redd.it/aaa111"].as_str()));
    assert!(known.contains(&labels["https://redd.it/bbb222"].as_str()));
}

#[tokio::test]
async fn batch_upload_with_only_failures() {
    let response = app()
        .oneshot(upload("upload_file", "not a url\nhttps://redd.it/gone"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let labels: HashMap<String, String> = serde_json::from_str(&body_text(response).await).unwrap();

    assert_eq!(labels.len(), 2);
    assert!(labels.values().all(|label| label == "error!"));
}

#[tokio::test]
async fn batch_upload_requires_the_file_field() {
    let response = app()
        .oneshot(upload("some_other_field", "https://redd.it/aaa111"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn single_url_renders_the_prediction() {
    let response = app()
        .oneshot(form("https%3A%2F%2Fredd.it%2Faaa111"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;

    assert!(html.contains("Success!"));
    assert!(html.contains("Title: India reports record vaccine rollout"));
    assert!(html.contains("Actual flair: Coronavirus"));
    assert!(FLAIRS
        .iter()
        .any(|flair| html.contains(&format!("Predicted flair: {}", flair))));
}

#[tokio::test]
async fn single_url_failures_ask_to_try_again() {
    let response = app().oneshot(form("garbage")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;

    assert!(html.contains("Oops!"));
    assert!(html.contains("Why don&#39;t we try again?") || html.contains("Why don't we try again?"));
}

#[tokio::test]
async fn single_url_without_a_form_body_asks_to_try_again() {
    let response = app()
        .oneshot(Request::post("/").body(Body::from("url=x")).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Oops!"));
}

#[tokio::test]
async fn index_serves_the_form() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("upload_file"));
}

#[tokio::test]
async fn health_is_ok() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
