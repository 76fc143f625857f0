use async_trait::async_trait;
use derive_new::new;
use serde::Deserialize;

/// Reddit API client
pub mod client;

pub use client::{Credentials, RedditClient};

/// The parts of a submission needed for prediction
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, new)]
pub struct Submission {
    /// The post title
    pub title: String,

    /// The flair the post is currently tagged with, if any
    #[serde(rename = "link_flair_text")]
    pub flair: Option<String>,
}

/// Resolves a post URL to its submission
#[async_trait]
pub trait TitleResolver: Send + Sync {
    /// Look up the submission a URL points to
    async fn resolve(&self, url: &str) -> Result<Submission, ResolveError>;
}

/// Resolve Error
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    /// The URL doesn't point to a submission
    #[error("{0} is not a link to a reddit post")]
    InvalidUrl(String),

    /// The submission doesn't exist or was removed
    #[error("no post found with id {0}")]
    NotFound(String),

    /// The submission has an empty title
    #[error("post {0} has no title")]
    MissingTitle(String),

    /// The application credentials were rejected
    #[error("reddit authentication failed: {0}")]
    Auth(String),

    /// Network or decoding failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
