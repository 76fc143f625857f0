use std::time::{Duration, Instant};

use async_trait::async_trait;
use derive_new::new;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::{ResolveError, Submission, TitleResolver};

/// Public JSON endpoints, used when no credentials are configured
pub static PUBLIC_ROOT: &str = "https://www.reddit.com";

/// Authenticated API endpoints
pub static OAUTH_ROOT: &str = "https://oauth.reddit.com";

/// Application-only token endpoint
static TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are refreshed this long before reddit says they expire
const TOKEN_MARGIN: Duration = Duration::from_secs(60);

/// Script application credentials
#[derive(Clone, Debug, new)]
pub struct Credentials {
    /// The application's client id
    pub client_id: String,

    /// The application's client secret
    pub client_secret: String,
}

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    error: Option<String>,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: Submission,
}

/// Looks up submissions through the reddit API
pub struct RedditClient {
    http: reqwest::Client,
    credentials: Option<Credentials>,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    /// Create a client. Without credentials the public JSON endpoints are used.
    pub fn new(
        user_agent: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, ResolveError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// A cached application-only token, fetching a new one when it is about to expire
    async fn access_token(&self, credentials: &Credentials) -> Result<String, ResolveError> {
        let mut token = self.token.lock().await;

        if let Some(cached) = token.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
        }

        log::debug!("Requesting a new reddit access token");

        let response: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let value = response.access_token.ok_or_else(|| {
            ResolveError::Auth(
                response
                    .error
                    .unwrap_or_else(|| "no access token in response".to_string()),
            )
        })?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_MARGIN);

        *token = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(value)
    }

    async fn fetch(&self, id: &str) -> Result<Listing, ResolveError> {
        let request = match &self.credentials {
            Some(credentials) => {
                let token = self.access_token(credentials).await?;

                self.http
                    .get(format!("{OAUTH_ROOT}/by_id/t3_{id}"))
                    .bearer_auth(token)
            }
            None => self.http.get(format!("{PUBLIC_ROOT}/by_id/t3_{id}.json")),
        };

        Ok(request.send().await?.error_for_status()?.json().await?)
    }
}

#[async_trait]
impl TitleResolver for RedditClient {
    async fn resolve(&self, url: &str) -> Result<Submission, ResolveError> {
        let id = submission_id(url)?;

        let listing = self.fetch(&id).await?;

        let submission = listing
            .data
            .children
            .into_iter()
            .next()
            .map(|child| child.data)
            .ok_or_else(|| ResolveError::NotFound(id.clone()))?;

        if submission.title.trim().is_empty() {
            return Err(ResolveError::MissingTitle(id));
        }

        Ok(submission)
    }
}

/// Extract the base-36 submission id from a post URL.
///
/// Accepts `reddit.com/r/<sub>/comments/<id>/...`, `reddit.com/comments/<id>` and `redd.it/<id>`
/// on any reddit subdomain.
pub fn submission_id(url: &str) -> Result<String, ResolveError> {
    let invalid = || ResolveError::InvalidUrl(url.to_string());

    let parsed = Url::parse(url.trim()).map_err(|_| invalid())?;
    let host = parsed.host_str().unwrap_or_default();

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let id = if host == "redd.it" {
        segments.first()
    } else if host == "reddit.com" || host.ends_with(".reddit.com") {
        segments
            .iter()
            .position(|segment| *segment == "comments")
            .and_then(|i| segments.get(i + 1))
    } else {
        None
    };

    match id {
        Some(id) if id.chars().all(|c| c.is_ascii_alphanumeric()) => Ok(id.to_string()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn finds_the_id_in_post_links() {
        for url in [
            "https://www.reddit.com/r/india/comments/fz5x4k/india_reports_record_vaccine_rollout/",
            "https://old.reddit.com/r/india/comments/fz5x4k",
            "https://reddit.com/comments/fz5x4k",
            "https://redd.it/fz5x4k",
            "  https://www.reddit.com/r/india/comments/fz5x4k/title/?utm_source=share  ",
        ] {
            assert_eq!(submission_id(url).unwrap(), "fz5x4k", "{url}");
        }
    }

    #[test]
    fn rejects_links_that_are_not_posts() {
        for url in [
            "",
            "not a url",
            "https://www.reddit.com/r/india/",
            "https://example.com/r/india/comments/fz5x4k",
            "https://www.reddit.com/r/india/comments/",
            "https://www.reddit.com/r/india/comments/fz5%20x4k",
        ] {
            assert!(
                matches!(submission_id(url), Err(ResolveError::InvalidUrl(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn listing_yields_the_submission() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t3",
                        "data": {
                            "title": "India reports record vaccine rollout",
                            "link_flair_text": "Coronavirus",
                            "score": 42
                        }
                    }
                ]
            }
        }"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        let submission = listing.data.children.into_iter().next().unwrap().data;

        assert_eq!(
            submission,
            Submission::new(
                "India reports record vaccine rollout".to_string(),
                Some("Coronavirus".to_string())
            )
        );
    }

    #[test]
    fn untagged_posts_have_no_flair() {
        let json = r#"{"data": {"children": [{"data": {"title": "t", "link_flair_text": null}}]}}"#;

        let listing: Listing = serde_json::from_str(json).unwrap();

        assert_eq!(listing.data.children[0].data.flair, None);
    }
}
