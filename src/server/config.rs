use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use crate::reddit::Credentials;

/// Default location of the model artifacts
pub static DEFAULT_ARTIFACT_DIR: &str = "models";

/// Default listen address
pub static DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default user agent sent to reddit
pub static DEFAULT_USER_AGENT: &str = concat!("flair-classifier/", env!("CARGO_PKG_VERSION"));

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding `config.json`, the weights and the vocabulary
    pub artifact_dir: PathBuf,

    /// Address to listen on
    pub bind: SocketAddr,

    /// Upper bound on the time spent on a single request
    pub timeout_secs: u64,

    /// How many URLs of an uploaded batch are resolved at once
    pub resolve_concurrency: usize,

    /// User agent sent to reddit
    pub user_agent: String,

    /// Reddit application credentials; the public endpoints are used without them
    pub credentials: Option<Credentials>,
}

impl ServerConfig {
    /// Read the configuration from the environment, falling back to the defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let artifact_dir = env::var("FLAIR_ARTIFACT_DIR")
            .unwrap_or_else(|_| DEFAULT_ARTIFACT_DIR.to_string())
            .into();

        let bind = match parse_var("FLAIR_BIND")? {
            Some(bind) => bind,
            None => DEFAULT_BIND.parse()?,
        };

        let credentials = match (env::var("REDDIT_CLIENT_ID"), env::var("REDDIT_CLIENT_SECRET")) {
            (Ok(client_id), Ok(client_secret)) => Some(Credentials::new(client_id, client_secret)),
            _ => None,
        };

        Ok(Self {
            artifact_dir,
            bind,
            timeout_secs: parse_var("FLAIR_TIMEOUT_SECS")?.unwrap_or(30),
            resolve_concurrency: parse_var("FLAIR_RESOLVE_CONCURRENCY")?.unwrap_or(8),
            user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            credentials,
        })
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| anyhow!("Invalid value for {}: {}", name, e)),
        Err(_) => Ok(None),
    }
}
