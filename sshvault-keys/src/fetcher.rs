//! Remote public key lookup.
//!
//! Keys are served as newline-delimited text from `<host>/<user>.keys`,
//! one key per line, in the order the host lists them. That order defines
//! the cache index of every key.

use crate::config::KeysConfig;
use crate::error::{KeysError, KeysResult};
use reqwest::{Client, StatusCode, Url};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Fetches every public key published for a user.
pub trait KeyFetcher {
    /// Returns the user's keys in host order. Never returns an empty list:
    /// a user without recognized keys is [`KeysError::KeyNotFoundRemotely`].
    fn fetch(&self, user: &str) -> impl Future<Output = KeysResult<Vec<String>>> + Send;
}

/// Fetches keys over HTTP(S).
pub struct HttpKeyFetcher {
    client: Client,
    base_url: Url,
    prefixes: Vec<String>,
}

impl HttpKeyFetcher {
    pub fn new(config: &KeysConfig) -> KeysResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| KeysError::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(config.key_host_url.trim()).map_err(|e| {
            KeysError::Config(format!("invalid key_host_url {:?}: {e}", config.key_host_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(KeysError::Config(format!(
                "key_host_url {:?} cannot carry a path",
                config.key_host_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            prefixes: config
                .key_prefixes
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
        })
    }

    /// URL the keys of `user` are fetched from.
    ///
    /// The identity becomes a single percent-encoded path segment, so `?`,
    /// `#` and `%` can never turn into a query or fragment.
    pub fn key_url(&self, user: &str) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{user}.keys"));
        }
        url
    }
}

impl KeyFetcher for HttpKeyFetcher {
    async fn fetch(&self, user: &str) -> KeysResult<Vec<String>> {
        validate_user(user)?;

        let url = self.key_url(user);
        debug!("fetching public keys from {url}");

        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(KeysError::KeyNotFoundRemotely(user.to_string()));
        }
        let body = resp.error_for_status()?.text().await?;

        let keys = filter_keys(&body, &self.prefixes);
        if keys.is_empty() {
            return Err(KeysError::KeyNotFoundRemotely(user.to_string()));
        }

        debug!("found {} key(s) for {user}", keys.len());
        Ok(keys)
    }
}

/// Keeps the lines that start with one of `prefixes`, in order.
pub fn filter_keys(body: &str, prefixes: &[String]) -> Vec<String> {
    body.lines()
        .filter(|line| prefixes.iter().any(|p| line.starts_with(p.as_str())))
        .map(str::to_string)
        .collect()
}

/// Rejects identities that are empty or could escape the cache directory.
pub fn validate_user(user: &str) -> KeysResult<()> {
    let bad = user.is_empty()
        || user.starts_with('.')
        || user
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if bad {
        return Err(KeysError::InvalidUser(user.to_string()));
    }
    Ok(())
}
