//! Key lookup configuration.

use crate::error::{KeysError, KeysResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for remote key lookup and the local key cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Base URL of the key host. Keys are fetched from `<url>/<user>.keys`.
    pub key_host_url: String,

    /// `User-Agent` sent with every fetch.
    pub user_agent: String,

    /// Transport timeout for a single fetch, in seconds.
    pub request_timeout_secs: u64,

    /// Line prefixes that mark a usable key. Lines not matching any prefix
    /// are skipped and do not take a cache index.
    pub key_prefixes: Vec<String>,

    /// Cache directory override. `None` means [`KeysConfig::default_cache_dir`].
    pub cache_dir: Option<PathBuf>,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            key_host_url: "https://github.com".to_string(),
            user_agent: "ssh-vault".to_string(),
            request_timeout_secs: 30,
            key_prefixes: vec!["ssh-rsa".to_string()],
            cache_dir: None,
        }
    }
}

impl KeysConfig {
    /// `~/.ssh/vault/keys`, or `./.ssh/vault/keys` when no home directory
    /// can be determined.
    #[must_use]
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ssh")
            .join("vault")
            .join("keys")
    }

    /// The cache directory in effect.
    #[must_use]
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(Self::default_cache_dir)
    }

    pub fn validate(&self) -> KeysResult<()> {
        if self.key_host_url.trim().is_empty() {
            return Err(KeysError::Config("key_host_url is empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(KeysError::Config("request_timeout_secs must be positive".into()));
        }
        if self.key_prefixes.iter().all(|p| p.is_empty()) {
            return Err(KeysError::Config("key_prefixes has no usable prefix".into()));
        }
        Ok(())
    }
}
