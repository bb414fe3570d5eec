//! Key lookup error types.

use thiserror::Error;

/// Result type for key lookup operations.
pub type KeysResult<T> = Result<T, KeysError>;

/// Errors that can occur while fetching or caching public keys.
#[derive(Debug, Error)]
pub enum KeysError {
    #[error("key index not found, try -k with a value between 1 and {max}")]
    CacheIndexOutOfRange { max: usize },

    #[error("key fetch failed: {0}")]
    RemoteFetchFailed(String),

    #[error("key {0:?} not found")]
    KeyNotFoundRemotely(String),

    #[error("invalid user identity: {0:?}")]
    InvalidUser(String),

    #[error("key cache error: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for KeysError {
    fn from(err: reqwest::Error) -> Self {
        Self::RemoteFetchFailed(err.to_string())
    }
}
