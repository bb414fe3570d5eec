//! Public key lookup for sshvault.
//!
//! Resolves a user identity to one of their published public keys:
//! - [`KeyCache`] serves keys from `~/.ssh/vault/keys` when present
//! - on a miss, [`HttpKeyFetcher`] fetches every key the user publishes
//!   and the cache stores all of them, indexed from 1 in host order

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;

pub use cache::{CacheLookup, CacheSource, KeyCache, PersistReport};
pub use config::KeysConfig;
pub use error::{KeysError, KeysResult};
pub use fetcher::{HttpKeyFetcher, KeyFetcher};
