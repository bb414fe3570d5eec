//! On-disk public key cache.
//!
//! Layout: `<dir>/<user>.key-<index>`, index starting at 1, one key per
//! file. A miss on any index fetches and stores every key the user has, so
//! later lookups for other indices stay local.

use crate::config::KeysConfig;
use crate::error::{KeysError, KeysResult};
use crate::fetcher::{KeyFetcher, validate_user};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Mode of written key files on Unix.
#[cfg(unix)]
const KEY_FILE_MODE: u32 = 0o644;

/// Outcome of persisting one fetched key.
#[derive(Debug)]
pub struct PersistReport {
    /// 1-based position of the key in the fetched list.
    pub index: usize,
    pub outcome: std::io::Result<PathBuf>,
}

/// How a lookup was satisfied.
#[derive(Debug)]
pub enum CacheSource {
    /// Served from disk without a fetch.
    Hit,
    /// Populated by a fetch. `persisted` has one entry per fetched key.
    Fetched { persisted: Vec<PersistReport> },
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct CacheLookup {
    pub path: PathBuf,
    pub source: CacheSource,
}

impl CacheLookup {
    /// Keys that were fetched but could not be written.
    pub fn failed_writes(&self) -> impl Iterator<Item = &PersistReport> {
        let reports: &[PersistReport] = match &self.source {
            CacheSource::Hit => &[],
            CacheSource::Fetched { persisted } => persisted,
        };
        reports.iter().filter(|r| r.outcome.is_err())
    }
}

/// Public key cache backed by a directory and a remote fetcher.
pub struct KeyCache<F> {
    dir: PathBuf,
    fetcher: F,
}

impl<F: KeyFetcher> KeyCache<F> {
    /// Opens the cache at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>, fetcher: F) -> KeysResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| KeysError::Storage(format!("{}: {e}", dir.display())))?;
        debug!("key cache at {}", dir.display());
        Ok(Self { dir, fetcher })
    }

    /// Opens the cache at the configured (or default) location.
    pub async fn from_config(config: &KeysConfig, fetcher: F) -> KeysResult<Self> {
        Self::open(config.resolved_cache_dir(), fetcher).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Path of key `index` (1-based) for `user`, cached or not.
    pub fn key_path(&self, user: &str, index: usize) -> PathBuf {
        self.dir.join(format!("{user}.key-{index}"))
    }

    /// Returns the path of key `index` for `user`, fetching on a miss.
    pub async fn get(&self, user: &str, index: usize) -> KeysResult<PathBuf> {
        self.lookup(user, index).await.map(|lookup| lookup.path)
    }

    /// Returns the contents of key `index` for `user`, fetching on a miss.
    pub async fn get_key(&self, user: &str, index: usize) -> KeysResult<String> {
        let path = self.get(user, index).await?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| KeysError::Storage(format!("{}: {e}", path.display())))
    }

    /// Like [`KeyCache::get`], but also reports how the lookup was served
    /// and which fetched keys failed to persist.
    pub async fn lookup(&self, user: &str, index: usize) -> KeysResult<CacheLookup> {
        validate_user(user)?;

        let path = self.key_path(user, index);
        if is_cached(&path).await {
            debug!("key cache hit: {}", path.display());
            return Ok(CacheLookup {
                path,
                source: CacheSource::Hit,
            });
        }

        debug!("key cache miss for {user} #{index}, fetching");
        let keys = self.fetcher.fetch(user).await?;

        let mut persisted = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            let index = i + 1;
            let target = self.key_path(user, index);
            let outcome = match write_key(&target, key).await {
                Ok(()) => Ok(target),
                Err(e) => {
                    warn!("failed to cache key {index} for {user}: {e}");
                    Err(e)
                }
            };
            persisted.push(PersistReport { index, outcome });
        }

        if !is_cached(&path).await {
            return Err(KeysError::CacheIndexOutOfRange { max: keys.len() });
        }

        Ok(CacheLookup {
            path,
            source: CacheSource::Fetched { persisted },
        })
    }
}

async fn write_key(path: &Path, key: &str) -> std::io::Result<()> {
    tokio::fs::write(path, key.as_bytes()).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(KEY_FILE_MODE)).await?;
    }
    Ok(())
}

/// A cache entry counts only if it is a regular file the owner can read.
async fn is_cached(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() && owner_readable(&meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn owner_readable(meta: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o400 != 0
}

#[cfg(not(unix))]
fn owner_readable(_meta: &Metadata) -> bool {
    true
}
