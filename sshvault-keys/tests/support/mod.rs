//! Shared helpers for key cache tests.

#![allow(dead_code)]

use sshvault_keys::{KeyFetcher, KeysError, KeysResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory fetcher that counts calls.
pub struct StubFetcher {
    keys: Vec<String>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn with_keys(count: usize) -> Self {
        Self {
            keys: (1..=count).map(rsa_line).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyFetcher for StubFetcher {
    async fn fetch(&self, user: &str) -> KeysResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.keys.is_empty() {
            return Err(KeysError::KeyNotFoundRemotely(user.to_string()));
        }
        Ok(self.keys.clone())
    }
}

/// A fake `ssh-rsa` line, distinct per `n`.
pub fn rsa_line(n: usize) -> String {
    format!("ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQ{n:04}")
}
