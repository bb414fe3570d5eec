//! Vault decrypt pipeline.
//!
//! ```text
//! Start -> HeaderParsed -> PayloadParsed -> PasswordUnwrapped -> Decrypted
//! ```
//!
//! Any stage may instead end in `Failed(stage)`.
//!
//! Stages run strictly in order and never retry. The first failure halts
//! the pipeline, so a bad header never touches a key and a failed unwrap
//! never attempts the body.

use crate::cipher::decrypt_payload;
use crate::envelope::{VaultHeader, VaultPayload, split_vault};
use crate::error::{VaultError, VaultResult};
use crate::key::{PrivateKeyHandle, PrivateKeyLoader};
use crate::passphrase::PassphraseProvider;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// Stage at which a pipeline run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailedStage {
    ParseHeader,
    ParsePayload,
    LoadKey,
    UnwrapPassword,
    DecryptPayload,
}

/// Progress of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    HeaderParsed,
    PayloadParsed,
    PasswordUnwrapped,
    Decrypted,
    Failed(FailedStage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Decrypted | Self::Failed(_))
    }
}

/// Decrypts one vault. Create a new pipeline per vault.
#[derive(Debug)]
pub struct VaultDecryptPipeline {
    state: PipelineState,
}

impl Default for VaultDecryptPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultDecryptPipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Start,
        }
    }

    /// Current state. After a run this is `Decrypted` or `Failed(_)`.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Decrypts `raw` with an already materialized key.
    pub fn decrypt(
        &mut self,
        raw: &[u8],
        key: &PrivateKeyHandle,
    ) -> VaultResult<Zeroizing<Vec<u8>>> {
        self.run(raw, || Ok(KeyRef::Borrowed(key)))
    }

    /// Decrypts `raw` with the key stored at `key_path`.
    ///
    /// The key is loaded only after the envelope parses. If it is
    /// passphrase protected, `passphrase` is asked exactly once.
    pub fn decrypt_with_key_file<L, P>(
        &mut self,
        raw: &[u8],
        key_path: &Path,
        loader: &L,
        passphrase: &P,
    ) -> VaultResult<Zeroizing<Vec<u8>>>
    where
        L: PrivateKeyLoader,
        P: PassphraseProvider,
    {
        self.run(raw, || {
            materialize_key(loader, key_path, passphrase).map(KeyRef::Owned)
        })
    }

    fn run<'k, F>(&mut self, raw: &[u8], key_source: F) -> VaultResult<Zeroizing<Vec<u8>>>
    where
        F: FnOnce() -> VaultResult<KeyRef<'k>>,
    {
        self.state = PipelineState::Start;

        let (header_line, joined) =
            split_vault(raw).map_err(|e| self.fail(FailedStage::ParseHeader, e))?;
        let header =
            VaultHeader::parse(header_line).map_err(|e| self.fail(FailedStage::ParseHeader, e))?;
        self.advance(PipelineState::HeaderParsed);

        let payload =
            VaultPayload::parse(&joined).map_err(|e| self.fail(FailedStage::ParsePayload, e))?;
        self.advance(PipelineState::PayloadParsed);

        let key = key_source().map_err(|e| self.fail(FailedStage::LoadKey, e))?;

        let password = key
            .get()
            .unwrap_password(&payload.encrypted_password, &header.fingerprint)
            .map_err(|e| self.fail(FailedStage::UnwrapPassword, e))?;
        drop(key);
        self.advance(PipelineState::PasswordUnwrapped);

        let plaintext = decrypt_payload(&password, &payload.encrypted_body, &header.fingerprint)
            .map_err(|e| self.fail(FailedStage::DecryptPayload, e))?;
        self.advance(PipelineState::Decrypted);

        Ok(plaintext)
    }

    fn advance(&mut self, next: PipelineState) {
        debug!("vault pipeline: {:?} -> {next:?}", self.state);
        self.state = next;
    }

    fn fail(&mut self, stage: FailedStage, err: VaultError) -> VaultError {
        debug!("vault pipeline failed at {stage:?}: {err}");
        self.state = PipelineState::Failed(stage);
        err
    }
}

/// Decrypts a vault in one call with a materialized key.
pub fn decrypt_vault(raw: &[u8], key: &PrivateKeyHandle) -> VaultResult<Zeroizing<Vec<u8>>> {
    VaultDecryptPipeline::new().decrypt(raw, key)
}

enum KeyRef<'k> {
    Borrowed(&'k PrivateKeyHandle),
    Owned(PrivateKeyHandle),
}

impl KeyRef<'_> {
    fn get(&self) -> &PrivateKeyHandle {
        match self {
            Self::Borrowed(key) => *key,
            Self::Owned(key) => key,
        }
    }
}

/// Loads a key, asking for a passphrase once if the key needs one.
pub fn materialize_key<L, P>(
    loader: &L,
    path: &Path,
    passphrase: &P,
) -> VaultResult<PrivateKeyHandle>
where
    L: PrivateKeyLoader,
    P: PassphraseProvider,
{
    match loader.load(path, None) {
        Err(VaultError::PassphraseRequired) => {
            debug!("private key {} is encrypted, requesting passphrase", path.display());
            let secret = passphrase.passphrase()?;
            loader.load(path, Some(secret.as_slice()))
        }
        other => other,
    }
}
