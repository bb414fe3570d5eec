//! Vault decryption error types.

use thiserror::Error;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors that can occur while reading or decrypting a vault.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("bad ssh-vault signature, verify the input (expected 3 header fields, found {found})")]
    MalformedHeader { found: usize },

    #[error("bad ssh-vault payload, verify the input (expected 2 payload fields, found {found})")]
    MalformedPayload { found: usize },

    #[error("invalid encoding in {field}: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    #[error("error reading private key: {0}")]
    KeyFileUnreadable(#[from] std::io::Error),

    #[error("no valid private key found: {0}")]
    KeyFileInvalidFormat(String),

    #[error("private key is protected by a passphrase")]
    PassphraseRequired,

    #[error("could not decrypt private key: {0}")]
    PassphraseInvalid(String),

    #[error("unable to get private key passphrase: {0}")]
    PassphraseUnavailable(String),

    #[error("decryption failed, use private key with fingerprint: {fingerprint}")]
    UnwrapFailed { fingerprint: String },

    #[error("payload decryption failed, vault is bound to key fingerprint: {fingerprint}")]
    PayloadDecryptFailed { fingerprint: String },

    #[error("missing vault name: {0}")]
    InputUnavailable(String),
}
