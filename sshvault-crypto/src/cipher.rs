//! AES-256-GCM payload decryption.
//!
//! Ciphertext wire format:
//!   [ nonce (12 bytes) | ciphertext + tag (16 bytes) ]
//!
//! The header fingerprint is passed as associated data, so a body can only
//! be opened under the fingerprint it was sealed for.

use crate::error::{VaultError, VaultResult};
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Symmetric password length in bytes (AES-256).
pub const PASSWORD_SIZE: usize = 32;

/// Symmetric password recovered from the vault.
///
/// Zeroed on drop.
pub struct SymmetricPassword(Zeroizing<Vec<u8>>);

impl SymmetricPassword {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SymmetricPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricPassword")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Decrypts an encrypted vault body.
///
/// Every failure (short input, wrong key length, tag mismatch) collapses to
/// [`VaultError::PayloadDecryptFailed`]. No partial plaintext is returned.
pub fn decrypt_payload(
    password: &SymmetricPassword,
    ciphertext: &[u8],
    fingerprint: &str,
) -> VaultResult<Zeroizing<Vec<u8>>> {
    let failed = || VaultError::PayloadDecryptFailed {
        fingerprint: fingerprint.to_string(),
    };
    if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
        return Err(failed());
    }
    let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(password.as_bytes())
        .map_err(|_| failed())?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: sealed,
                aad: fingerprint.as_bytes(),
            },
        )
        .map_err(|_| failed())?;

    Ok(Zeroizing::new(plaintext))
}
