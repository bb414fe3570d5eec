//! Vault decryption for sshvault.
//!
//! A vault is opened in two steps:
//!
//! 1. **Password unwrap**: the symmetric password is decrypted with the
//!    recipient's RSA private key (OAEP, SHA-256).
//!
//! 2. **Payload decrypt**: the body is decrypted with AES-256-GCM under that
//!    password, with the header fingerprint as associated data.
//!
//! The fingerprint binding means a vault whose header was edited, or whose
//! body was sealed for another recipient, fails authentication instead of
//! decrypting to garbage.
//!
//! Passwords, passphrases, and plaintext are held in [`zeroize::Zeroizing`]
//! buffers and are never logged.

pub mod cipher;
pub mod envelope;
mod error;
pub mod input;
pub mod key;
pub mod passphrase;
pub mod pipeline;

pub use cipher::{NONCE_SIZE, PASSWORD_SIZE, SymmetricPassword, TAG_SIZE, decrypt_payload};
pub use envelope::{Envelope, VaultHeader, VaultPayload};
pub use error::{VaultError, VaultResult};
pub use input::VaultInput;
pub use key::{
    FileKeyLoader, PrivateKeyHandle, PrivateKeyLoader, load_private_key, parse_private_key,
};
pub use passphrase::{NoPassphrase, PassphraseProvider, StaticPassphrase, TerminalPassphrase};
pub use pipeline::{FailedStage, PipelineState, VaultDecryptPipeline, decrypt_vault};
