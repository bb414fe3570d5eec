//! Passphrase sources for encrypted private keys.

use crate::error::{VaultError, VaultResult};
use zeroize::Zeroizing;

/// Supplies the passphrase of an encrypted private key.
pub trait PassphraseProvider {
    fn passphrase(&self) -> VaultResult<Zeroizing<Vec<u8>>>;
}

/// Prompts on the controlling terminal without echo.
#[derive(Clone, Debug)]
pub struct TerminalPassphrase {
    prompt: String,
}

impl TerminalPassphrase {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for TerminalPassphrase {
    fn default() -> Self {
        Self::new("Enter the key password: ")
    }
}

impl PassphraseProvider for TerminalPassphrase {
    fn passphrase(&self) -> VaultResult<Zeroizing<Vec<u8>>> {
        let entered = Zeroizing::new(
            rpassword::prompt_password(&self.prompt)
                .map_err(|e| VaultError::PassphraseUnavailable(e.to_string()))?,
        );
        Ok(Zeroizing::new(entered.as_bytes().to_vec()))
    }
}

/// A passphrase known up front (environment, config, tests).
pub struct StaticPassphrase(Zeroizing<Vec<u8>>);

impl StaticPassphrase {
    pub fn new(passphrase: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }
}

impl PassphraseProvider for StaticPassphrase {
    fn passphrase(&self) -> VaultResult<Zeroizing<Vec<u8>>> {
        Ok(self.0.clone())
    }
}

/// Fails every request. For non-interactive callers that must not prompt.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPassphrase;

impl PassphraseProvider for NoPassphrase {
    fn passphrase(&self) -> VaultResult<Zeroizing<Vec<u8>>> {
        Err(VaultError::PassphraseRequired)
    }
}
