//! Vault input selection: piped stdin, or a named file.

use crate::error::{VaultError, VaultResult};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

/// Where the vault bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultInput {
    Stdin,
    File(PathBuf),
}

impl VaultInput {
    /// Uses stdin when data is piped in, otherwise the named file.
    pub fn from_stdin_or_file(path: Option<PathBuf>) -> VaultResult<Self> {
        if !std::io::stdin().is_terminal() {
            return Ok(Self::Stdin);
        }
        path.map(Self::File).ok_or_else(|| {
            VaultError::InputUnavailable("pass a vault file or pipe one on stdin".to_string())
        })
    }

    /// Reads the whole vault into memory.
    pub fn read(&self) -> VaultResult<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Self::Stdin => {
                std::io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .map_err(|e| VaultError::InputUnavailable(format!("stdin: {e}")))?;
            }
            Self::File(path) => {
                buf = std::fs::read(path).map_err(|e| {
                    VaultError::InputUnavailable(format!("{}: {e}", path.display()))
                })?;
            }
        }
        Ok(buf)
    }
}
