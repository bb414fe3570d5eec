//! Vault envelope wire format.
//!
//! A vault is line oriented text:
//!
//! ```text
//! SSH-VAULT;AES256;<fingerprint>
//! <base64 encrypted password>;<base64 encrypted body>
//! ```
//!
//! The first line is the header. Every following line is concatenated
//! without a separator, so the payload may be wrapped at any width.

use crate::error::{VaultError, VaultResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Number of `;`-delimited fields in the header line.
pub const HEADER_FIELDS: usize = 3;

/// Number of `;`-delimited fields in the reconstructed payload.
pub const PAYLOAD_FIELDS: usize = 2;

/// Column at which [`Envelope::to_text`] wraps the payload.
pub const LINE_WIDTH: usize = 64;

const FIELD_SEPARATOR: u8 = b';';

/// First line of a vault: `<format>;<cipher>;<fingerprint>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultHeader {
    /// Format tag, e.g. `SSH-VAULT`.
    pub format: String,
    /// Cipher suite tag, e.g. `AES256`.
    pub cipher: String,
    /// Fingerprint of the recipient key. Bound to the body as associated data.
    pub fingerprint: String,
}

/// Decoded ciphertext fields of a vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultPayload {
    /// Symmetric password encrypted under the recipient's public key.
    pub encrypted_password: Vec<u8>,
    /// Body encrypted under the symmetric password.
    pub encrypted_body: Vec<u8>,
}

/// A parsed vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub header: VaultHeader,
    pub payload: VaultPayload,
}

impl Envelope {
    /// Parses raw vault bytes.
    ///
    /// The header is validated before the payload is looked at, so a bad
    /// header never reports a payload error.
    pub fn parse(raw: &[u8]) -> VaultResult<Self> {
        let (header_line, joined) = split_vault(raw)?;
        let header = VaultHeader::parse(header_line)?;
        let payload = VaultPayload::parse(&joined)?;
        Ok(Self { header, payload })
    }

    /// Serializes the envelope back to vault text, wrapping the payload at
    /// [`LINE_WIDTH`] columns.
    pub fn to_text(&self) -> String {
        let payload = format!(
            "{};{}",
            STANDARD.encode(&self.payload.encrypted_password),
            STANDARD.encode(&self.payload.encrypted_body)
        );

        let mut out = format!(
            "{};{};{}\n",
            self.header.format, self.header.cipher, self.header.fingerprint
        );
        // base64 output is ASCII, so byte chunks are valid char boundaries
        for chunk in payload.as_bytes().chunks(LINE_WIDTH) {
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push('\n');
        }
        out
    }
}

/// Splits raw vault bytes into the header line and the concatenated
/// payload lines. Trailing `\r` is stripped from every line.
pub fn split_vault(raw: &[u8]) -> VaultResult<(&[u8], Vec<u8>)> {
    if raw.is_empty() {
        return Err(VaultError::MalformedHeader { found: 0 });
    }

    let mut lines = raw
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line));

    let header = lines.next().unwrap_or_default();
    let joined: Vec<u8> = lines.flatten().copied().collect();
    Ok((header, joined))
}

impl VaultHeader {
    /// Parses a header line. Exactly [`HEADER_FIELDS`] fields are required.
    pub fn parse(line: &[u8]) -> VaultResult<Self> {
        let fields: Vec<&[u8]> = line.split(|b| *b == FIELD_SEPARATOR).collect();
        if fields.len() != HEADER_FIELDS {
            return Err(VaultError::MalformedHeader { found: fields.len() });
        }

        let text = |field: &[u8]| {
            String::from_utf8(field.to_vec()).map_err(|e| VaultError::InvalidEncoding {
                field: "header",
                reason: e.to_string(),
            })
        };

        Ok(Self {
            format: text(fields[0])?,
            cipher: text(fields[1])?,
            fingerprint: text(fields[2])?,
        })
    }
}

impl VaultPayload {
    /// Parses the concatenated payload lines. Exactly [`PAYLOAD_FIELDS`]
    /// base64 fields are required.
    pub fn parse(joined: &[u8]) -> VaultResult<Self> {
        let fields: Vec<&[u8]> = joined.split(|b| *b == FIELD_SEPARATOR).collect();
        if fields.len() != PAYLOAD_FIELDS {
            return Err(VaultError::MalformedPayload { found: fields.len() });
        }

        let decode = |field: &'static str, data: &[u8]| {
            STANDARD.decode(data).map_err(|e| VaultError::InvalidEncoding {
                field,
                reason: e.to_string(),
            })
        };

        Ok(Self {
            encrypted_password: decode("encrypted password", fields[0])?,
            encrypted_body: decode("encrypted body", fields[1])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_vault() {
        let env = Envelope::parse(b"sv;AES256;abc123\nZm9v;YmFy").unwrap();
        assert_eq!(env.header.format, "sv");
        assert_eq!(env.header.cipher, "AES256");
        assert_eq!(env.header.fingerprint, "abc123");
        assert_eq!(env.payload.encrypted_password, b"foo");
        assert_eq!(env.payload.encrypted_body, b"bar");
    }

    #[test]
    fn payload_lines_are_joined_without_separator() {
        let env = Envelope::parse(b"sv;AES256;fp\nZm\n9v;Ym\nFy\n").unwrap();
        assert_eq!(env.payload.encrypted_password, b"foo");
        assert_eq!(env.payload.encrypted_body, b"bar");
    }

    #[test]
    fn crlf_line_endings_accepted() {
        let env = Envelope::parse(b"sv;AES256;fp\r\nZm9v;\r\nYmFy\r\n").unwrap();
        assert_eq!(env.header.fingerprint, "fp");
        assert_eq!(env.payload.encrypted_body, b"bar");
    }

    #[test]
    fn empty_input_is_malformed_header() {
        assert!(matches!(
            Envelope::parse(b""),
            Err(VaultError::MalformedHeader { found: 0 })
        ));
    }

    #[test]
    fn two_field_header_rejected_before_payload() {
        // payload is garbage too, but the header error must win
        let err = Envelope::parse(b"a;b\n!!!").unwrap_err();
        assert!(matches!(err, VaultError::MalformedHeader { found: 2 }));
    }

    #[test]
    fn missing_payload_is_malformed() {
        let err = Envelope::parse(b"sv;AES256;fp\n").unwrap_err();
        assert!(matches!(err, VaultError::MalformedPayload { found: 1 }));
    }

    #[test]
    fn bad_base64_reports_field() {
        let err = Envelope::parse(b"sv;AES256;fp\nZm9v;***").unwrap_err();
        match err {
            VaultError::InvalidEncoding { field, .. } => assert_eq!(field, "encrypted body"),
            other => panic!("expected InvalidEncoding, got {other:?}"),
        }
    }

    #[test]
    fn to_text_wraps_payload() {
        let env = Envelope {
            header: VaultHeader {
                format: "SSH-VAULT".into(),
                cipher: "AES256".into(),
                fingerprint: "fp".into(),
            },
            payload: VaultPayload {
                encrypted_password: vec![7u8; 100],
                encrypted_body: vec![9u8; 100],
            },
        };
        let text = env.to_text();
        assert!(text.starts_with("SSH-VAULT;AES256;fp\n"));
        assert!(text.lines().skip(1).all(|l| l.len() <= LINE_WIDTH));
        assert_eq!(Envelope::parse(text.as_bytes()).unwrap(), env);
    }
}
