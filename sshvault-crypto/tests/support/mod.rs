//! Shared helpers: test keypairs and a sealing routine that mirrors the
//! vault write path.

#![allow(dead_code)]

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Payload};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::rand_core::{OsRng, RngCore};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use sshvault_crypto::{Envelope, PrivateKeyHandle, VaultHeader, VaultPayload};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const FINGERPRINT: &str = "SHA256:nThbg6kXUpJWGl7E1IGOCspRomTxdCARLviKw6E5SY8";

/// Recipient key, generated once per test binary.
pub fn recipient_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen must succeed"))
}

/// A second, unrelated key.
pub fn other_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen must succeed"))
}

pub fn handle(key: &RsaPrivateKey) -> PrivateKeyHandle {
    PrivateKeyHandle::Rsa(Box::new(key.clone()))
}

/// Seals `plaintext` for `recipient` under `fingerprint`.
pub fn seal_vault(recipient: &RsaPublicKey, fingerprint: &str, plaintext: &[u8]) -> String {
    seal_envelope(recipient, fingerprint, fingerprint, plaintext).to_text()
}

/// Seals with `aad` as associated data but writes `header_fingerprint` into
/// the header.
pub fn seal_envelope(
    recipient: &RsaPublicKey,
    header_fingerprint: &str,
    aad: &str,
    plaintext: &[u8],
) -> Envelope {
    let mut password = [0u8; 32];
    OsRng.fill_bytes(&mut password);

    let encrypted_password = recipient
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &password)
        .expect("oaep encrypt must succeed");

    let cipher = Aes256Gcm::new_from_slice(&password).expect("32-byte key");
    let nonce = Aes256Gcm::generate_nonce(&mut aes_gcm::aead::OsRng);
    let sealed = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: aad.as_bytes(),
            },
        )
        .expect("aead encrypt must succeed");

    let mut encrypted_body = nonce.to_vec();
    encrypted_body.extend_from_slice(&sealed);

    Envelope {
        header: VaultHeader {
            format: "SSH-VAULT".into(),
            cipher: "AES256".into(),
            fingerprint: header_fingerprint.into(),
        },
        payload: VaultPayload {
            encrypted_password,
            encrypted_body,
        },
    }
}

pub fn write_key(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write key file");
    path
}

pub fn pkcs1_pem(key: &RsaPrivateKey) -> String {
    key.to_pkcs1_pem(LineEnding::LF).expect("pkcs1 encode").to_string()
}

pub fn pkcs8_pem(key: &RsaPrivateKey) -> String {
    key.to_pkcs8_pem(LineEnding::LF).expect("pkcs8 encode").to_string()
}

pub fn pkcs8_encrypted_pem(key: &RsaPrivateKey, passphrase: &str) -> String {
    key.to_pkcs8_encrypted_pem(&mut OsRng, passphrase, LineEnding::LF)
        .expect("pkcs8 encrypt")
        .to_string()
}

pub fn openssh_pem(key: &RsaPrivateKey, passphrase: Option<&str>) -> String {
    let keypair = ssh_key::private::RsaKeypair::try_from(key).expect("rsa keypair");
    let mut private = ssh_key::PrivateKey::new(keypair.into(), "test@sshvault")
        .expect("openssh private key");
    if let Some(passphrase) = passphrase {
        private = private.encrypt(&mut OsRng, passphrase).expect("openssh encrypt");
    }
    private
        .to_openssh(ssh_key::LineEnding::LF)
        .expect("openssh encode")
        .to_string()
}
