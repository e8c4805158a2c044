//! Authenticated public-key encryption between two parties.
//!
//! X25519 key agreement between the sender's private key and the
//! recipient's public key, followed by XSalsa20-Poly1305. The recipient
//! recomputes the same shared key from its private key and the sender's
//! public key, so a successful decryption also authenticates the sender.
//!
//! # Payload format
//!
//! ```text
//! base64( version: u8 | nonce: [u8; 24] | ciphertext || tag: [u8; 16] )
//! ```
//!
//! `decrypt` parses exactly this layout; there is no other wire form.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{PrivateKey, PublicKey};
use base64::{engine::general_purpose::STANDARD, Engine};
use crypto_box::aead::{Aead, AeadCore, Nonce};
use crypto_box::SalsaBox;
use std::fmt;

/// Current payload container version.
pub const PAYLOAD_VERSION: u8 = 1;

/// Size of nonce in bytes (192 bits for XSalsa20).
pub const NONCE_SIZE: usize = 24;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

const HEADER_SIZE: usize = 1 + NONCE_SIZE;

/// An encrypted message in its canonical text form.
///
/// Layers above this crate treat the value as an opaque string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncryptedPayload(String);

impl EncryptedPayload {
    /// Wraps an encoded payload received from elsewhere. The content is
    /// validated when it is decrypted.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded payload.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the payload, returning the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }

    fn seal(nonce: &[u8], ciphertext: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        bytes.push(PAYLOAD_VERSION);
        bytes.extend_from_slice(nonce);
        bytes.extend_from_slice(ciphertext);
        Self(STANDARD.encode(&bytes))
    }

    fn open(&self) -> CryptoResult<([u8; NONCE_SIZE], Vec<u8>)> {
        let bytes = STANDARD
            .decode(self.0.trim())
            .map_err(|e| CryptoError::MalformedPayload(format!("invalid base64: {e}")))?;

        let Some((&version, rest)) = bytes.split_first() else {
            return Err(CryptoError::MalformedPayload("empty payload".to_string()));
        };
        if version != PAYLOAD_VERSION {
            return Err(CryptoError::UnsupportedVersion(version));
        }
        if rest.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::MalformedPayload("data too short".to_string()));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&rest[..NONCE_SIZE]);
        Ok((nonce, rest[NONCE_SIZE..].to_vec()))
    }
}

impl fmt::Debug for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptedPayload")
            .field(&format_args!("{} chars", self.0.len()))
            .finish()
    }
}

impl fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EncryptedPayload> for String {
    fn from(payload: EncryptedPayload) -> Self {
        payload.0
    }
}

/// Encrypts bytes from `sender` to `recipient`.
pub fn seal(
    sender: &PrivateKey,
    plaintext: &[u8],
    recipient: &PublicKey,
) -> CryptoResult<EncryptedPayload> {
    let shared = SalsaBox::new(&recipient.to_box_key(), &sender.to_secret_key());
    let nonce = SalsaBox::generate_nonce(&mut rand::rngs::OsRng);

    let ciphertext = shared
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedPayload::seal(nonce.as_slice(), &ciphertext))
}

/// Decrypts a payload addressed to `recipient` from `sender`.
pub fn open(
    recipient: &PrivateKey,
    payload: &EncryptedPayload,
    sender: &PublicKey,
) -> CryptoResult<Vec<u8>> {
    let (nonce_bytes, ciphertext) = payload.open()?;
    let shared = SalsaBox::new(&sender.to_box_key(), &recipient.to_secret_key());
    let nonce = Nonce::<SalsaBox>::from_slice(&nonce_bytes);

    shared.decrypt(nonce, ciphertext.as_slice()).map_err(|_| {
        CryptoError::Decryption("wrong key pair or tampered payload".to_string())
    })
}

/// Encrypts a text message.
///
/// # Arguments
/// * `sender_private_key` - base64 private key of the sending party
/// * `message` - the plaintext
/// * `recipient_public_key` - base64 public key of the receiving party
pub fn encrypt(
    sender_private_key: &str,
    message: &str,
    recipient_public_key: &str,
) -> CryptoResult<EncryptedPayload> {
    let sender = PrivateKey::from_base64(sender_private_key)?;
    let recipient = PublicKey::from_base64(recipient_public_key)?;
    seal(&sender, message.as_bytes(), &recipient)
}

/// Decrypts a text message produced by [`encrypt`].
///
/// Fails with [`CryptoError::Decryption`] when the key pair does not match
/// the one used for encryption; it never returns garbled plaintext.
pub fn decrypt(
    recipient_private_key: &str,
    payload: &EncryptedPayload,
    sender_public_key: &str,
) -> CryptoResult<String> {
    let recipient = PrivateKey::from_base64(recipient_private_key)?;
    let sender = PublicKey::from_base64(sender_public_key)?;
    open_text(&recipient, payload, &sender)
}

/// [`open`] for payloads that carry UTF-8 text.
pub fn open_text(
    recipient: &PrivateKey,
    payload: &EncryptedPayload,
    sender: &PublicKey,
) -> CryptoResult<String> {
    let plaintext = open(recipient, payload, sender)?;
    String::from_utf8(plaintext).map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {e}")))
}
