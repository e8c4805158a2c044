//! Key material and its canonical text encoding.
//!
//! Every key crossing an API boundary is standard base64 (RFC 4648, with
//! padding) over exactly [`KEY_SIZE`] raw bytes. There is no second encoding.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of public and private keys in bytes (X25519).
pub const KEY_SIZE: usize = 32;

pub(crate) fn decode_key(encoded: &str) -> CryptoResult<[u8; KEY_SIZE]> {
    let mut bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    if bytes.len() != KEY_SIZE {
        let actual = bytes.len();
        bytes.zeroize();
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual,
        });
    }

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&bytes);
    bytes.zeroize();
    Ok(key)
}

/// A private key, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; KEY_SIZE],
}

impl PrivateKey {
    /// Generates a fresh private key from the OS random source.
    pub fn generate() -> Self {
        let secret = crypto_box::SecretKey::generate(&mut rand::rngs::OsRng);
        Self {
            bytes: secret.to_bytes(),
        }
    }

    /// Creates a private key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Decodes a base64 private key.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        decode_key(encoded).map(Self::from_bytes)
    }

    /// Encodes the key as base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Derives the matching public key.
    pub fn public_key(&self) -> PublicKey {
        let public = self.to_secret_key().public_key();
        PublicKey::from_bytes(*public.as_bytes())
    }

    pub(crate) fn to_secret_key(&self) -> crypto_box::SecretKey {
        crypto_box::SecretKey::from(self.bytes)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        crate::hash::constant_time_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for PrivateKey {}

/// A public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; KEY_SIZE],
}

impl PublicKey {
    /// Creates a public key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Decodes a base64 public key.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        decode_key(encoded).map(Self::from_bytes)
    }

    /// Encodes the key as base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub(crate) fn to_box_key(self) -> crypto_box::PublicKey {
        crypto_box::PublicKey::from(self.bytes)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// A private key together with its public key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generates a fresh key pair.
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::generate())
    }

    /// Builds a key pair from an existing private key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }
}

/// Derives the base64 public key for a base64 private key.
pub fn public_key_for(private_key: &str) -> CryptoResult<String> {
    Ok(PrivateKey::from_base64(private_key)?.public_key().to_base64())
}

/// Produces a fresh random public identifier, suitable as a nonce or a
/// session label.
///
/// The value is the base64 public key of a newly generated key pair whose
/// private half is discarded.
pub fn generate_entropy() -> String {
    KeyPair::generate().public_key().to_base64()
}
