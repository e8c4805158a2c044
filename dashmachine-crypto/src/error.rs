//! Error types for the crypto layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
///
/// None of these are transient: retrying the same input cannot succeed.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material is not valid base64.
    #[error("invalid key encoding: {0}")]
    InvalidKey(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key pair or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The payload container could not be parsed.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The payload was produced by an unknown container version.
    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(u8),
}
