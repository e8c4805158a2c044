//! Error types for messaging.

use dashmachine_crypto::CryptoError;
use dashmachine_platform::PlatformError;
use thiserror::Error;

/// Result type for messaging operations.
pub type MessagingResult<T> = Result<T, MessagingError>;

/// Errors that can occur while encrypting or decrypting for a username.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Connecting, resolving or talking to the platform failed.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Encryption or decryption failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The username is not registered.
    #[error("username not found: {username}")]
    NameNotFound { username: String },

    /// The account's signing key was not available for the username.
    #[error("no private key available for {username}")]
    MissingPrivateKey { username: String },

    /// Configuration could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
