//! Error types for the platform layer.

use dashmachine_crypto::CryptoError;
use dashmachine_types::IdentityId;
use thiserror::Error;

/// Result type for calls into a platform client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors reported by the platform client itself.
///
/// These are the transient, network-level failures the platform layer
/// retries.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Transport failure (connection reset, DNS, TLS...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request reached the network and was rejected.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The client is not ready to serve requests.
    #[error("client unavailable: {0}")]
    Unavailable(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors that can occur in platform operations.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Session could not be established.
    #[error("connection failed after {attempts} attempts: {source}")]
    Connection { attempts: u32, source: ClientError },

    /// The operation requires a connected session.
    #[error("not connected")]
    NotConnected,

    /// Tearing down the session failed.
    #[error("disconnect failed: {0}")]
    Disconnect(ClientError),

    /// Document lookup failed.
    #[error("document query failed: {0}")]
    Query(ClientError),

    /// Document write failed after all retries.
    #[error("document submit failed after {attempts} attempts: {source}")]
    Submit {
        attempts: u32,
        source: Box<PlatformError>,
    },

    /// A client call failed inside a larger operation.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The identity does not exist on the network.
    #[error("identity not found: {0}")]
    IdentityNotFound(IdentityId),

    /// The identity has no public key registered.
    #[error("identity {0} has no public key")]
    MissingPublicKey(IdentityId),

    /// No contract is bound under the requested application name.
    #[error("no contract bound for app {0:?}")]
    UnknownApp(String),

    /// The platform returned data that does not have the expected shape.
    #[error("malformed platform response: {0}")]
    Malformed(String),

    /// More than one registration exists for a single name.
    #[error("name {name:?} is registered {count} times")]
    AmbiguousName { name: String, count: usize },

    /// The connected account's key does not belong to the named identity.
    #[error("account key does not match identity {identity_id} of {username:?}")]
    AccountMismatch {
        username: String,
        identity_id: IdentityId,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Key material from the platform could not be used.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl PlatformError {
    /// Returns true for the kinds that the platform layer retries before
    /// surfacing: session, query and submit failures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlatformError::Connection { .. }
                | PlatformError::Query(_)
                | PlatformError::Submit { .. }
                | PlatformError::Client(_)
        )
    }
}
