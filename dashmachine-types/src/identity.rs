//! Identity records as returned by the platform.

use crate::IdentityId;
use serde::{Deserialize, Serialize};

/// Kind of key material held by an identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// 32-byte X25519 public key, base64-encoded.
    X25519,
}

/// A public key registered on an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPublicKey {
    /// Index of the key within the identity.
    pub id: u32,
    /// Key algorithm.
    pub key_type: KeyType,
    /// Key bytes in standard base64.
    pub data: String,
}

impl IdentityPublicKey {
    /// Creates an X25519 identity key.
    pub fn x25519(id: u32, data: impl Into<String>) -> Self {
        Self {
            id,
            key_type: KeyType::X25519,
            data: data.into(),
        }
    }
}

/// A network-assigned identity.
///
/// Immutable once fetched; callers hold it only for the duration of a
/// single resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The identity's id.
    pub id: IdentityId,
    /// Registered public keys, primary key first.
    pub public_keys: Vec<IdentityPublicKey>,
}

impl Identity {
    /// Creates an identity record.
    pub fn new(id: IdentityId, public_keys: Vec<IdentityPublicKey>) -> Self {
        Self { id, public_keys }
    }

    /// Returns the primary (first registered) public key, if any.
    pub fn primary_public_key(&self) -> Option<&IdentityPublicKey> {
        self.public_keys.first()
    }
}
