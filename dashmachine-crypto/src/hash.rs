//! Double SHA-256 digests.

use sha2::{Digest as _, Sha256};
use std::fmt;

/// A double SHA-256 digest rendered as lowercase hex.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the digest, returning the hex string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes `SHA256(SHA256(message))` over the raw message bytes.
pub fn hash(message: &str) -> Digest {
    let first = Sha256::digest(message.as_bytes());
    let second = Sha256::digest(first);
    Digest(hex::encode(second))
}

/// Returns true if `digest` is the double SHA-256 of `message`.
pub fn verify(message: &str, digest: &str) -> bool {
    constant_time_eq(hash(message).as_str().as_bytes(), digest.as_bytes())
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
