//! Cryptographic primitives for dashmachine.
//!
//! - Authenticated public-key encryption between a sender and a recipient
//!   (X25519 + XSalsa20-Poly1305)
//! - Double SHA-256 hashing and verification
//! - Key pair generation and fresh random identifiers
//!
//! Keys and payloads are exchanged as standard base64; digests as lowercase
//! hex. Nothing here performs I/O.

mod cipher;
mod error;
mod hash;
mod key;

pub use cipher::{
    decrypt, encrypt, open, open_text, seal, EncryptedPayload, NONCE_SIZE, PAYLOAD_VERSION, TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use hash::{hash, verify, Digest};
pub use key::{generate_entropy, public_key_for, KeyPair, PrivateKey, PublicKey, KEY_SIZE};
