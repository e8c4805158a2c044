//! Core record types for dashmachine.
//!
//! This crate defines the plain values exchanged with the platform:
//! - Identifiers for identities, contracts and documents
//! - Identity records and their public keys
//! - Documents, document batches and document queries
//!
//! Everything here is an immutable value. Network access lives in
//! `dashmachine-platform`; key handling lives in `dashmachine-crypto`.

mod document;
mod identity;
mod ids;

pub use document::{Document, DocumentBatch, DocumentQuery, NewDocument, WhereClause, WhereOperator};
pub use identity::{Identity, IdentityPublicKey, KeyType};
pub use ids::{ContractId, DocumentId, IdentityId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid {kind} id: {reason}")]
    InvalidId { kind: &'static str, reason: String },
}
