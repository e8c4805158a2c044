//! Platform client abstraction.
//!
//! The ledger client is an external collaborator. This module defines the
//! surface dashmachine needs from it, so the connection, document and name
//! layers work against any backend (a real network client, or the in-memory
//! [`mock`](crate::mock) platform in tests).

use crate::error::ClientResult;
use async_trait::async_trait;
use dashmachine_types::{ContractId, Document, DocumentBatch, DocumentQuery, Identity, IdentityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Seed material (mnemonic) of the account a session operates as.
///
/// Redacted in `Debug` and never serialized.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccountSeed(String);

impl AccountSeed {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    /// Returns the seed for handing to a client. Do not log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountSeed([REDACTED])")
    }
}

impl From<&str> for AccountSeed {
    fn from(seed: &str) -> Self {
        Self::new(seed)
    }
}

impl From<String> for AccountSeed {
    fn from(seed: String) -> Self {
        Self(seed)
    }
}

/// Derivation path of an identity signing key within the connected account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeyPath {
    /// Index of the identity within the account.
    pub identity_index: u32,
    /// Index of the key within the identity.
    pub key_index: u32,
}

impl fmt::Display for SigningKeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "identity/{}/key/{}", self.identity_index, self.key_index)
    }
}

/// Everything a [`ClientFactory`] needs to build a session.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Network to connect to (e.g. `testnet`).
    pub network: String,
    /// Account to operate as.
    pub account_seed: AccountSeed,
    /// Named contract bindings, used to resolve locators like `dpns.domain`.
    pub apps: BTreeMap<String, ContractId>,
    /// Seed endpoints for peer discovery.
    pub seeds: Vec<String>,
}

/// A live session with the platform.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Resolves once the session can serve requests.
    async fn is_ready(&self) -> ClientResult<()>;

    /// Tears the session down.
    async fn disconnect(&self) -> ClientResult<()>;

    /// Fetches an identity. `Ok(None)` if it does not exist.
    async fn get_identity(&self, id: &IdentityId) -> ClientResult<Option<Identity>>;

    /// Queries documents by locator (`<app>.<document type>`).
    async fn query_documents(
        &self,
        locator: &str,
        query: &DocumentQuery,
    ) -> ClientResult<Vec<Document>>;

    /// Builds (but does not broadcast) a document owned by `identity`.
    async fn create_document(
        &self,
        contract_id: &ContractId,
        document_type: &str,
        identity: &Identity,
        data: serde_json::Value,
    ) -> ClientResult<Document>;

    /// Signs and broadcasts a batch as `identity`. Returns the confirmed batch.
    async fn broadcast_documents(
        &self,
        batch: &DocumentBatch,
        identity: &Identity,
    ) -> ClientResult<DocumentBatch>;

    /// Returns the account's identity signing key at `path`, base64-encoded.
    async fn account_signing_key(&self, path: &SigningKeyPath) -> ClientResult<Zeroizing<String>>;
}

/// Builds platform sessions from options.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Creates a session. The session may still need [`PlatformClient::is_ready`].
    async fn create(&self, options: &ClientOptions) -> ClientResult<Box<dyn PlatformClient>>;
}
