//! An in-memory platform for testing.
//!
//! [`MockPlatform`] is a [`ClientFactory`] whose sessions share one store
//! of identities, documents and accounts. Failures can be injected per
//! operation, and every call is counted so tests can assert on retry and
//! cleanup behaviour.

use crate::client::{ClientFactory, ClientOptions, PlatformClient, SigningKeyPath};
use crate::error::{ClientError, ClientResult};
use crate::names::NamingConfig;
use async_trait::async_trait;
use dashmachine_crypto::KeyPair;
use dashmachine_types::{
    ContractId, Document, DocumentBatch, DocumentId, DocumentQuery, Identity, IdentityId,
    IdentityPublicKey,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use zeroize::Zeroizing;

const ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Naming contract id used by [`MockPlatform::register_user`].
pub const MOCK_NAMING_CONTRACT: &str = "DpnsContract1111111111111111111111111111111";

fn encode_id(prefix: &str, mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(ALPHABET[(n % 58) as usize]);
        n /= 58;
        if n == 0 {
            break;
        }
    }
    digits.reverse();
    format!("{prefix}{}", String::from_utf8_lossy(&digits))
}

/// A user registered through [`MockPlatform::register_user`].
#[derive(Debug, Clone)]
pub struct MockUser {
    pub username: String,
    /// Account seed that connects as this user.
    pub seed: String,
    pub identity_id: IdentityId,
    pub keys: KeyPair,
}

struct StoredDocument {
    document: Document,
    visible_at: Instant,
}

struct Account {
    signing_key: String,
}

#[derive(Default)]
struct Failures {
    connects: u32,
    ready_checks: u32,
    queries: u32,
    broadcasts: u32,
    lost_acks: u32,
    disconnects: bool,
}

#[derive(Default)]
struct Calls {
    connects: u32,
    queries: u32,
    broadcasts: u32,
    disconnects: u32,
    signing_key_requests: Vec<String>,
}

#[derive(Default)]
struct MockState {
    identities: HashMap<IdentityId, Identity>,
    documents: Vec<StoredDocument>,
    accounts: HashMap<String, Account>,
    failures: Failures,
    calls: Calls,
    visibility_delay: Duration,
    query_latency: Duration,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        encode_id(prefix, self.next_id)
    }
}

/// In-memory platform shared by every session it creates.
#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The naming contract id [`register_user`](Self::register_user) writes to.
    pub fn naming_contract() -> ContractId {
        ContractId::parse(MOCK_NAMING_CONTRACT).expect("valid mock contract id")
    }

    // ── Seeding ──────────────────────────────────────────────────

    /// Registers an identity with the given primary public key (base64).
    pub fn add_identity(&self, public_keys: Vec<String>) -> IdentityId {
        let mut state = self.state();
        let id = IdentityId::parse(&state.next_id("id")).expect("valid mock id");
        let keys = public_keys
            .into_iter()
            .enumerate()
            .map(|(i, data)| IdentityPublicKey::x25519(i as u32, data))
            .collect();
        state
            .identities
            .insert(id.clone(), Identity::new(id.clone(), keys));
        id
    }

    /// Makes `seed` connect as an account holding `signing_key` (base64).
    pub fn add_account(&self, seed: &str, signing_key: String) {
        self.state()
            .accounts
            .insert(seed.to_string(), Account { signing_key });
    }

    /// Stores a document, visible immediately.
    pub fn insert_document(&self, document: Document) {
        self.state().documents.push(StoredDocument {
            document,
            visible_at: Instant::now(),
        });
    }

    /// Stores a name registration for `label` pointing at `identity_id`.
    pub fn add_name_document(&self, label: &str, identity_id: &IdentityId) -> DocumentId {
        let naming = NamingConfig::default();
        let id = DocumentId::parse(&self.state().next_id("doc")).expect("valid mock id");
        let document = Document {
            contract_id: Self::naming_contract(),
            document_type: naming.document_type,
            id: id.clone(),
            owner_id: identity_id.clone(),
            data: name_data(&naming.parent_domain, label, identity_id),
        };
        self.insert_document(document);
        id
    }

    /// Creates a key pair, identity, account and name registration.
    pub fn register_user(&self, username: &str) -> MockUser {
        let keys = KeyPair::generate();
        let identity_id = self.add_identity(vec![keys.public_key().to_base64()]);
        let seed = format!("seed words of {username}");
        self.add_account(&seed, keys.private_key().to_base64());
        self.add_name_document(username, &identity_id);
        MockUser {
            username: username.to_string(),
            seed,
            identity_id,
            keys,
        }
    }

    // ── Failure injection ────────────────────────────────────────

    /// Fails the next `n` session creations.
    pub fn fail_next_connects(&self, n: u32) {
        self.state().failures.connects = n;
    }

    /// Fails the next `n` readiness checks.
    pub fn fail_next_ready_checks(&self, n: u32) {
        self.state().failures.ready_checks = n;
    }

    /// Fails the next `n` document queries.
    pub fn fail_next_queries(&self, n: u32) {
        self.state().failures.queries = n;
    }

    /// Fails the next `n` broadcasts before anything is written.
    pub fn fail_next_broadcasts(&self, n: u32) {
        self.state().failures.broadcasts = n;
    }

    /// Writes the next `n` broadcasts but reports a timeout to the caller.
    pub fn lose_next_broadcast_acks(&self, n: u32) {
        self.state().failures.lost_acks = n;
    }

    /// Makes every disconnect report an error.
    pub fn fail_disconnects(&self, fail: bool) {
        self.state().failures.disconnects = fail;
    }

    /// Broadcast documents become visible to queries only after `delay`.
    pub fn set_visibility_delay(&self, delay: Duration) {
        self.state().visibility_delay = delay;
    }

    /// Every document query takes `latency` before it answers or fails.
    pub fn set_query_latency(&self, latency: Duration) {
        self.state().query_latency = latency;
    }

    // ── Inspection ───────────────────────────────────────────────

    pub fn connect_attempts(&self) -> u32 {
        self.state().calls.connects
    }

    pub fn query_calls(&self) -> u32 {
        self.state().calls.queries
    }

    pub fn broadcast_calls(&self) -> u32 {
        self.state().calls.broadcasts
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.state().calls.disconnects
    }

    /// Seeds of the accounts whose signing key was requested, in order.
    pub fn signing_key_requests(&self) -> Vec<String> {
        self.state().calls.signing_key_requests.clone()
    }

    /// All stored documents of a contract and type, visible or not.
    pub fn stored_documents(&self, contract_id: &ContractId, document_type: &str) -> Vec<Document> {
        self.state()
            .documents
            .iter()
            .map(|s| &s.document)
            .filter(|d| &d.contract_id == contract_id && d.document_type == document_type)
            .cloned()
            .collect()
    }
}

fn name_data(parent_domain: &str, label: &str, identity_id: &IdentityId) -> Value {
    json!({
        "label": label,
        "normalizedParentDomainName": parent_domain,
        "normalizedLabel": label.to_lowercase(),
        "records": { "identityId": identity_id.as_str() },
    })
}

#[async_trait]
impl ClientFactory for MockPlatform {
    async fn create(&self, options: &ClientOptions) -> ClientResult<Box<dyn PlatformClient>> {
        let mut state = self.state();
        state.calls.connects += 1;
        if state.failures.connects > 0 {
            state.failures.connects -= 1;
            return Err(ClientError::Transport("connection refused by seed".into()));
        }
        Ok(Box::new(MockClient {
            platform: self.clone(),
            options: options.clone(),
        }))
    }
}

/// A session against a [`MockPlatform`].
pub struct MockClient {
    platform: MockPlatform,
    options: ClientOptions,
}

impl MockClient {
    fn contract_for(&self, locator: &str) -> ClientResult<(ContractId, String)> {
        let (app, document_type) = locator
            .split_once('.')
            .ok_or_else(|| ClientError::Rejected(format!("invalid locator {locator:?}")))?;
        let contract = self
            .options
            .apps
            .get(app)
            .ok_or_else(|| ClientError::Rejected(format!("unknown app {app:?}")))?;
        Ok((contract.clone(), document_type.to_string()))
    }
}

#[async_trait]
impl PlatformClient for MockClient {
    async fn is_ready(&self) -> ClientResult<()> {
        let mut state = self.platform.state();
        if state.failures.ready_checks > 0 {
            state.failures.ready_checks -= 1;
            return Err(ClientError::Unavailable("syncing".into()));
        }
        Ok(())
    }

    async fn disconnect(&self) -> ClientResult<()> {
        let mut state = self.platform.state();
        state.calls.disconnects += 1;
        if state.failures.disconnects {
            return Err(ClientError::Transport("socket already closed".into()));
        }
        Ok(())
    }

    async fn get_identity(&self, id: &IdentityId) -> ClientResult<Option<Identity>> {
        Ok(self.platform.state().identities.get(id).cloned())
    }

    async fn query_documents(
        &self,
        locator: &str,
        query: &DocumentQuery,
    ) -> ClientResult<Vec<Document>> {
        let (contract_id, document_type) = self.contract_for(locator)?;
        let latency = self.platform.state().query_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.platform.state();
        state.calls.queries += 1;
        if state.failures.queries > 0 {
            state.failures.queries -= 1;
            return Err(ClientError::Timeout);
        }

        let now = Instant::now();
        let candidates = state
            .documents
            .iter()
            .filter(|s| s.visible_at <= now)
            .map(|s| &s.document)
            .filter(|d| d.contract_id == contract_id && d.document_type == document_type);
        Ok(query.apply(candidates))
    }

    async fn create_document(
        &self,
        contract_id: &ContractId,
        document_type: &str,
        identity: &Identity,
        data: Value,
    ) -> ClientResult<Document> {
        let id = self.platform.state().next_id("doc");
        Ok(Document {
            contract_id: contract_id.clone(),
            document_type: document_type.to_string(),
            id: DocumentId::parse(&id).map_err(|e| ClientError::Rejected(e.to_string()))?,
            owner_id: identity.id.clone(),
            data,
        })
    }

    async fn broadcast_documents(
        &self,
        batch: &DocumentBatch,
        identity: &Identity,
    ) -> ClientResult<DocumentBatch> {
        let mut state = self.platform.state();
        state.calls.broadcasts += 1;
        if state.failures.broadcasts > 0 {
            state.failures.broadcasts -= 1;
            return Err(ClientError::Transport("broadcast dropped".into()));
        }
        if batch.create.iter().any(|d| d.owner_id != identity.id) {
            return Err(ClientError::Rejected("document not owned by signer".into()));
        }

        let visible_at = Instant::now() + state.visibility_delay;
        for document in &batch.create {
            state.documents.push(StoredDocument {
                document: document.clone(),
                visible_at,
            });
        }

        if state.failures.lost_acks > 0 {
            state.failures.lost_acks -= 1;
            return Err(ClientError::Timeout);
        }
        Ok(batch.clone())
    }

    async fn account_signing_key(&self, path: &SigningKeyPath) -> ClientResult<Zeroizing<String>> {
        let seed = self.options.account_seed.expose_secret();
        let mut state = self.platform.state();
        state.calls.signing_key_requests.push(seed.to_string());
        if *path != SigningKeyPath::default() {
            return Err(ClientError::Rejected(format!("no key at {path}")));
        }
        state
            .accounts
            .get(seed)
            .map(|a| Zeroizing::new(a.signing_key.clone()))
            .ok_or_else(|| ClientError::Rejected("unknown account".into()))
    }
}
