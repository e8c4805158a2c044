//! Username resolution against the name registry.
//!
//! A registration is a `domain` document in the naming contract whose
//! normalized label is the lower-cased username and whose
//! `records.identityId` points at the owning identity. The registry is
//! expected to hold at most one registration per name; finding more is a
//! data-integrity fault and is reported, never disambiguated.

use crate::client::SigningKeyPath;
use crate::connection::Connection;
use crate::documents;
use crate::error::{PlatformError, PlatformResult};
use dashmachine_crypto::{PrivateKey, PublicKey};
use dashmachine_types::{Document, DocumentId, DocumentQuery, Identity, IdentityId};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

/// Field holding the normalized parent domain.
pub const PARENT_DOMAIN_FIELD: &str = "normalizedParentDomainName";
/// Field holding the normalized label (the lower-cased username).
pub const LABEL_FIELD: &str = "normalizedLabel";
/// Field holding the registered identity id.
pub const IDENTITY_FIELD: &str = "records.identityId";

/// Where registrations live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// App name the naming contract is bound under.
    pub app_name: String,
    /// Document type of registrations.
    pub document_type: String,
    /// Parent domain all usernames are registered under.
    pub parent_domain: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            app_name: "dpns".to_string(),
            document_type: "domain".to_string(),
            parent_domain: "dash".to_string(),
        }
    }
}

/// A resolved username.
///
/// `private_key` is present only when the record belongs to the account the
/// connection operates as. It is omitted from the serialized form when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRecord {
    /// Id of the registration document.
    pub id: DocumentId,
    pub username: String,
    pub identity_id: IdentityId,
    pub identity: Identity,
    #[serde(serialize_with = "serialize_public_key")]
    pub public_key: PublicKey,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_private_key"
    )]
    pub private_key: Option<PrivateKey>,
}

impl NameRecord {
    /// Returns the record with the account's private key attached.
    #[must_use]
    pub fn with_private_key(self, private_key: PrivateKey) -> Self {
        Self {
            private_key: Some(private_key),
            ..self
        }
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn serialize_public_key<S: Serializer>(key: &PublicKey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&key.to_base64())
}

fn serialize_private_key<S: Serializer>(
    key: &Option<PrivateKey>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match key {
        Some(key) => s.serialize_some(&key.to_base64()),
        None => s.serialize_none(),
    }
}

/// Resolves usernames to identities and their key material.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    config: NamingConfig,
}

impl NameResolver {
    pub fn new(config: NamingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NamingConfig {
        &self.config
    }

    /// The registry query for a username.
    pub fn query_for(&self, username: &str) -> DocumentQuery {
        DocumentQuery::new()
            .where_eq(PARENT_DOMAIN_FIELD, self.config.parent_domain.as_str())
            .where_eq(LABEL_FIELD, username.to_lowercase())
            .start_at(1)
    }

    /// Resolves a username to its identity and primary public key.
    ///
    /// Returns `Ok(None)` when the name is not registered and
    /// [`PlatformError::AmbiguousName`] when it is registered more than once.
    pub async fn resolve_user(
        &self,
        username: &str,
        conn: &Connection,
    ) -> PlatformResult<Option<NameRecord>> {
        debug!(username, "resolving name");
        let locator = conn.locator(&self.config.app_name, &self.config.document_type)?;
        let mut found = documents::find(conn, &locator, &self.query_for(username)).await?;

        match found.len() {
            0 => {
                debug!(username, "name not registered");
                Ok(None)
            }
            1 => {
                let registration = found.remove(0);
                self.record_from(username, registration, conn).await.map(Some)
            }
            count => Err(PlatformError::AmbiguousName {
                name: username.to_lowercase(),
                count,
            }),
        }
    }

    /// Resolves a username that belongs to the connected account, attaching
    /// the account's signing key.
    ///
    /// Fails with [`PlatformError::AccountMismatch`] if the account key at
    /// `path` is not the identity's primary key.
    pub async fn resolve_account_user(
        &self,
        username: &str,
        conn: &Connection,
        path: &SigningKeyPath,
    ) -> PlatformResult<Option<NameRecord>> {
        let Some(record) = self.resolve_user(username, conn).await? else {
            return Ok(None);
        };

        let encoded = conn.client()?.account_signing_key(path).await?;
        let private_key = PrivateKey::from_base64(&encoded)?;

        if private_key.public_key() != record.public_key {
            return Err(PlatformError::AccountMismatch {
                username: username.to_string(),
                identity_id: record.identity_id,
            });
        }

        debug!(username, %path, "account key attached");
        Ok(Some(record.with_private_key(private_key)))
    }

    async fn record_from(
        &self,
        username: &str,
        registration: Document,
        conn: &Connection,
    ) -> PlatformResult<NameRecord> {
        let identity_id = registration
            .field(IDENTITY_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                PlatformError::Malformed(format!(
                    "registration {} has no {IDENTITY_FIELD}",
                    registration.id
                ))
            })?;
        let identity_id = IdentityId::parse(identity_id)
            .map_err(|e| PlatformError::Malformed(e.to_string()))?;

        let identity = conn
            .client()?
            .get_identity(&identity_id)
            .await
            .map_err(PlatformError::Query)?
            .ok_or_else(|| PlatformError::IdentityNotFound(identity_id.clone()))?;

        let key = identity
            .primary_public_key()
            .ok_or_else(|| PlatformError::MissingPublicKey(identity_id.clone()))?;
        let public_key = PublicKey::from_base64(&key.data)?;

        info!(username, identity = %identity_id, "name resolved");
        Ok(NameRecord {
            id: registration.id,
            username: username.to_string(),
            identity_id,
            identity,
            public_key,
            private_key: None,
        })
    }
}
