//! Encrypt and decrypt messages addressed by username.

use crate::config::MessagingConfig;
use crate::error::{MessagingError, MessagingResult};
use dashmachine_crypto::{self as crypto, EncryptedPayload, PrivateKey};
use dashmachine_platform::{
    AccountSeed, ClientFactory, Connection, ConnectionConfig, NameRecord, NameResolver,
};
use dashmachine_types::ContractId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Username-addressed encryption over the platform.
///
/// Every call opens its own connection as the local account and closes it
/// before returning, so one `Messenger` can serve concurrent tasks.
pub struct Messenger {
    factory: Arc<dyn ClientFactory>,
    config: MessagingConfig,
    resolver: NameResolver,
}

impl Messenger {
    pub fn new(factory: Arc<dyn ClientFactory>, config: MessagingConfig) -> Self {
        let resolver = NameResolver::new(config.naming.clone());
        Self {
            factory,
            config,
            resolver,
        }
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Encrypts `message` from `sender` to `recipient`.
    ///
    /// `sender_seed` must be the seed of the account that owns `sender`.
    /// Only the recipient's public key is looked up.
    pub async fn encrypt_for_username(
        &self,
        message: &str,
        sender: &str,
        recipient: &str,
        sender_seed: &AccountSeed,
        naming_contract: &ContractId,
    ) -> MessagingResult<EncryptedPayload> {
        let mut conn = self.connect(sender_seed, naming_contract).await?;
        let result = self.encrypt_connected(&conn, message, sender, recipient).await;
        self.release(&mut conn).await;
        result
    }

    /// Decrypts `payload` sent by `sender` to `recipient`.
    ///
    /// `recipient_seed` must be the seed of the account that owns
    /// `recipient`.
    pub async fn decrypt_for_username(
        &self,
        payload: &EncryptedPayload,
        recipient: &str,
        sender: &str,
        recipient_seed: &AccountSeed,
        naming_contract: &ContractId,
    ) -> MessagingResult<String> {
        let mut conn = self.connect(recipient_seed, naming_contract).await?;
        let result = self.decrypt_connected(&conn, payload, recipient, sender).await;
        self.release(&mut conn).await;
        result
    }

    async fn encrypt_connected(
        &self,
        conn: &Connection,
        message: &str,
        sender: &str,
        recipient: &str,
    ) -> MessagingResult<EncryptedPayload> {
        let from = self.account_record(conn, sender).await?;
        let to = self.public_record(conn, recipient).await?;

        let payload = crypto::seal(private_key(&from)?, message.as_bytes(), &to.public_key)?;
        info!(sender, recipient, "message encrypted");
        Ok(payload)
    }

    async fn decrypt_connected(
        &self,
        conn: &Connection,
        payload: &EncryptedPayload,
        recipient: &str,
        sender: &str,
    ) -> MessagingResult<String> {
        let to = self.account_record(conn, recipient).await?;
        let from = self.public_record(conn, sender).await?;

        let message = crypto::open_text(private_key(&to)?, payload, &from.public_key)?;
        info!(sender, recipient, "message decrypted");
        Ok(message)
    }

    async fn account_record(&self, conn: &Connection, username: &str) -> MessagingResult<NameRecord> {
        self.resolver
            .resolve_account_user(username, conn, &self.config.signing_key_path)
            .await?
            .ok_or_else(|| not_found(username))
    }

    async fn public_record(&self, conn: &Connection, username: &str) -> MessagingResult<NameRecord> {
        self.resolver
            .resolve_user(username, conn)
            .await?
            .ok_or_else(|| not_found(username))
    }

    async fn connect(
        &self,
        seed: &AccountSeed,
        naming_contract: &ContractId,
    ) -> MessagingResult<Connection> {
        let config = ConnectionConfig::default()
            .with_network(self.config.network.clone())
            .with_seeds(self.config.seeds.clone())
            .with_max_retries(self.config.max_connect_retries)
            .with_app(self.config.naming.app_name.clone(), naming_contract.clone());

        let mut conn = Connection::new(Arc::clone(&self.factory), config, seed.clone());
        conn.connect().await?;
        Ok(conn)
    }

    async fn release(&self, conn: &mut Connection) {
        if let Err(e) = conn.disconnect().await {
            warn!(error = %e, "failed to close connection");
        } else {
            debug!("connection closed");
        }
    }
}

impl std::fmt::Debug for Messenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messenger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn private_key(record: &NameRecord) -> MessagingResult<&PrivateKey> {
    record
        .private_key
        .as_ref()
        .ok_or_else(|| MessagingError::MissingPrivateKey {
            username: record.username.clone(),
        })
}

fn not_found(username: &str) -> MessagingError {
    MessagingError::NameNotFound {
        username: username.to_string(),
    }
}
