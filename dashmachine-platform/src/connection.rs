//! Platform sessions with bounded connect retry.
//!
//! A [`Connection`] is owned by exactly one logical operation. Connecting
//! and disconnecting take `&mut self`, so a connection cannot be shared
//! across concurrent operations.

use crate::client::{AccountSeed, ClientFactory, ClientOptions, PlatformClient};
use crate::error::{ClientError, PlatformError, PlatformResult};
use dashmachine_types::ContractId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of connect attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection parameters, minus the account seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Network to connect to.
    pub network: String,
    /// Named contract bindings.
    pub apps: BTreeMap<String, ContractId>,
    /// Seed endpoints.
    pub seeds: Vec<String>,
    /// Maximum connect attempts.
    pub max_retries: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            network: "testnet".to_string(),
            apps: BTreeMap::new(),
            seeds: Vec::new(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ConnectionConfig {
    /// Binds a contract under an application name.
    #[must_use]
    pub fn with_app(mut self, name: impl Into<String>, contract_id: ContractId) -> Self {
        self.apps.insert(name.into(), contract_id);
        self
    }

    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    #[must_use]
    pub fn with_seeds(mut self, seeds: Vec<String>) -> Self {
        self.seeds = seeds;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// A session with the platform, scoped to one account.
pub struct Connection {
    config: ConnectionConfig,
    account_seed: AccountSeed,
    factory: Arc<dyn ClientFactory>,
    client: Option<Box<dyn PlatformClient>>,
    state: ConnectionState,
    connect_tries: u32,
}

impl Connection {
    /// Creates a disconnected connection.
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        config: ConnectionConfig,
        account_seed: AccountSeed,
    ) -> Self {
        debug!(network = %config.network, apps = config.apps.len(), "creating connection");
        Self {
            config,
            account_seed,
            factory,
            client: None,
            state: ConnectionState::Disconnected,
            connect_tries: 0,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Failed attempts in the current connect series. Zero after a
    /// successful connect.
    pub fn connect_tries(&self) -> u32 {
        self.connect_tries
    }

    /// The options handed to the client factory.
    pub fn connection_options(&self) -> ClientOptions {
        ClientOptions {
            network: self.config.network.clone(),
            account_seed: self.account_seed.clone(),
            apps: self.config.apps.clone(),
            seeds: self.config.seeds.clone(),
        }
    }

    /// Contract bound under `app`.
    pub fn contract_id(&self, app: &str) -> PlatformResult<&ContractId> {
        self.config
            .apps
            .get(app)
            .ok_or_else(|| PlatformError::UnknownApp(app.to_string()))
    }

    /// Document locator for a document type of a bound app.
    pub fn locator(&self, app: &str, document_type: &str) -> PlatformResult<String> {
        self.contract_id(app)?;
        Ok(format!("{app}.{document_type}"))
    }

    /// The live session.
    pub fn client(&self) -> PlatformResult<&dyn PlatformClient> {
        self.client.as_deref().ok_or(PlatformError::NotConnected)
    }

    /// Establishes the session, retrying up to `max_retries` attempts.
    ///
    /// Returns the last client error once attempts are exhausted. Already
    /// connected instances return immediately.
    pub async fn connect(&mut self) -> PlatformResult<()> {
        if self.is_connected() {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        let max_attempts = self.config.max_retries.max(1);
        let options = self.connection_options();

        let mut attempt = 1;
        loop {
            debug!(network = %self.config.network, attempt, "connecting");
            match self.open_session(&options).await {
                Ok(client) => {
                    info!(network = %self.config.network, attempts = attempt, "connected");
                    self.client = Some(client);
                    self.state = ConnectionState::Connected;
                    self.connect_tries = 0;
                    return Ok(());
                }
                Err(e) => {
                    self.connect_tries = attempt;
                    if attempt >= max_attempts {
                        warn!(attempts = attempt, error = %e, "unable to connect");
                        self.state = ConnectionState::Disconnected;
                        return Err(PlatformError::Connection {
                            attempts: attempt,
                            source: e,
                        });
                    }
                    warn!(attempt, max_attempts, error = %e, "connect failed, retrying");
                    attempt += 1;
                }
            }
        }
    }

    async fn open_session(
        &self,
        options: &ClientOptions,
    ) -> Result<Box<dyn PlatformClient>, ClientError> {
        let client = self.factory.create(options).await?;
        if let Err(e) = client.is_ready().await {
            if let Err(close_err) = client.disconnect().await {
                debug!(error = %close_err, "closing half-open session failed");
            }
            return Err(e);
        }
        Ok(client)
    }

    /// Releases the session.
    ///
    /// The handle is dropped even when the client reports a failure; the
    /// failure is logged and returned.
    pub async fn disconnect(&mut self) -> PlatformResult<()> {
        let Some(client) = self.client.take() else {
            return Err(PlatformError::NotConnected);
        };
        self.state = ConnectionState::Disconnected;

        match client.disconnect().await {
            Ok(()) => {
                debug!(network = %self.config.network, "disconnected");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "disconnect failed");
                Err(PlatformError::Disconnect(e))
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("account_seed", &self.account_seed)
            .field("state", &self.state)
            .field("connect_tries", &self.connect_tries)
            .finish()
    }
}
