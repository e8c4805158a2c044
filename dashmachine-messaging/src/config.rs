//! Messaging configuration.

use crate::error::MessagingResult;
use dashmachine_platform::{NamingConfig, SigningKeyPath, DEFAULT_MAX_RETRIES};
use serde::{Deserialize, Serialize};

/// Settings shared by every messaging call. Account seeds are supplied per
/// call and never live here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagingConfig {
    /// Network to connect to.
    pub network: String,
    /// Seed endpoints.
    pub seeds: Vec<String>,
    /// Where username registrations live.
    pub naming: NamingConfig,
    /// Account key used as the local party's private key.
    pub signing_key_path: SigningKeyPath,
    /// Connect attempts per call.
    pub max_connect_retries: u32,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            network: "testnet".to_string(),
            seeds: Vec::new(),
            naming: NamingConfig::default(),
            signing_key_path: SigningKeyPath::default(),
            max_connect_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl MessagingConfig {
    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> MessagingResult<Self> {
        Ok(serde_json::from_str(json)?)
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
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn with_max_connect_retries(mut self, retries: u32) -> Self {
        self.max_connect_retries = retries;
        self
    }
}
