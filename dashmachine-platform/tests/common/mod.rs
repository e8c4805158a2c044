#![allow(dead_code)]

use dashmachine_platform::mock::{MockPlatform, MockUser};
use dashmachine_platform::{Connection, ConnectionConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config() -> ConnectionConfig {
    ConnectionConfig::default().with_app("dpns", MockPlatform::naming_contract())
}

pub fn connection_for(platform: &MockPlatform, user: &MockUser) -> Connection {
    Connection::new(
        Arc::new(platform.clone()),
        config(),
        user.seed.as_str().into(),
    )
}

pub async fn connected(platform: &MockPlatform, user: &MockUser) -> Connection {
    let mut conn = connection_for(platform, user);
    conn.connect().await.unwrap();
    conn
}
