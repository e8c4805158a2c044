mod common;

use common::{config, connection_for, init_tracing};
use dashmachine_platform::mock::MockPlatform;
use dashmachine_platform::{
    AccountSeed, ClientError, Connection, ConnectionState, PlatformError, DEFAULT_MAX_RETRIES,
};
use dashmachine_types::ContractId;
use std::sync::Arc;

fn make_connection(platform: &MockPlatform) -> Connection {
    Connection::new(Arc::new(platform.clone()), config(), AccountSeed::new("abandon ability"))
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_connection_is_disconnected() {
    let conn = make_connection(&MockPlatform::new());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(!conn.is_connected());
    assert_eq!(conn.connect_tries(), 0);
    assert_eq!(conn.config().max_retries, DEFAULT_MAX_RETRIES);
}

#[test]
fn connection_options_carry_config_and_seed() {
    let conn = make_connection(&MockPlatform::new());
    let options = conn.connection_options();
    assert_eq!(options.network, "testnet");
    assert_eq!(options.account_seed.expose_secret(), "abandon ability");
    assert_eq!(
        options.apps.get("dpns"),
        Some(&MockPlatform::naming_contract())
    );
}

#[test]
fn debug_output_redacts_seed() {
    let conn = make_connection(&MockPlatform::new());
    let debug = format!("{conn:?}");
    assert!(!debug.contains("abandon"));
    assert!(debug.contains("REDACTED"));
}

#[test]
fn locator_requires_bound_app() {
    let conn = make_connection(&MockPlatform::new());
    assert_eq!(conn.locator("dpns", "domain").unwrap(), "dpns.domain");
    assert!(matches!(
        conn.locator("wallet", "note"),
        Err(PlatformError::UnknownApp(app)) if app == "wallet"
    ));
}

#[test]
fn client_before_connect_is_not_connected() {
    let conn = make_connection(&MockPlatform::new());
    assert!(matches!(conn.client(), Err(PlatformError::NotConnected)));
}

// ── Connect ──────────────────────────────────────────────────────

#[tokio::test]
async fn connect_succeeds_first_try() {
    init_tracing();
    let platform = MockPlatform::new();
    let mut conn = make_connection(&platform);

    conn.connect().await.unwrap();

    assert!(conn.is_connected());
    assert!(conn.client().is_ok());
    assert_eq!(conn.connect_tries(), 0);
    assert_eq!(platform.connect_attempts(), 1);
}

#[tokio::test]
async fn connect_retries_transient_failures_and_resets_counter() {
    init_tracing();
    let platform = MockPlatform::new();
    platform.fail_next_connects(2);
    let mut conn = make_connection(&platform);

    conn.connect().await.unwrap();

    assert!(conn.is_connected());
    assert_eq!(conn.connect_tries(), 0);
    assert_eq!(platform.connect_attempts(), 3);
}

#[tokio::test]
async fn connect_gives_up_after_max_retries() {
    init_tracing();
    let platform = MockPlatform::new();
    platform.fail_next_connects(u32::MAX);
    let mut conn = make_connection(&platform);

    let err = conn.connect().await.unwrap_err();

    match err {
        PlatformError::Connection { attempts, source } => {
            assert_eq!(attempts, DEFAULT_MAX_RETRIES);
            assert!(matches!(source, ClientError::Transport(_)));
        }
        other => panic!("expected connection error, got {other:?}"),
    }
    assert_eq!(platform.connect_attempts(), DEFAULT_MAX_RETRIES);
    assert_eq!(conn.connect_tries(), DEFAULT_MAX_RETRIES);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn connect_honours_configured_retries() {
    let platform = MockPlatform::new();
    platform.fail_next_connects(u32::MAX);
    let mut conn = Connection::new(
        Arc::new(platform.clone()),
        config().with_max_retries(5),
        AccountSeed::new("seed"),
    );

    assert!(conn.connect().await.is_err());
    assert_eq!(platform.connect_attempts(), 5);
}

#[tokio::test]
async fn each_connect_call_starts_a_fresh_series() {
    let platform = MockPlatform::new();
    platform.fail_next_connects(DEFAULT_MAX_RETRIES);
    let mut conn = make_connection(&platform);

    assert!(conn.connect().await.is_err());
    conn.connect().await.unwrap();

    assert_eq!(platform.connect_attempts(), DEFAULT_MAX_RETRIES + 1);
    assert_eq!(conn.connect_tries(), 0);
}

#[tokio::test]
async fn unready_session_is_retried_and_closed() {
    let platform = MockPlatform::new();
    platform.fail_next_ready_checks(1);
    let mut conn = make_connection(&platform);

    conn.connect().await.unwrap();

    assert_eq!(platform.connect_attempts(), 2);
    // The half-open session from the first attempt is released.
    assert_eq!(platform.disconnect_calls(), 1);
}

#[tokio::test]
async fn connect_when_connected_is_noop() {
    let platform = MockPlatform::new();
    let mut conn = make_connection(&platform);
    conn.connect().await.unwrap();
    conn.connect().await.unwrap();
    assert_eq!(platform.connect_attempts(), 1);
}

// ── Disconnect ───────────────────────────────────────────────────

#[tokio::test]
async fn disconnect_releases_session() {
    let platform = MockPlatform::new();
    let mut conn = make_connection(&platform);
    conn.connect().await.unwrap();

    conn.disconnect().await.unwrap();

    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(matches!(conn.client(), Err(PlatformError::NotConnected)));
    assert_eq!(platform.disconnect_calls(), 1);
}

#[tokio::test]
async fn disconnect_without_session_fails() {
    let mut conn = make_connection(&MockPlatform::new());
    assert!(matches!(
        conn.disconnect().await,
        Err(PlatformError::NotConnected)
    ));
}

#[tokio::test]
async fn failed_disconnect_still_drops_handle() {
    let platform = MockPlatform::new();
    platform.fail_disconnects(true);
    let mut conn = make_connection(&platform);
    conn.connect().await.unwrap();

    let err = conn.disconnect().await.unwrap_err();

    assert!(matches!(err, PlatformError::Disconnect(_)));
    assert!(!conn.is_connected());
    assert!(matches!(conn.client(), Err(PlatformError::NotConnected)));
}

#[tokio::test]
async fn registered_user_connects_with_own_seed() {
    let platform = MockPlatform::new();
    let alice = platform.register_user("alice");
    let mut conn = connection_for(&platform, &alice);

    conn.connect().await.unwrap();

    assert_eq!(
        conn.connection_options().account_seed.expose_secret(),
        alice.seed
    );
    assert_eq!(
        conn.contract_id("dpns").unwrap(),
        &ContractId::parse(dashmachine_platform::mock::MOCK_NAMING_CONTRACT).unwrap()
    );
}
