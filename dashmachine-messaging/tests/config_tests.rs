use dashmachine_messaging::{MessagingConfig, MessagingError};
use dashmachine_platform::{NamingConfig, SigningKeyPath, DEFAULT_MAX_RETRIES};
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = MessagingConfig::default();
    assert_eq!(config.network, "testnet");
    assert!(config.seeds.is_empty());
    assert_eq!(config.naming, NamingConfig::default());
    assert_eq!(config.signing_key_path, SigningKeyPath::default());
    assert_eq!(config.max_connect_retries, DEFAULT_MAX_RETRIES);
}

#[test]
fn from_json_fills_missing_fields() {
    let config = MessagingConfig::from_json(
        r#"{
            "network": "mainnet",
            "seeds": ["seed-1.example.org:1443"],
            "naming": { "parent_domain": "dash" },
            "maxConnectRetries": 5
        }"#,
    )
    .unwrap();

    assert_eq!(
        config,
        MessagingConfig::default()
            .with_network("mainnet")
            .with_seeds(vec!["seed-1.example.org:1443".to_string()])
            .with_max_connect_retries(5)
    );
}

#[test]
fn from_json_rejects_invalid_input() {
    let err = MessagingConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, MessagingError::Config(_)));
}

#[test]
fn json_round_trip() {
    let config = MessagingConfig::default().with_naming(NamingConfig {
        app_name: "names".to_string(),
        ..NamingConfig::default()
    });
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(MessagingConfig::from_json(&json).unwrap(), config);
}
