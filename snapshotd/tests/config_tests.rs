//! Integration tests for configuration loading and validation

use std::fs;
use tempfile::TempDir;

use snapshotd::config::{Config, ConfigManager};
use snapshotd::errors::ConfigError;

const VALID_CONFIG: &str = r#"
alarm_webhook_url = "https://hooks.example.com/alerts"

[storage_defaults]
access_key = "global-access"
secret_key = "global-secret"
endpoint = "https://s3.example.com"

[nodes.cosmoshub]
enabled = true

[nodes.cosmoshub.node]
home_dir = "/home/cosmos/.gaia"
chain_id = "cosmoshub-4"

[nodes.cosmoshub.snapshot]
interval_seconds = 3600
retention = 5
staging_dir = "/var/lib/snapshotd"

[nodes.cosmoshub.storage]
bucket = "chain-snapshots"
prefix = "snapshots/cosmoshub"

[nodes.osmosis]
enabled = false

[nodes.osmosis.node]
home_dir = "/home/osmosis/.osmosisd"
chain_id = "osmosis-1"

[nodes.osmosis.snapshot]
staging_dir = "/var/lib/snapshotd"

[nodes.osmosis.storage]
bucket = "chain-snapshots"
prefix = "snapshots/osmosis"
access_key = "osmosis-access"
"#;

fn parse(content: &str) -> Config {
    toml::from_str(content).expect("Failed to parse config")
}

#[test]
fn test_parse_applies_defaults() {
    let config = parse(VALID_CONFIG);

    let osmosis = &config.nodes["osmosis"];
    assert_eq!(osmosis.node.data_dir, "data");
    assert_eq!(osmosis.snapshot.interval_seconds, 86400);
    assert_eq!(osmosis.snapshot.retention, 7);
    assert_eq!(osmosis.storage.region, "us-east-1");

    let cosmoshub = &config.nodes["cosmoshub"];
    assert_eq!(cosmoshub.snapshot.interval_seconds, 3600);
    assert_eq!(cosmoshub.snapshot.retention, 5);
}

#[test]
fn test_node_merges_storage_defaults() {
    let config = parse(VALID_CONFIG);

    let node = config.node("cosmoshub").unwrap();
    assert_eq!(node.storage.access_key.as_deref(), Some("global-access"));
    assert_eq!(node.storage.secret_key.as_deref(), Some("global-secret"));
    assert_eq!(
        node.storage.endpoint.as_deref(),
        Some("https://s3.example.com")
    );
}

#[test]
fn test_node_keeps_own_credentials_over_defaults() {
    let mut config = parse(VALID_CONFIG);
    config.nodes.get_mut("osmosis").unwrap().enabled = true;

    let node = config.node("osmosis").unwrap();
    assert_eq!(node.storage.access_key.as_deref(), Some("osmosis-access"));
    // Fields the node leaves unset still fall back.
    assert_eq!(node.storage.secret_key.as_deref(), Some("global-secret"));
}

#[test]
fn test_node_not_found() {
    let config = parse(VALID_CONFIG);
    match config.node("juno") {
        Err(ConfigError::NodeNotFound { node }) => assert_eq!(node, "juno"),
        other => panic!("Expected NodeNotFound, got {:?}", other),
    }
}

#[test]
fn test_disabled_node_is_rejected() {
    let config = parse(VALID_CONFIG);
    match config.node("osmosis") {
        Err(ConfigError::NodeDisabled { node }) => assert_eq!(node, "osmosis"),
        other => panic!("Expected NodeDisabled, got {:?}", other),
    }
}

#[test]
fn test_enabled_nodes_sorted_and_filtered() {
    let config = parse(VALID_CONFIG);
    assert_eq!(config.enabled_nodes(), vec!["cosmoshub"]);
}

#[test]
fn test_paths_and_interval() {
    let config = parse(VALID_CONFIG);
    let node = config.node("cosmoshub").unwrap();

    assert_eq!(
        node.data_path().to_string_lossy(),
        "/home/cosmos/.gaia/data"
    );
    assert_eq!(
        node.staging_path().to_string_lossy(),
        "/var/lib/snapshotd/cosmoshub-4"
    );
    assert_eq!(node.interval().as_secs(), 3600);
}

#[test]
fn test_validate_rejects_missing_required_field() {
    let config = parse(&VALID_CONFIG.replace(
        "bucket = \"chain-snapshots\"",
        "bucket = \"\"",
    ));

    match config.validate() {
        Err(ConfigError::MissingRequired { node, field }) => {
            assert_eq!(node, "cosmoshub");
            assert_eq!(field, "storage.bucket");
        }
        other => panic!("Expected MissingRequired, got {:?}", other),
    }
}

#[test]
fn test_validate_rejects_zero_interval() {
    let config = parse(&VALID_CONFIG.replace("interval_seconds = 3600", "interval_seconds = 0"));

    match config.validate() {
        Err(ConfigError::InvalidValue { node, field, .. }) => {
            assert_eq!(node, "cosmoshub");
            assert_eq!(field, "snapshot.interval_seconds");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_validate_requires_an_enabled_node() {
    let config = parse(&VALID_CONFIG.replacen("enabled = true", "enabled = false", 1));

    match config.validate() {
        Err(ConfigError::NoEnabledNodes) => {}
        other => panic!("Expected NoEnabledNodes, got {:?}", other),
    }
}

#[test]
fn test_validate_ignores_disabled_nodes() {
    // Osmosis is disabled and incomplete in ways that would fail
    // validation if it were checked.
    let config = parse(&VALID_CONFIG.replace(
        "prefix = \"snapshots/osmosis\"",
        "prefix = \"\"",
    ));

    config.validate().expect("Disabled nodes must be skipped");
}

#[tokio::test]
async fn test_manager_loads_from_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshotd.toml");
    fs::write(&path, VALID_CONFIG).unwrap();

    let manager = ConfigManager::load(Some(&path)).await.unwrap();
    let config = manager.get_current_config();
    assert_eq!(config.alarm_webhook_url, "https://hooks.example.com/alerts");
    assert_eq!(config.nodes.len(), 2);
}

#[tokio::test]
async fn test_manager_rejects_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ConfigManager::load(Some(&path))
        .await
        .expect_err("Loading a missing file must fail");
    assert!(err.to_string().contains("Failed to load config"));
}

#[tokio::test]
async fn test_manager_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshotd.toml");
    fs::write(&path, "nodes = not-valid-toml").unwrap();

    let err = ConfigManager::load(Some(&path))
        .await
        .expect_err("Malformed TOML must fail");
    assert!(err.to_string().contains("Failed to parse config"));
}
