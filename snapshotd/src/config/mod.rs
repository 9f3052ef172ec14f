pub mod manager;
pub use manager::ConfigManager;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alarm_webhook_url: String,
    /// Fallback credentials/endpoint applied to nodes that do not set
    /// their own (merged in [`Config::node`]).
    #[serde(default)]
    pub storage_defaults: StorageDefaults,
    #[serde(default)]
    pub nodes: HashMap<String, NodeConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageDefaults {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub node: NodeSettings,
    pub snapshot: SnapshotSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSettings {
    pub home_dir: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    pub chain_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSettings {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_retention")]
    pub retention: usize,
    pub staging_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub endpoint: Option<String>,
    pub prefix: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_interval_seconds() -> u64 {
    86400 // daily
}

fn default_retention() -> usize {
    7
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl NodeConfig {
    /// Full path to the node data directory that gets archived.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.node.home_dir).join(&self.node.data_dir)
    }

    /// Local directory where snapshot archives are staged, namespaced
    /// per chain so nodes sharing a staging root never collide.
    pub fn staging_path(&self) -> PathBuf {
        PathBuf::from(&self.snapshot.staging_dir).join(&self.node.chain_id)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.snapshot.interval_seconds)
    }
}

impl Config {
    /// Returns the configuration for a single node with global storage
    /// defaults merged in. Disabled nodes are rejected.
    pub fn node(&self, name: &str) -> Result<NodeConfig, ConfigError> {
        let node_config = self
            .nodes
            .get(name)
            .ok_or_else(|| ConfigError::NodeNotFound {
                node: name.to_string(),
            })?;

        if !node_config.enabled {
            return Err(ConfigError::NodeDisabled {
                node: name.to_string(),
            });
        }

        let mut merged = node_config.clone();
        if merged.storage.access_key.is_none() {
            merged.storage.access_key = self.storage_defaults.access_key.clone();
        }
        if merged.storage.secret_key.is_none() {
            merged.storage.secret_key = self.storage_defaults.secret_key.clone();
        }
        if merged.storage.endpoint.is_none() {
            merged.storage.endpoint = self.storage_defaults.endpoint.clone();
        }

        Ok(merged)
    }

    pub fn enabled_nodes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.enabled)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Validates the whole configuration before any command runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut enabled = 0;
        for (name, node_config) in &self.nodes {
            if !node_config.enabled {
                continue;
            }
            enabled += 1;
            node_config.validate(name)?;
        }

        if enabled == 0 {
            return Err(ConfigError::NoEnabledNodes);
        }

        Ok(())
    }
}

impl NodeConfig {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let required = [
            ("node.home_dir", &self.node.home_dir),
            ("node.chain_id", &self.node.chain_id),
            ("snapshot.staging_dir", &self.snapshot.staging_dir),
            ("storage.bucket", &self.storage.bucket),
            ("storage.prefix", &self.storage.prefix),
        ];

        for (field, value) in required {
            if value.is_empty() {
                return Err(ConfigError::MissingRequired {
                    node: name.to_string(),
                    field: field.to_string(),
                });
            }
        }

        if self.snapshot.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                node: name.to_string(),
                field: "snapshot.interval_seconds".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}
