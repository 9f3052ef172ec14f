use super::Config;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::errors::ConfigError;

/// Default locations probed when no explicit config path is given,
/// in order of precedence.
const SEARCH_PATHS: [&str; 3] = [
    "snapshotd.toml",
    "config/snapshotd.toml",
    "/etc/snapshotd/snapshotd.toml",
];

#[derive(Debug)]
pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    /// Loads and validates the configuration from `path`, or from the
    /// first existing default location when `path` is `None`.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::find_default_config()?,
        };

        debug!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        config.validate()?;

        info!(
            "Configuration loaded from {}: {} nodes ({} enabled)",
            path.display(),
            config.nodes.len(),
            config.enabled_nodes().len()
        );

        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    fn find_default_config() -> Result<PathBuf> {
        for candidate in SEARCH_PATHS {
            let path = PathBuf::from(candidate);
            if path.is_file() {
                return Ok(path);
            }
        }

        Err(ConfigError::LoadFailed {
            path: SEARCH_PATHS.join(", "),
            reason: "no configuration file found".to_string(),
        }
        .into())
    }
}
