pub mod create;
pub mod daemon;
pub mod list;
pub mod upload;

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{AlertService, SnapshotService};
use crate::storage::S3Storage;

/// Wires a snapshot service for one configured node with the S3
/// gateway and alerting the commands share.
fn build_service(config: &Config, node_name: &str) -> Result<SnapshotService> {
    let node_config = config.node(node_name)?;
    let storage = Arc::new(S3Storage::new(&node_config.storage)?);
    let alerts = Arc::new(AlertService::new(config.alarm_webhook_url.clone()));

    Ok(SnapshotService::new(
        node_name.to_string(),
        node_config,
        storage,
        alerts,
    ))
}
