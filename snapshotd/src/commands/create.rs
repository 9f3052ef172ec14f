use anyhow::Result;
use tracing::info;

use crate::config::Config;

/// One-shot snapshot creation for a configured node.
pub async fn execute(config: &Config, node_name: &str) -> Result<()> {
    let node_config = config.node(node_name)?;

    info!(
        "Starting snapshot creation for {} (chain {}, data path {})",
        node_name,
        node_config.node.chain_id,
        node_config.data_path().display()
    );

    let service = super::build_service(config, node_name)?;
    let snapshot = service.create_snapshot().await?;

    info!(
        "Snapshot created for {}: {} ({} bytes)",
        node_name,
        snapshot.path.display(),
        snapshot.size_bytes
    );

    Ok(())
}
