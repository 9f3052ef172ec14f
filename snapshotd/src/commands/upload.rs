use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::Config;

/// One-shot upload of an existing snapshot file to the node's bucket.
pub async fn execute(config: &Config, node_name: &str, file: &Path) -> Result<()> {
    let node_config = config.node(node_name)?;

    info!(
        "Starting snapshot upload for {}: {} -> bucket {}",
        node_name,
        file.display(),
        node_config.storage.bucket
    );

    let service = super::build_service(config, node_name)?;
    let key = service.upload_file(file).await?;

    info!("Snapshot uploaded for {}: {}", node_name, key);
    Ok(())
}
