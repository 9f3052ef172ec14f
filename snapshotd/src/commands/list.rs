use crate::config::Config;

/// Prints every enabled node and its snapshot settings.
pub fn execute(config: &Config) {
    println!("Configured nodes:");
    println!("=================");

    let enabled = config.enabled_nodes();
    if enabled.is_empty() {
        println!("No enabled nodes found.");
        return;
    }

    for name in &enabled {
        // enabled_nodes only returns names present in the map
        let Ok(node_config) = config.node(name) else {
            continue;
        };

        println!("\nNode: {}", name);
        println!("  Chain ID: {}", node_config.node.chain_id);
        println!("  Data Path: {}", node_config.data_path().display());
        println!("  Staging Path: {}", node_config.staging_path().display());
        println!(
            "  Snapshot Interval: {}s",
            node_config.snapshot.interval_seconds
        );
        println!("  Retention: {} snapshots", node_config.snapshot.retention);
        println!("  Bucket: {}", node_config.storage.bucket);
        println!("  Prefix: {}", node_config.storage.prefix);
    }

    println!("\nTotal enabled nodes: {}", enabled.len());
}
