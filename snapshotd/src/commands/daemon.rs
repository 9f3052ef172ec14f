use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::services::DaemonService;

/// Runs the snapshot daemon for a node until SIGINT/SIGTERM.
pub async fn execute(
    config: &Config,
    node_name: &str,
    interval_override: Option<u64>,
) -> Result<()> {
    let node_config = config.node(node_name)?;
    let interval = match interval_override {
        Some(seconds) if seconds > 0 => Duration::from_secs(seconds),
        Some(_) => anyhow::bail!("--interval-seconds must be positive"),
        None => node_config.interval(),
    };

    let service = Arc::new(super::build_service(config, node_name)?);
    let daemon = DaemonService::new(node_name.to_string(), service, interval);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    daemon.run(shutdown_rx).await?;

    info!("Daemon stopped gracefully for {}", node_name);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
