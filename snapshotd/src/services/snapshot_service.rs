//! Snapshot orchestration
//!
//! Composes the archiver, the object storage gateway and the retention
//! pruner into one create → upload → prune cycle. The same building
//! blocks back the one-shot CLI commands.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::operations::archive::Archiver;
use crate::operations::pruning;
use crate::services::AlertService;
use crate::storage::{remote_key, ObjectStorage};
use crate::types::{CycleReport, PruneOutcome, SnapshotInfo};

pub struct SnapshotService {
    node_name: String,
    config: NodeConfig,
    storage: Arc<dyn ObjectStorage>,
    alerts: Arc<AlertService>,
    archiver: Archiver,
}

impl SnapshotService {
    pub fn new(
        node_name: String,
        config: NodeConfig,
        storage: Arc<dyn ObjectStorage>,
        alerts: Arc<AlertService>,
    ) -> Self {
        let archiver = Archiver::new(
            config.data_path(),
            config.staging_path(),
            config.node.chain_id.clone(),
        );

        Self {
            node_name,
            config,
            storage,
            alerts,
            archiver,
        }
    }

    /// Archives the node data directory into the staging directory.
    /// Archiving is blocking filesystem work, so it runs off the async
    /// worker threads.
    pub async fn create_snapshot(&self) -> Result<SnapshotInfo> {
        let archiver = self.archiver.clone();
        let snapshot = tokio::task::spawn_blocking(move || archiver.create())
            .await
            .context("archive task panicked")??;
        Ok(snapshot)
    }

    /// Uploads an existing snapshot file under the configured prefix.
    /// The local file is kept regardless of the outcome.
    pub async fn upload_file(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            anyhow::bail!("Snapshot file does not exist: {}", path.display());
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("Invalid snapshot filename: {}", path.display()))?;

        let key = remote_key(&self.config.storage.prefix, &filename);
        self.storage.put(path, &key).await?;
        Ok(key)
    }

    /// Runs one full cycle, alerting on failure when a webhook is
    /// configured.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let result = self.execute_cycle().await;

        if let Err(e) = &result {
            if let Err(alert_err) = self
                .alerts
                .send_cycle_failure(&self.node_name, &self.config.node.chain_id, &format!("{:#}", e))
                .await
            {
                warn!("Failed to send cycle failure alert: {}", alert_err);
            }
        }

        result
    }

    async fn execute_cycle(&self) -> Result<CycleReport> {
        info!(
            "Starting snapshot cycle for {} (chain {})",
            self.node_name, self.config.node.chain_id
        );

        // Steps 1-2 are the cycle's success criteria; a failure here
        // aborts before any pruning runs.
        let snapshot = self
            .create_snapshot()
            .await
            .context("failed to create snapshot")?;

        let remote_key = self
            .upload_file(&snapshot.path)
            .await
            .context("failed to upload snapshot")?;

        // Steps 3-4 are advisory cleanup.
        let retention = self.config.snapshot.retention;
        let local_prune = match pruning::prune_local(&self.config.staging_path(), retention).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Local snapshot pruning failed for {}: {:#}", self.node_name, e);
                None
            }
        };

        let remote_prune = match pruning::prune_remote(
            self.storage.as_ref(),
            &self.config.storage.prefix,
            retention,
        )
        .await
        {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Remote snapshot pruning failed for {}: {:#}", self.node_name, e);
                None
            }
        };

        self.log_prune_failures("local", &local_prune);
        self.log_prune_failures("remote", &remote_prune);

        info!(
            "Snapshot cycle completed for {}: {} uploaded as {}",
            self.node_name, snapshot.filename, remote_key
        );

        Ok(CycleReport {
            snapshot,
            remote_key,
            local_prune,
            remote_prune,
        })
    }

    fn log_prune_failures(&self, scope: &str, outcome: &Option<PruneOutcome>) {
        if let Some(outcome) = outcome {
            for failure in &outcome.failed {
                warn!(
                    "{} prune for {} left artifact behind: {} ({})",
                    scope, self.node_name, failure.name, failure.reason
                );
            }
        }
    }
}
