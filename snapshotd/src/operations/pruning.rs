//! Retention-based pruning
//!
//! Deletes the oldest excess artifacts in a scope (local staging
//! directory or remote key prefix) so at most `keep` remain. Deletions
//! are best effort: one failure is recorded and the pass continues, so
//! cleanup problems never block the archive/upload path.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

use crate::storage::ObjectStorage;
use crate::types::{PruneFailure, PruneOutcome};

fn excess(len: usize, keep: usize) -> usize {
    len.saturating_sub(keep)
}

/// Prunes `.tar.gz` artifacts in the staging directory, oldest first by
/// modification time, keeping the `keep` newest.
pub async fn prune_local(dir: &Path, keep: usize) -> Result<PruneOutcome> {
    let artifacts = list_local_artifacts(dir).await?;
    let excess = excess(artifacts.len(), keep);

    if excess == 0 {
        info!(
            "No local snapshots to prune in {} (have {}, keeping {})",
            dir.display(),
            artifacts.len(),
            keep
        );
        return Ok(PruneOutcome::default());
    }

    let mut outcome = PruneOutcome::default();
    for path in artifacts.into_iter().take(excess) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Removed old snapshot: {}", path.display());
                outcome.removed.push(name);
            }
            // Already gone counts as removed.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                outcome.removed.push(name);
            }
            Err(e) => {
                warn!("Failed to remove old snapshot {}: {}", path.display(), e);
                outcome.failed.push(PruneFailure {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Prunes remote snapshots under a key prefix, trusting the gateway's
/// ascending key order as oldest-first.
pub async fn prune_remote(
    store: &dyn ObjectStorage,
    prefix: &str,
    keep: usize,
) -> Result<PruneOutcome> {
    let keys = store.list(prefix).await?;
    let excess = excess(keys.len(), keep);

    if excess == 0 {
        info!(
            "No remote snapshots to prune under '{}' (have {}, keeping {})",
            prefix,
            keys.len(),
            keep
        );
        return Ok(PruneOutcome::default());
    }

    let mut outcome = PruneOutcome::default();
    for key in keys.into_iter().take(excess) {
        match store.delete(&key).await {
            Ok(()) => {
                info!("Removed old remote snapshot: {}", key);
                outcome.removed.push(key);
            }
            Err(e) => {
                warn!("Failed to delete remote snapshot {}: {}", key, e);
                outcome.failed.push(PruneFailure {
                    name: key,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Snapshot artifacts in `dir`, ordered oldest first by modification
/// time with the filename as tie-breaker.
async fn list_local_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        // A staging dir that was never created has nothing to prune.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Failed to read snapshot directory {}: {}",
                dir.display(),
                e
            ))
        }
    };

    let mut artifacts: Vec<(SystemTime, PathBuf)> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "gz") {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                warn!("Failed to stat {}: {}", path.display(), e);
                continue;
            }
        };

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        artifacts.push((modified, path));
    }

    artifacts.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(artifacts.into_iter().map(|(_, path)| path).collect())
}
