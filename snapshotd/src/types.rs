use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One compressed archive file representing a point-in-time copy of a
/// node's data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// A single artifact deletion that could not be carried out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneFailure {
    pub name: String,
    pub reason: String,
}

/// Aggregate result of one best-effort pruning pass over a scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PruneOutcome {
    pub removed: Vec<String>,
    pub failed: Vec<PruneFailure>,
}

impl PruneOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Transient record of one create → upload → prune cycle.
///
/// The prune fields are `None` when that pass could not run at all
/// (e.g. the remote listing failed); pruning is advisory and never
/// fails the cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub snapshot: SnapshotInfo,
    pub remote_key: String,
    pub local_prune: Option<PruneOutcome>,
    pub remote_prune: Option<PruneOutcome>,
}
