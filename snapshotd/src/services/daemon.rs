//! Snapshot daemon loop
//!
//! Drives the orchestrator on a fixed interval. The loop is a single
//! worker: a cycle always runs to completion before the next tick or a
//! pending shutdown is observed, so cycles never overlap. A cycle that
//! outlives the interval just delays the next tick; missed ticks are
//! never queued up.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::services::SnapshotService;

pub struct DaemonService {
    node_name: String,
    service: Arc<SnapshotService>,
    interval: Duration,
}

impl DaemonService {
    pub fn new(node_name: String, service: Arc<SnapshotService>, interval: Duration) -> Self {
        Self {
            node_name,
            service,
            interval,
        }
    }

    /// Blocks until the shutdown signal fires. Cycle failures are
    /// logged and the loop carries on to the next tick; only shutdown
    /// terminates the daemon.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            "Starting snapshot daemon for {} (interval {}s)",
            self.node_name,
            self.interval.as_secs()
        );

        // First cycle runs immediately; the ticker starts one interval out.
        self.run_cycle_logged().await;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Only a `true` value (or a closed channel, sender
                // dropped) stops the daemon.
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        info!("Snapshot daemon for {} stopped by shutdown signal", self.node_name);
                        return Ok(());
                    }
                }
                _ = ticker.tick() => {
                    self.run_cycle_logged().await;
                }
            }
        }
    }

    async fn run_cycle_logged(&self) {
        if let Err(e) = self.service.run_cycle().await {
            error!("Snapshot cycle failed for {}: {:#}", self.node_name, e);
        }
    }
}
