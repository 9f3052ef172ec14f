//! Integration tests for the daemon loop
//!
//! Cover the immediate first cycle, prompt cancellation during the
//! wait period, periodic re-runs, and failure isolation (a failing
//! cycle never stops the loop).

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use snapshotd::config::{NodeConfig, NodeSettings, SnapshotSettings, StorageSettings};
use snapshotd::errors::StorageError;
use snapshotd::services::{AlertService, DaemonService, SnapshotService};
use snapshotd::storage::{MemoryStorage, ObjectStorage};

fn node_config(home_dir: &Path, staging_dir: &Path) -> NodeConfig {
    NodeConfig {
        enabled: true,
        node: NodeSettings {
            home_dir: home_dir.to_string_lossy().into_owned(),
            data_dir: "data".to_string(),
            chain_id: "testchain-1".to_string(),
        },
        snapshot: SnapshotSettings {
            interval_seconds: 3600,
            retention: 10,
            staging_dir: staging_dir.to_string_lossy().into_owned(),
        },
        storage: StorageSettings {
            bucket: "test-bucket".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            prefix: "snapshots/testchain".to_string(),
            access_key: None,
            secret_key: None,
        },
    }
}

fn populate_data_dir(home_dir: &Path) {
    let data = home_dir.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("application.db"), b"mock blockchain data").unwrap();
}

/// Counts `put` calls so cycles can be tallied even when second-
/// resolution snapshot names collide across fast test intervals.
struct CountingStorage {
    inner: MemoryStorage,
    puts: AtomicUsize,
}

impl CountingStorage {
    fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            puts: AtomicUsize::new(0),
        }
    }

    fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for CountingStorage {
    async fn put(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(local_path, key).await
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        self.inner.get(key, local_path).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }
}

fn build_daemon(
    config: NodeConfig,
    store: Arc<CountingStorage>,
    interval: Duration,
) -> Arc<DaemonService> {
    let service = Arc::new(SnapshotService::new(
        "test-node".to_string(),
        config,
        store,
        Arc::new(AlertService::new(String::new())),
    ));
    Arc::new(DaemonService::new(
        "test-node".to_string(),
        service,
        interval,
    ))
}

async fn wait_for_puts(store: &CountingStorage, count: usize) {
    timeout(Duration::from_secs(10), async {
        while store.put_count() < count {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("Timed out waiting for {} cycles", count));
}

#[tokio::test]
async fn test_cancel_after_first_cycle_runs_exactly_one() {
    let home = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    populate_data_dir(home.path());

    let store = Arc::new(CountingStorage::new());
    // Interval far longer than the test: only the immediate first
    // cycle can run.
    let daemon = build_daemon(
        node_config(home.path(), staging.path()),
        store.clone(),
        Duration::from_secs(3600),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let daemon = daemon.clone();
        async move { daemon.run(shutdown_rx).await }
    });

    wait_for_puts(&store, 1).await;
    shutdown_tx.send(true).unwrap();

    timeout(Duration::from_secs(5), handle)
        .await
        .expect("Daemon did not stop promptly")
        .expect("Daemon task panicked")
        .expect("Daemon returned an error");

    assert_eq!(store.put_count(), 1);
}

#[tokio::test]
async fn test_daemon_ignores_false_shutdown_values() {
    let home = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    populate_data_dir(home.path());

    let store = Arc::new(CountingStorage::new());
    let daemon = build_daemon(
        node_config(home.path(), staging.path()),
        store.clone(),
        Duration::from_secs(3600),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let daemon = daemon.clone();
        async move { daemon.run(shutdown_rx).await }
    });

    wait_for_puts(&store, 1).await;

    // A `false` value is not a shutdown request.
    shutdown_tx.send(false).unwrap();
    sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished());

    shutdown_tx.send(true).unwrap();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("Daemon did not stop promptly")
        .expect("Daemon task panicked")
        .expect("Daemon returned an error");

    assert_eq!(store.put_count(), 1);
}

#[tokio::test]
async fn test_daemon_runs_periodic_cycles() {
    let home = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    populate_data_dir(home.path());

    let store = Arc::new(CountingStorage::new());
    let daemon = build_daemon(
        node_config(home.path(), staging.path()),
        store.clone(),
        Duration::from_millis(50),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let daemon = daemon.clone();
        async move { daemon.run(shutdown_rx).await }
    });

    wait_for_puts(&store, 3).await;
    shutdown_tx.send(true).unwrap();

    timeout(Duration::from_secs(5), handle)
        .await
        .expect("Daemon did not stop promptly")
        .expect("Daemon task panicked")
        .expect("Daemon returned an error");

    assert!(store.put_count() >= 3);
}

#[tokio::test]
async fn test_daemon_survives_cycle_failures() {
    let home = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    // No data directory: every cycle fails at the create step.

    let store = Arc::new(CountingStorage::new());
    let daemon = build_daemon(
        node_config(home.path(), staging.path()),
        store.clone(),
        Duration::from_millis(50),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let daemon = daemon.clone();
        async move { daemon.run(shutdown_rx).await }
    });

    // Several failing cycles later the loop must still be alive.
    sleep(Duration::from_millis(300)).await;
    assert!(!handle.is_finished());
    assert_eq!(store.put_count(), 0);

    shutdown_tx.send(true).unwrap();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("Daemon did not stop promptly")
        .expect("Daemon task panicked")
        .expect("Daemon returned an error");
}
