use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::errors::StorageError;
use crate::storage::ObjectStorage;

/// In-memory object storage backend.
///
/// Used by the integration tests in place of a real bucket. The
/// `fail_*` toggles inject deterministic failures so the cycle
/// invariants (upload failure, listing failure) can be exercised.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    fail_puts: AtomicBool,
    fail_lists: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// All stored keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .expect("storage lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("storage lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .expect("storage lock poisoned")
            .contains_key(key)
    }

    /// Seeds an object directly, bypassing the `put` path.
    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.objects
            .write()
            .expect("storage lock poisoned")
            .insert(key.to_string(), data);
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed {
                key: key.to_string(),
                reason: "injected put failure".to_string(),
            });
        }

        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| StorageError::LocalIo {
                path: local_path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.insert(key, data);
        Ok(())
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let data = self
            .objects
            .read()
            .expect("storage lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::DownloadFailed {
                key: key.to_string(),
                reason: "object not found".to_string(),
            })?;

        tokio::fs::write(local_path, data)
            .await
            .map_err(|e| StorageError::LocalIo {
                path: local_path.display().to_string(),
                reason: e.to_string(),
            })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StorageError::ListFailed {
                prefix: prefix.to_string(),
                reason: "injected list failure".to_string(),
            });
        }

        // Prefixes match on path segment boundaries, like the S3
        // backend: "snapshots/chain" must not match "snapshots/chain2".
        let prefix = prefix.trim_end_matches('/');

        // BTreeMap iteration is already ascending by key.
        Ok(self
            .objects
            .read()
            .expect("storage lock poisoned")
            .keys()
            .filter(|key| match key.strip_prefix(prefix) {
                Some(rest) => prefix.is_empty() || rest.starts_with('/'),
                None => false,
            })
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed {
                key: key.to_string(),
                reason: "injected delete failure".to_string(),
            });
        }

        // Removing a missing key is a no-op.
        self.objects
            .write()
            .expect("storage lock poisoned")
            .remove(key);
        Ok(())
    }
}
