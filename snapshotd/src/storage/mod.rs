//! Object storage gateway
//!
//! Narrow interface the snapshot lifecycle calls for all remote-side
//! operations. The S3 backend is the production implementation; the
//! in-memory backend backs the integration tests.

pub mod memory;
pub mod s3;

pub use memory::MemoryStorage;
pub use s3::S3Storage;

use async_trait::async_trait;
use std::path::Path;

use crate::errors::StorageError;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads a local file to the given remote key.
    async fn put(&self, local_path: &Path, key: &str) -> Result<(), StorageError>;

    /// Downloads a remote object to a local file, creating parent
    /// directories as needed.
    async fn get(&self, key: &str, local_path: &Path) -> Result<(), StorageError>;

    /// Lists object keys under a prefix in ascending key order. Since
    /// snapshot names are timestamp-suffixed, ascending key order is
    /// chronological (oldest first).
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Deletes an object. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Derives the remote key for an artifact filename under a prefix.
pub fn remote_key(prefix: &str, filename: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), filename)
}
