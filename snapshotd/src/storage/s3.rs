use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, WriteMultipart};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

use crate::config::StorageSettings;
use crate::errors::StorageError;
use crate::storage::ObjectStorage;

/// Read buffer for streamed uploads. Snapshot archives run to many
/// gigabytes, so transfers never hold more than a few buffered parts
/// in memory at once.
const UPLOAD_BUF_SIZE: usize = 1024 * 1024;

/// Maximum multipart upload parts in flight.
const UPLOAD_CONCURRENCY: usize = 8;

/// S3-compatible object storage backend.
///
/// Credentials come from the node configuration when set, otherwise
/// from the standard AWS environment variables.
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl S3Storage {
    pub fn new(settings: &StorageSettings) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&settings.bucket)
            .with_region(&settings.region);

        if let Some(endpoint) = &settings.endpoint {
            // Custom endpoints (MinIO, localstack) are often plain HTTP.
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }

        if let Some(access_key) = &settings.access_key {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = &settings.secret_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        let store = builder.build().map_err(|e| StorageError::ClientFailed {
            reason: e.to_string(),
        })?;

        Ok(Self {
            store: Arc::new(store),
            bucket: settings.bucket.clone(),
        })
    }

    /// Wraps an already-built backend. Tests pair this with the
    /// in-memory store so the transfer paths run without a bucket.
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self { store, bucket }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        let local_io = |e: std::io::Error| StorageError::LocalIo {
            path: local_path.display().to_string(),
            reason: e.to_string(),
        };
        let upload_failed = |e: object_store::Error| StorageError::UploadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let mut file = File::open(local_path).await.map_err(local_io)?;
        let size = file.metadata().await.map_err(local_io)?.len();

        // Stream the file in parts; the whole archive is never resident.
        let upload = self
            .store
            .put_multipart(&ObjectPath::from(key))
            .await
            .map_err(upload_failed)?;
        let mut writer = WriteMultipart::new(upload);
        let mut buf = vec![0u8; UPLOAD_BUF_SIZE];

        loop {
            let read = match file.read(&mut buf).await {
                Ok(read) => read,
                Err(e) => {
                    let _ = writer.abort().await;
                    return Err(local_io(e));
                }
            };
            if read == 0 {
                break;
            }

            writer
                .wait_for_capacity(UPLOAD_CONCURRENCY)
                .await
                .map_err(upload_failed)?;
            writer.write(&buf[..read]);
        }

        writer.finish().await.map_err(upload_failed)?;

        info!(
            "Uploaded {} to s3://{}/{} ({} bytes)",
            local_path.display(),
            self.bucket,
            key,
            size
        );

        Ok(())
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let download_failed = |e: object_store::Error| StorageError::DownloadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let local_io = |e: std::io::Error| StorageError::LocalIo {
            path: local_path.display().to_string(),
            reason: e.to_string(),
        };

        let result = self
            .store
            .get(&ObjectPath::from(key))
            .await
            .map_err(download_failed)?;

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::LocalIo {
                    path: parent.display().to_string(),
                    reason: e.to_string(),
                })?;
        }

        // Write the object chunk by chunk as it arrives.
        let mut file = File::create(local_path).await.map_err(local_io)?;
        let mut stream = result.into_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.try_next().await.map_err(download_failed)? {
            written += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(local_io)?;
        }
        file.flush().await.map_err(local_io)?;

        info!(
            "Downloaded s3://{}/{} to {} ({} bytes)",
            self.bucket,
            key,
            local_path.display(),
            written
        );

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let prefix_path = ObjectPath::from(prefix);
        let metas: Vec<_> = self
            .store
            .list(Some(&prefix_path))
            .try_collect()
            .await
            .map_err(|e| StorageError::ListFailed {
                prefix: prefix.to_string(),
                reason: e.to_string(),
            })?;

        let mut keys: Vec<String> = metas.into_iter().map(|m| m.location.to_string()).collect();
        keys.sort_unstable();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.store.delete(&ObjectPath::from(key)).await {
            Ok(()) => Ok(()),
            // Deleting an already-absent key is a no-op.
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
