//! Bucket-scoped gateway in front of an [`ObjectStore`]
//!
//! The gateway never retries: each operation is one backend call and every
//! failure goes back to the caller tagged with its [`StorageError`] kind.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, error, info};

use super::{ObjectStore, S3ObjectStore, StorageConfig, StorageError, StorageResult};
use crate::types::{ObjectRef, PresignedGrant};

pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Build a gateway backed by the configured S3/MinIO endpoint.
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        let store = S3ObjectStore::connect(config).await?;
        Ok(Self::new(Arc::new(store), config.bucket.clone()))
    }

    /// Make sure the bucket exists, creating it when absent. Safe to call on
    /// every startup and from several instances at once.
    pub async fn ensure_bucket(&self) -> StorageResult<()> {
        debug!(bucket = %self.bucket, "Checking bucket");

        let exists = self
            .store
            .bucket_exists(&self.bucket)
            .await
            .map_err(|e| self.unavailable(e))?;

        if exists {
            debug!(bucket = %self.bucket, "Bucket already exists");
            return Ok(());
        }

        info!(bucket = %self.bucket, "Bucket does not exist, creating");
        self.store
            .make_bucket(&self.bucket)
            .await
            .map_err(|e| self.unavailable(e))?;

        info!(bucket = %self.bucket, "Bucket created");
        Ok(())
    }

    /// Write an object, replacing whatever is stored at `key`.
    pub async fn put(
        &self,
        key: &str,
        data: impl Into<Bytes>,
        content_type: &str,
    ) -> StorageResult<ObjectRef> {
        let data = data.into();
        let size = data.len() as u64;
        debug!(bucket = %self.bucket, key, size, content_type, "Putting object");

        self.store
            .put_object(&self.bucket, key, data, content_type)
            .await
            .map_err(|source| {
                error!(bucket = %self.bucket, key, error = %source, "Object write failed");
                StorageError::WriteFailed {
                    key: key.to_string(),
                    source,
                }
            })?;

        info!(bucket = %self.bucket, key, size, "Object stored");
        Ok(ObjectRef {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }

    /// Issue a read URL for `key` valid for `ttl`. The object is not looked
    /// up first, so a fetch may still 404.
    pub async fn presign(&self, key: &str, ttl: Duration) -> StorageResult<PresignedGrant> {
        if ttl.is_zero() {
            return Err(StorageError::ReadFailed {
                key: key.to_string(),
                source: anyhow::anyhow!("presign TTL must be greater than zero"),
            });
        }

        let issued_at = Utc::now();
        let url = self
            .store
            .presign_get(&self.bucket, key, ttl)
            .await
            .map_err(|source| {
                error!(bucket = %self.bucket, key, error = %source, "Presign failed");
                StorageError::ReadFailed {
                    key: key.to_string(),
                    source,
                }
            })?;

        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| StorageError::ReadFailed {
                key: key.to_string(),
                source: anyhow::anyhow!("presign TTL {:?} is out of range", ttl),
            })?;

        debug!(bucket = %self.bucket, key, ttl_secs = ttl.as_secs(), "Presigned read issued");
        Ok(PresignedGrant { url, expires_at })
    }

    /// Whether the bucket can currently be reached.
    pub async fn health_check(&self) -> bool {
        matches!(self.store.bucket_exists(&self.bucket).await, Ok(true))
    }

    fn unavailable(&self, source: anyhow::Error) -> StorageError {
        error!(bucket = %self.bucket, error = %source, "Bucket check failed");
        StorageError::Unavailable {
            bucket: self.bucket.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for StorageGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageGateway")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
