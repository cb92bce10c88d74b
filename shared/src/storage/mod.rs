//! Object storage gateway for media content
//!
//! This module provides:
//! - [`StorageGateway`]: owns the deployment's single bucket and exposes
//!   bucket-ensure, put and presigned-read operations
//! - [`ObjectStore`]: the port the gateway talks to, implemented by
//!   [`S3ObjectStore`] (S3/MinIO) and [`InMemoryObjectStore`]
//! - [`StorageEndpoint`]: endpoint normalization done once at construction

pub mod endpoint;
pub mod gateway;
pub mod memory;
pub mod s3;

pub use endpoint::StorageEndpoint;
pub use gateway::StorageGateway;
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{env_or, env_parse, ConfigResult};

/// Storage error types. Every backend failure is carried verbatim as the source.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: bucket {bucket} could not be verified or created: {source}")]
    Unavailable {
        bucket: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write object {key}: {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to issue read access for object {key}: {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid storage endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl StorageError {
    /// Short tag used in logs and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Unavailable { .. } => "storage_unavailable",
            StorageError::WriteFailed { .. } => "storage_write_failed",
            StorageError::ReadFailed { .. } => "storage_read_failed",
            StorageError::InvalidEndpoint { .. } => "storage_invalid_endpoint",
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Remote object store protocol: bucket-exists, make-bucket, put-object and
/// presigned GET generation. One network round trip per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> anyhow::Result<bool>;

    /// Create `bucket`. Losing a concurrent creation race to another instance
    /// of this deployment is not an error.
    async fn make_bucket(&self, bucket: &str) -> anyhow::Result<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> anyhow::Result<()>;

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String>;
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `host[:port]`, optionally prefixed with `http://` or `https://`
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub operation_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:9000".to_string(),
            access_key: "miniouser".to_string(),
            secret_key: "miniopass123".to_string(),
            bucket: "media".to_string(),
            region: "us-east-1".to_string(),
            operation_timeout: Duration::from_secs(5),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            endpoint: env_or("MINIO_ENDPOINT", &defaults.endpoint),
            access_key: env_or("MINIO_ACCESS_KEY", &defaults.access_key),
            secret_key: env_or("MINIO_SECRET_KEY", &defaults.secret_key),
            bucket: env_or("MINIO_BUCKET", &defaults.bucket),
            region: env_or("MINIO_REGION", &defaults.region),
            operation_timeout: Duration::from_secs(env_parse(
                "STORAGE_OPERATION_TIMEOUT_SECONDS",
                defaults.operation_timeout.as_secs(),
            )?),
        })
    }
}
