//! S3-compatible object store (AWS S3, MinIO)
//!
//! Uses static credentials and path-style addressing so that a bare MinIO
//! endpoint works. Retries are whatever the SDK does by default; the
//! operation timeout is the only deadline applied.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::info;

use super::{ObjectStore, StorageConfig, StorageEndpoint, StorageResult};

/// Region that must not be sent as an explicit location constraint.
const DEFAULT_REGION: &str = "us-east-1";

pub struct S3ObjectStore {
    client: Client,
    region: String,
}

impl S3ObjectStore {
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        let endpoint = StorageEndpoint::parse(&config.endpoint)?;
        info!(
            endpoint = %endpoint,
            bucket = %config.bucket,
            region = %config.region,
            "Initializing S3 client"
        );

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(endpoint.as_url())
            .credentials_provider(credentials)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.operation_timeout)
                    .build(),
            )
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            region: config.region.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> anyhow::Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(ctx))
                if ctx.err().is_not_found() || ctx.raw().status().as_u16() == 404 =>
            {
                Ok(false)
            }
            Err(e) => Err(e).context(format!("HeadBucket {}", bucket)),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> anyhow::Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_bucket_already_owned_by_you() => {
                Ok(())
            }
            Err(e) => Err(e).context(format!("CreateBucket {}", bucket)),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> anyhow::Result<()> {
        let length = i64::try_from(data.len()).context("payload too large")?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(length)
            .body(ByteStream::from(data))
            .send()
            .await
            .with_context(|| format!("PutObject {}/{}", bucket, key))?;
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .with_context(|| format!("invalid presign expiry {:?}", expires_in))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .with_context(|| format!("presign GetObject {}/{}", bucket, key))?;

        Ok(request.uri().to_string())
    }
}
