//! Process-local object store for tests and local development

use std::collections::HashMap;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::ObjectStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: String,
    buckets: RwLock<HashMap<String, HashMap<String, StoredObject>>>,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new("http://localhost:9000")
    }
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            buckets: RwLock::new(HashMap::new()),
        }
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }

    pub async fn bucket_count(&self) -> usize {
        self.buckets.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> anyhow::Result<bool> {
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> anyhow::Result<()> {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> anyhow::Result<()> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| anyhow!("NoSuchBucket: {}", bucket))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        Ok(format!(
            "{}/{}/{}?X-Amz-Expires={}",
            self.base_url,
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}
