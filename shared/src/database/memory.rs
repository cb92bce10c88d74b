//! In-memory document store with the same matching and upsert rules as the
//! PostgreSQL store: per-field equality, numbers compared by value.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DatabaseResult, DocumentStore, Filter, UpsertOutcome};
use crate::types::Document;

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection directly, bypassing upsert.
    pub async fn insert(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DatabaseResult<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> DatabaseResult<Vec<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(
        &self,
        collection: &str,
        filter: &Filter,
        document: &Document,
    ) -> DatabaseResult<UpsertOutcome> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = docs.iter_mut().find(|doc| filter.matches(doc)) {
            existing.merge(document);
            return Ok(UpsertOutcome::Updated);
        }

        let mut inserted = filter.as_document().clone();
        inserted.merge(document);
        docs.push(inserted);
        Ok(UpsertOutcome::Inserted)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
