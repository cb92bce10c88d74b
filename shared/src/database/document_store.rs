//! Collection-oriented document store
//!
//! The protocol is deliberately small: find-one, find-many and
//! update-with-upsert, all addressed by a flat field-equality [`Filter`].
//! Structured identifier values (arrays, nested documents) match only when
//! equal as a whole, never by containment.
//! Each call is its own atomic unit; nothing spans documents.

use std::fmt;

use async_trait::async_trait;
use sqlx::{types::Json, Postgres, QueryBuilder};
use tracing::debug;

use super::{health_check, DatabaseResult, DbPool};
use crate::types::{Document, Value};

/// Field-equality condition. The empty filter selects every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self(Document::new().with(field, value))
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field, value);
        self
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.contains(&self.0)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Value::Object(self.0.clone()), f)
    }
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document in `collection` matching `filter`, in insertion order.
    async fn find_one(&self, collection: &str, filter: &Filter)
        -> DatabaseResult<Option<Document>>;

    /// Every document in `collection` matching `filter`, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> DatabaseResult<Vec<Document>>;

    /// Set the fields of `document` on the first match of `filter`, or insert
    /// `filter` merged with `document` when nothing matches.
    async fn upsert(
        &self,
        collection: &str,
        filter: &Filter,
        document: &Document,
    ) -> DatabaseResult<UpsertOutcome>;

    async fn health_check(&self) -> bool;
}

/// PostgreSQL store keeping every collection in one JSONB table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// `collection = .. AND body -> field = value ..`, one equality per filter
/// field. JSONB equality compares numbers by value, so `1` matches `1.0`,
/// while arrays and nested documents must match whole.
fn push_selection(builder: &mut QueryBuilder<'_, Postgres>, collection: &str, filter: &Filter) {
    builder.push("collection = ");
    builder.push_bind(collection.to_string());
    for (field, value) in filter.as_document().iter() {
        builder.push(" AND body -> ");
        builder.push_bind(field.clone());
        builder.push(" = ");
        builder.push_bind(Json(value.clone()));
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DatabaseResult<Option<Document>> {
        let mut builder = QueryBuilder::new("SELECT body FROM documents WHERE ");
        push_selection(&mut builder, collection, filter);
        builder.push(" ORDER BY id LIMIT 1");

        let row = builder
            .build_query_scalar::<Json<Document>>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|Json(document)| document))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> DatabaseResult<Vec<Document>> {
        let mut builder = QueryBuilder::new("SELECT body FROM documents WHERE ");
        push_selection(&mut builder, collection, filter);
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_scalar::<Json<Document>>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }

    async fn upsert(
        &self,
        collection: &str,
        filter: &Filter,
        document: &Document,
    ) -> DatabaseResult<UpsertOutcome> {
        let mut builder = QueryBuilder::new("WITH target AS (SELECT id FROM documents WHERE ");
        push_selection(&mut builder, collection, filter);
        builder.push(
            r#"
                ORDER BY id
                LIMIT 1
                FOR UPDATE
            ),
            updated AS (
                UPDATE documents d
                SET body = d.body || "#,
        );
        builder.push_bind(Json(document.clone()));
        builder.push(
            r#", updated_at = NOW()
                FROM target
                WHERE d.id = target.id
                RETURNING d.id
            ),
            inserted AS (
                INSERT INTO documents (collection, body)
                SELECT "#,
        );
        builder.push_bind(collection.to_string());
        builder.push(", ");
        builder.push_bind(Json(filter.as_document().clone()));
        builder.push(" || ");
        builder.push_bind(Json(document.clone()));
        builder.push(
            r#"
                WHERE NOT EXISTS (SELECT 1 FROM target)
                RETURNING id
            )
            SELECT EXISTS (SELECT 1 FROM inserted)"#,
        );

        let inserted = builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?;

        let outcome = if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        };
        debug!(collection, filter = %filter, ?outcome, "Upserted document");
        Ok(outcome)
    }

    async fn health_check(&self) -> bool {
        health_check(&self.pool).await
    }
}
