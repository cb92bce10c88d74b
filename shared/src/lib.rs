//! Shared document model, storage gateway and database plumbing for the
//! Real Deal backend services

// Re-export common dependencies
pub use anyhow;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;
pub use uuid;

pub mod config;
pub mod database;
pub mod observability;
pub mod storage;
pub mod types;

pub use database::{DocumentStore, Filter, UpsertOutcome};
pub use storage::{StorageError, StorageGateway};
pub use types::{Document, Value};
