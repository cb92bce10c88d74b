//! Idempotent bulk loader for JSON fixture files
//!
//! A fixture directory holds one JSON array of records per file. The file
//! name selects the target collection and every record is upserted against a
//! reconciliation filter, so re-running the loader over unchanged fixtures
//! converges instead of duplicating.

pub mod config;
pub mod error;
pub mod loader;
pub mod reconcile;
pub mod routing;

pub use config::LoaderConfig;
pub use error::LoaderError;
pub use loader::{FileOutcome, FileStats, FixtureLoader, LoadReport};
pub use reconcile::{reconciliation_filter, MissingKeyPolicy, SEED_HASH_FIELD};
pub use routing::collection_name;
