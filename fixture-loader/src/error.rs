use std::io;
use std::path::PathBuf;

use shared::database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    /// The fixture directory itself could not be listed; nothing was loaded.
    #[error("Failed to read seed directory {}: {source}", path.display())]
    SeedDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read fixture {}: {source}", path.display())]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed fixture {}: {source}", path.display())]
    FixtureParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {index} of {collection} has neither external_id nor id")]
    ReconciliationAmbiguous { collection: String, index: usize },

    #[error("Failed to write record {index} to {collection}: {source}")]
    Store {
        collection: String,
        index: usize,
        #[source]
        source: DatabaseError,
    },
}

impl LoaderError {
    /// Short tag used in the per-file log line.
    pub fn kind(&self) -> &'static str {
        match self {
            LoaderError::SeedDir { .. } => "seed_dir",
            LoaderError::FixtureIo { .. } => "fixture_io",
            LoaderError::FixtureParse { .. } => "fixture_parse",
            LoaderError::ReconciliationAmbiguous { .. } => "reconciliation_ambiguous",
            LoaderError::Store { .. } => "store",
        }
    }
}
