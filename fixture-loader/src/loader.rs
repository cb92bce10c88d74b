//! Directory walk and per-file reconciliation
//!
//! Files are processed one at a time in name order and records in file
//! order. A failing file is reported and skipped; a failing record aborts the
//! rest of its file but leaves earlier records written. Nothing is ever
//! deleted, so documents absent from the fixtures survive a run.
//!
//! Two loaders over the same store must not run at once: each upsert is
//! atomic, but the find-then-write of concurrent runs can race into
//! duplicates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared::database::{DocumentStore, UpsertOutcome};
use shared::types::Document;
use tracing::{debug, error, info, warn};

use crate::error::LoaderError;
use crate::reconcile::{reconciliation_filter, MissingKeyPolicy};
use crate::routing::collection_name;

/// Writes done for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    pub inserted: usize,
    pub updated: usize,
}

impl FileStats {
    pub fn records(&self) -> usize {
        self.inserted + self.updated
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }
}

/// Result of loading one fixture file. `stats` counts the writes that went
/// through even when `error` is set.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub collection: String,
    pub stats: FileStats,
    pub error: Option<LoaderError>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub files: Vec<FileOutcome>,
}

impl LoadReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| !f.is_ok())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn totals(&self) -> FileStats {
        self.files.iter().fold(FileStats::default(), |acc, f| FileStats {
            inserted: acc.inserted + f.stats.inserted,
            updated: acc.updated + f.stats.updated,
        })
    }

    pub fn outcome(&self, collection: &str) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.collection == collection)
    }
}

pub struct FixtureLoader {
    store: Arc<dyn DocumentStore>,
    policy: MissingKeyPolicy,
}

impl FixtureLoader {
    pub fn new(store: Arc<dyn DocumentStore>, policy: MissingKeyPolicy) -> Self {
        Self { store, policy }
    }

    /// Load every regular file in `dir`. Only a failure to list the directory
    /// is returned as an error; per-file failures land in the report.
    pub async fn load_dir(&self, dir: &Path) -> Result<LoadReport, LoaderError> {
        let files = list_fixture_files(dir).await?;
        info!(
            dir = %dir.display(),
            files = files.len(),
            policy = %self.policy,
            "Loading fixtures"
        );

        let mut report = LoadReport::default();
        for path in files {
            report.files.push(self.load_file(&path).await);
        }

        let totals = report.totals();
        info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            inserted = totals.inserted,
            updated = totals.updated,
            "Fixture load finished"
        );
        Ok(report)
    }

    /// Load one fixture file into the collection its name routes to.
    pub async fn load_file(&self, path: &Path) -> FileOutcome {
        let collection = collection_name(path);
        let mut stats = FileStats::default();
        let result = self.reconcile_file(path, &collection, &mut stats).await;

        match &result {
            Ok(()) => info!(
                path = %path.display(),
                collection = %collection,
                inserted = stats.inserted,
                updated = stats.updated,
                "seeded"
            ),
            Err(e) => error!(
                path = %path.display(),
                collection = %collection,
                kind = e.kind(),
                written = stats.records(),
                error = %e,
                "seed failed"
            ),
        }

        FileOutcome {
            path: path.to_path_buf(),
            collection,
            stats,
            error: result.err(),
        }
    }

    async fn reconcile_file(
        &self,
        path: &Path,
        collection: &str,
        stats: &mut FileStats,
    ) -> Result<(), LoaderError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|source| LoaderError::FixtureIo {
                path: path.to_path_buf(),
                source,
            })?;

        let records: Vec<Document> =
            serde_json::from_slice(&raw).map_err(|source| LoaderError::FixtureParse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), records = records.len(), "Parsed fixture");

        for (index, record) in records.iter().enumerate() {
            let filter = reconciliation_filter(collection, record, self.policy).ok_or_else(|| {
                LoaderError::ReconciliationAmbiguous {
                    collection: collection.to_string(),
                    index,
                }
            })?;

            let outcome = self
                .store
                .upsert(collection, &filter, record)
                .await
                .map_err(|source| LoaderError::Store {
                    collection: collection.to_string(),
                    index,
                    source,
                })?;
            stats.record(outcome);
        }

        Ok(())
    }
}

/// Regular files of `dir` sorted by name. Directories are skipped.
async fn list_fixture_files(dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
    let seed_dir_error = |source| LoaderError::SeedDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(seed_dir_error)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(seed_dir_error)? {
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => {
                debug!(path = %entry.path().display(), "Skipping directory");
            }
            Ok(_) => files.push(entry.path()),
            Err(e) => {
                // Let the read report it as a per-file failure.
                warn!(path = %entry.path().display(), error = %e, "Could not stat fixture");
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}
