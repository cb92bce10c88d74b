use std::sync::Arc;

use anyhow::{bail, Context};
use fixture_loader::{FixtureLoader, LoaderConfig};
use shared::config::load_dotenv;
use shared::database::{DatabaseManager, PgDocumentStore};
use shared::observability::{init_logging, LogConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_logging(LogConfig::from_env("seed")?)?;

    let config = LoaderConfig::from_env()?;
    info!(
        seed_dir = %config.seed_dir.display(),
        policy = %config.on_missing_key,
        "Starting fixture load"
    );

    let database = DatabaseManager::connect(config.database.clone())
        .await
        .context("Failed to connect to the document store")?;
    let store = Arc::new(PgDocumentStore::new(database.pool()));

    let loader = FixtureLoader::new(store, config.on_missing_key);
    let report = loader.load_dir(&config.seed_dir).await;
    database.close().await;
    let report = report?;

    let failed: Vec<_> = report.failed().collect();
    if !failed.is_empty() {
        for file in &failed {
            error!(path = %file.path.display(), "Fixture not fully loaded");
        }
        bail!("{} of {} fixture file(s) failed", failed.len(), report.files.len());
    }

    Ok(())
}
