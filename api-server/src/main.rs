use std::sync::Arc;

use anyhow::{Context, Result};
use shared::config::load_dotenv;
use shared::database::{DatabaseManager, DocumentStore, PgDocumentStore};
use shared::observability::{init_logging, LogConfig};
use shared::storage::StorageGateway;
use tokio::net::TcpListener;
use tracing::info;

mod config;
mod handlers;
mod middleware;
mod routes;
mod utils;

use config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentStore>,
    pub storage: Arc<StorageGateway>,
    pub config: Arc<AppConfig>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received, starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    init_logging(LogConfig::from_env("api-server")?)?;

    info!("Starting Real Deal API server v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let database = DatabaseManager::connect(config.database.clone())
        .await
        .context("Failed to connect to the document store")?;

    let storage = StorageGateway::connect(&config.storage)
        .await
        .context("Failed to configure object storage")?;
    storage
        .ensure_bucket()
        .await
        .context("Object storage bucket is not available")?;

    let addr = config.server.addr;
    let state = AppState {
        documents: Arc::new(PgDocumentStore::new(database.pool())),
        storage: Arc::new(storage),
        config: Arc::new(config),
    };

    let app = routes::create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    database.close().await;
    info!("API server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests;
