use std::time::Duration;
use sqlx::{
    migrate::MigrateDatabase,
    postgres::{PgPool, PgPoolOptions},
    Postgres,
};
use tracing::{debug, error, info, warn};

use super::{migrations, DatabaseConfig, DatabaseError, DatabaseResult};

/// Type alias for the database pool
pub type DbPool = PgPool;

/// Owns the connection pool. Built once at startup and handed to whatever
/// needs it; there is no process-wide pool.
#[derive(Debug)]
pub struct DatabaseManager {
    pool: DbPool,
}

impl DatabaseManager {
    /// Connect, creating the database if needed, and bring the schema up to date
    pub async fn connect(config: DatabaseConfig) -> DatabaseResult<Self> {
        let pool = create_connection_pool(&config).await?;
        migrations::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Get a handle to the connection pool
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub async fn close(&self) {
        close_connections(&self.pool).await;
    }
}

/// Create a new connection pool with the given configuration
pub async fn create_connection_pool(config: &DatabaseConfig) -> DatabaseResult<DbPool> {
    info!("Creating database connection pool...");
    debug!(database = %config.database_name, "Database config");

    let database_url = config.database_url()?;

    // Ensure database exists
    ensure_database_exists(&database_url, &config.database_name).await?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout)))
        .max_lifetime(Some(Duration::from_secs(1800))) // 30 minutes
        .test_before_acquire(true)
        .connect(&database_url)
        .await
        .map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            DatabaseError::Connection(e)
        })?;

    info!(
        "Database connection pool created successfully with {} max connections",
        config.max_connections
    );

    Ok(pool)
}

/// Test database connection
pub async fn test_connection(pool: &DbPool) -> DatabaseResult<()> {
    debug!("Testing database connection...");

    let row: (i32,) = sqlx::query_as("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            error!("Database connection test failed: {}", e);
            DatabaseError::Connection(e)
        })?;

    if row.0 != 1 {
        return Err(DatabaseError::Query(
            "Unexpected result from connection test".to_string(),
        ));
    }

    debug!("Database connection test successful");
    Ok(())
}

/// Ensure the database exists, create if it doesn't
async fn ensure_database_exists(database_url: &str, database_name: &str) -> DatabaseResult<()> {
    debug!("Checking if database '{}' exists...", database_name);

    let exists = Postgres::database_exists(database_url).await.map_err(|e| {
        error!("Failed to check database '{}': {}", database_name, e);
        DatabaseError::Connection(e)
    })?;

    if !exists {
        info!("Database '{}' does not exist, creating...", database_name);

        Postgres::create_database(database_url).await.map_err(|e| {
            error!("Failed to create database '{}': {}", database_name, e);
            DatabaseError::Migration(format!("Failed to create database: {}", e))
        })?;

        info!("Database '{}' created successfully", database_name);
    } else {
        debug!("Database '{}' already exists", database_name);
    }

    Ok(())
}

/// Connection health check
pub async fn health_check(pool: &DbPool) -> bool {
    match test_connection(pool).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Database health check failed: {}", e);
            false
        }
    }
}

/// Close database connections gracefully
pub async fn close_connections(pool: &DbPool) {
    info!("Closing database connections...");
    pool.close().await;
    info!("Database connections closed");
}
