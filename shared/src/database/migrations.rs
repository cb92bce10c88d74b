//! Embedded schema migrations
use sqlx::postgres::PgPool;
use tracing::info;

use super::{DatabaseError, DatabaseResult};

/// Check if migrations table exists
pub async fn migrations_table_exists(pool: &PgPool) -> DatabaseResult<bool> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::Connection)?;

    Ok(row.0)
}

async fn applied_migrations_count(pool: &PgPool) -> DatabaseResult<i64> {
    if !migrations_table_exists(pool).await? {
        return Ok(0);
    }

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::Connection)?;

    Ok(count)
}

/// Run migrations and return the number of migrations applied
pub async fn run_migrations(pool: &PgPool) -> DatabaseResult<i64> {
    info!("Running database migrations...");

    let before = applied_migrations_count(pool).await?;

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    let applied = applied_migrations_count(pool).await? - before;

    if applied > 0 {
        info!("Successfully applied {} migration(s)", applied);
    } else {
        info!("No new migrations to apply");
    }

    Ok(applied)
}
