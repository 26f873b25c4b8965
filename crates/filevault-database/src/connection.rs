//! SQLite connection pool management.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::info;

use filevault_core::config::database::DatabaseConfig;
use filevault_core::error::{AppError, ErrorKind};

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    info!(
        url = %config.url,
        max_connections = config.max_connections,
        "Connecting to SQLite"
    );

    let opts = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Invalid database URL '{}': {e}", config.url),
                e,
            )
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        // Prevent transient "database is locked" errors under concurrent access.
        .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to connect to database: {e}"),
                e,
            )
        })?;

    info!("Successfully connected to SQLite");
    Ok(pool)
}

/// Create an in-memory pool, used by the test suites.
///
/// SQLite gives every connection its own private in-memory database, so
/// the pool is capped at a single connection.
pub async fn create_memory_pool() -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Invalid memory URL", e))?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to open in-memory database: {e}"),
                e,
            )
        })
}

/// Check database connectivity.
pub async fn health_check(pool: &SqlitePool) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|v| v == 1)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
}
