//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use filevault_core::config::AppConfig;
use filevault_service::file::{DownloadService, FileService, QueryService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// SQLite connection pool.
    pub db_pool: SqlitePool,
    /// Version chain engine.
    pub file_service: Arc<FileService>,
    /// Content download service.
    pub download_service: Arc<DownloadService>,
    /// Listing/query service.
    pub query_service: Arc<QueryService>,
}
