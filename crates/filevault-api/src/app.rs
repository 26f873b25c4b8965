//! Application builder that wires state, services, and the router into a
//! runnable Axum app.

use std::sync::Arc;

use axum::Router;

use filevault_core::config::AppConfig;
use filevault_core::error::AppError;
use filevault_core::traits::content_store::ContentStore;
use filevault_database::repositories::file_record::FileRecordRepository;
use filevault_service::file::{DownloadService, FileService, QueryService};
use filevault_storage::local::LocalContentStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application from a fully-constructed state.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the FileVault server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FileVault server...");

    create_data_directories(&config).await?;

    let db_pool = filevault_database::connection::create_pool(&config.database).await?;

    tracing::info!("Running database migrations...");
    filevault_database::migration::run_migrations(&db_pool).await?;

    let store: Arc<dyn ContentStore> =
        Arc::new(LocalContentStore::new(&config.storage.root_path).await?);

    let repo = Arc::new(FileRecordRepository::new(db_pool.clone()));

    let file_service = Arc::new(FileService::new(
        Arc::clone(&repo),
        Arc::clone(&store),
        config.storage.clone(),
    ));
    let download_service = Arc::new(DownloadService::new(Arc::clone(&repo), Arc::clone(&store)));
    let query_service = Arc::new(QueryService::new(Arc::clone(&repo)));

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        file_service,
        download_service,
        query_service,
    };

    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("FileVault server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

/// Create the blob root and the database file's parent directory.
async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let mut dirs = vec![config.storage.root_path.clone()];
    if let Some(path) = config.database.url.strip_prefix("sqlite://") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                dirs.push(parent.display().to_string());
            }
        }
    }

    for dir in &dirs {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create dir '{dir}': {e}")))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
    }
}
