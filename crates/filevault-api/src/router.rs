//! Route definitions for the FileVault HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to the handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(file_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// File upload, download, metadata, versions, and deletion
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::file::list_files))
        .route("/files", post(handlers::file::upload_file))
        .route("/files/{id}", get(handlers::file::get_file))
        .route("/files/{id}", put(handlers::file::update_file))
        .route("/files/{id}", delete(handlers::file::delete_file))
        .route("/files/{id}/download", get(handlers::file::download_file))
        .route("/files/{id}/versions", get(handlers::file::list_versions))
}

/// Health check endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}
