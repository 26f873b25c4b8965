//! # filevault-api
//!
//! HTTP API layer for FileVault built on Axum.
//!
//! Provides the REST endpoints, DTOs, error mapping, and the application
//! builder that wires configuration, database, storage, and services into
//! a running server.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
