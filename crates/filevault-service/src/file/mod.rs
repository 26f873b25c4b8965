//! File services: version chain engine, download, and queries.

pub mod download;
pub mod query;
pub mod service;

pub use download::{DownloadResult, DownloadService};
pub use query::QueryService;
pub use service::{FileService, UploadRequest};
