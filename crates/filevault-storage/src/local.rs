//! Local filesystem content store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::content_store::ContentStore;

/// Local filesystem content store.
///
/// Keys are freshly generated UUIDs sharded into two directory levels so
/// no single directory grows unbounded. Blobs are never rewritten or
/// removed; the store is append-only.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalContentStore {
    /// Create a new local content store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a storage key to an absolute path within the root.
    fn resolve(&self, key: &str) -> PathBuf {
        let clean = key.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Allocate a fresh sharded storage key.
    fn allocate_key() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}/{}/{}", &id[..2], &id[2..4], id)
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    fn store_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put(&self, data: Bytes) -> AppResult<String> {
        let key = Self::allocate_key();
        let full_path = self.resolve(&key);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob: {key}"), e)
        })?;

        debug!(key, bytes = data.len(), "Wrote blob");
        Ok(key)
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(key);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::new(ErrorKind::Storage, format!("Blob not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob: {key}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }
}
