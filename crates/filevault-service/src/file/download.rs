//! File download service — resolves a record and fetches its bytes from
//! the content store.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use filevault_core::error::AppError;
use filevault_core::traits::content_store::ContentStore;
use filevault_database::repositories::file_record::FileRecordRepository;
use filevault_entity::file::record::FileRecord;

/// Handles content retrieval for active records.
#[derive(Clone)]
pub struct DownloadService {
    /// File record repository.
    repo: Arc<FileRecordRepository>,
    /// Content store.
    store: Arc<dyn ContentStore>,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

/// Result containing record metadata and content bytes for a download.
#[derive(Debug)]
pub struct DownloadResult {
    /// The resolved record.
    pub record: FileRecord,
    /// Content bytes.
    pub data: Bytes,
    /// MIME type for the Content-Type header.
    pub content_type: String,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(repo: Arc<FileRecordRepository>, store: Arc<dyn ContentStore>) -> Self {
        Self { repo, store }
    }

    /// Downloads the content of an active record.
    ///
    /// Any active version may be fetched by id, latest or not; deleted
    /// records read as gone.
    pub async fn get_content(&self, id: Uuid) -> Result<DownloadResult, AppError> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        if record.deleted_at.is_some() {
            return Err(AppError::deleted(format!("File {id} has been deleted")));
        }

        let data = self.store.get(&record.storage_key).await?;

        Ok(DownloadResult {
            content_type: record.content_type.clone(),
            filename: record.display_name.clone(),
            record,
            data,
        })
    }
}
