//! Query/listing layer — current visible files and chain histories.

use std::sync::Arc;

use uuid::Uuid;

use filevault_core::error::AppError;
use filevault_database::repositories::file_record::FileRecordRepository;
use filevault_entity::file::record::FileRecord;

/// Read-only queries over file records with visibility filtering.
#[derive(Debug, Clone)]
pub struct QueryService {
    /// File record repository.
    repo: Arc<FileRecordRepository>,
}

impl QueryService {
    /// Creates a new query service.
    pub fn new(repo: Arc<FileRecordRepository>) -> Self {
        Self { repo }
    }

    /// Lists the current visible files: exactly the latest active record
    /// of each chain, in a stable order (`created_at`, then `id`).
    pub async fn list_current(&self) -> Result<Vec<FileRecord>, AppError> {
        self.repo.list_current().await
    }

    /// Fetches a single record by id, treating deleted records as hidden.
    pub async fn get_active(&self, id: Uuid) -> Result<FileRecord, AppError> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        if record.deleted_at.is_some() {
            return Err(AppError::deleted(format!("File {id} has been deleted")));
        }

        Ok(record)
    }

    /// Lists the version history of the chain containing `id`.
    ///
    /// Any record of the chain may serve as the anchor. A deleted anchor
    /// hides the chain and reads as not-found; deleted historical
    /// versions are dropped from the listing while the chain itself stays
    /// visible.
    pub async fn list_versions(&self, id: Uuid) -> Result<Vec<FileRecord>, AppError> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        if record.deleted_at.is_some() {
            return Err(AppError::not_found(format!("File {id} not found")));
        }

        self.repo.find_chain(record.chain_id).await
    }
}
