//! The version chain engine — creation, metadata updates, content
//! updates, and soft deletion.
//!
//! Content updates never mutate stored bytes: a new record is appended to
//! the chain and the previous latest is retired in the same database
//! transaction. Soft deletion stamps `deleted_at` and nothing else; there
//! is no undelete and no re-promotion of earlier versions.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use filevault_core::config::storage::StorageConfig;
use filevault_core::error::AppError;
use filevault_core::traits::content_store::ContentStore;
use filevault_database::repositories::file_record::FileRecordRepository;
use filevault_entity::file::record::{FileRecord, MetadataPatch, NewFileRecord};

/// Upload parameters shared by chain creation and content updates.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw content bytes.
    pub data: Bytes,
    /// MIME type as declared by the uploader, if any.
    pub content_type: Option<String>,
    /// Name the content was uploaded under.
    pub original_name: String,
    /// Explicit display name; defaults per operation when absent.
    pub display_name: Option<String>,
    /// Explicit description; inherited on content updates when absent.
    pub description: Option<String>,
    /// Explicit tags; inherited on content updates when absent.
    pub tags: Option<Vec<String>>,
}

/// The version chain engine.
#[derive(Clone)]
pub struct FileService {
    /// File record repository.
    repo: Arc<FileRecordRepository>,
    /// Content store for blob persistence.
    store: Arc<dyn ContentStore>,
    /// Storage configuration (upload limits).
    config: StorageConfig,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        repo: Arc<FileRecordRepository>,
        store: Arc<dyn ContentStore>,
        config: StorageConfig,
    ) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    /// Creates a fresh chain: persists content and writes version 1.
    ///
    /// The blob is written to the content store before the record insert,
    /// so a storage failure leaves no metadata behind.
    pub async fn create(&self, req: UploadRequest) -> Result<FileRecord, AppError> {
        let content_type = self.validate_upload(&req)?;

        let storage_key = self.store.put(req.data.clone()).await?;

        let id = Uuid::new_v4();
        let display_name = req
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| req.original_name.clone());

        let record = self
            .repo
            .insert_root(&NewFileRecord {
                id,
                chain_id: id,
                display_name,
                original_name: req.original_name,
                content_type,
                size_bytes: req.data.len() as i64,
                storage_key,
                version_number: 1,
                parent_id: None,
                description: req.description,
                tags: req.tags,
            })
            .await?;

        info!(
            file_id = %record.id,
            name = %record.display_name,
            size = record.size_bytes,
            "File created"
        );

        Ok(record)
    }

    /// Updates the mutable metadata of an active record in place.
    ///
    /// Absent patch fields are left unchanged; the version-chain fields
    /// (`version_number`, `parent_id`, `is_latest`, `storage_key`) are
    /// never touched by this path.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        patch: MetadataPatch,
    ) -> Result<FileRecord, AppError> {
        let record = self.require_active(id).await?;

        if patch.is_empty() {
            return Ok(record);
        }

        let display_name = match patch.display_name {
            Some(name) => {
                if name.trim().is_empty() {
                    return Err(AppError::validation("Display name cannot be empty"));
                }
                name
            }
            None => record.display_name,
        };
        let description = patch.description.or(record.description);
        let tags = patch.tags.or_else(|| record.tags.map(|t| t.0));

        let updated = self
            .repo
            .update_metadata(id, &display_name, description.as_deref(), tags.as_deref())
            .await?;

        info!(file_id = %id, "File metadata updated");
        Ok(updated)
    }

    /// Appends a new version to a chain.
    ///
    /// The anchor must be the chain's latest active record. The new
    /// version inherits display name, description, and tags unless the
    /// request overrides them. Retiring the old latest and inserting the
    /// new one happen in a single transaction; a lost race surfaces as a
    /// conflict.
    pub async fn update_content(
        &self,
        id: Uuid,
        req: UploadRequest,
    ) -> Result<FileRecord, AppError> {
        let previous = self.require_active(id).await?;
        if !previous.is_latest {
            return Err(AppError::not_latest(format!(
                "Record {id} is version {} but no longer the latest",
                previous.version_number
            )));
        }

        let content_type = self.validate_upload(&req)?;

        let storage_key = self.store.put(req.data.clone()).await?;

        let display_name = req
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(previous.display_name);
        let description = req.description.or(previous.description);
        let tags = req.tags.or_else(|| previous.tags.map(|t| t.0));

        let record = self
            .repo
            .insert_version(&NewFileRecord {
                id: Uuid::new_v4(),
                chain_id: previous.chain_id,
                display_name,
                original_name: req.original_name,
                content_type,
                size_bytes: req.data.len() as i64,
                storage_key,
                version_number: previous.version_number + 1,
                parent_id: Some(previous.id),
                description,
                tags,
            })
            .await?;

        info!(
            file_id = %record.id,
            parent_id = %id,
            version = record.version_number,
            "File content updated"
        );

        Ok(record)
    }

    /// Soft-deletes a record.
    ///
    /// Rejects a second delete with `AlreadyDeleted` so callers can tell
    /// "never existed" from "already gone". The first delete's timestamp
    /// is never overwritten. The chain's latest pointer is deliberately
    /// not recomputed.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        if record.deleted_at.is_some() {
            return Err(AppError::already_deleted(format!(
                "File {id} is already deleted"
            )));
        }

        let deleted = self.repo.soft_delete(id, chrono::Utc::now()).await?;
        if !deleted {
            // Another caller deleted it between the read and the write.
            return Err(AppError::already_deleted(format!(
                "File {id} is already deleted"
            )));
        }

        info!(file_id = %id, "File soft-deleted");
        Ok(())
    }

    /// Loads a record, mapping absence and soft deletion to their error kinds.
    async fn require_active(&self, id: Uuid) -> Result<FileRecord, AppError> {
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

    /// Validates upload content and resolves its MIME type.
    fn validate_upload(&self, req: &UploadRequest) -> Result<String, AppError> {
        if req.data.is_empty() {
            return Err(AppError::validation("File content cannot be empty"));
        }
        if req.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        if req.original_name.trim().is_empty() {
            return Err(AppError::validation("Original file name is required"));
        }

        req.content_type
            .clone()
            .filter(|ct| !ct.trim().is_empty())
            .or_else(|| mime_from_name(&req.original_name))
            .ok_or_else(|| AppError::validation("Could not determine content type"))
    }
}

/// Guess MIME type from a file name extension.
fn mime_from_name(name: &str) -> Option<String> {
    let ext = name.rsplit('.').next()?.to_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(mime.to_string())
}
