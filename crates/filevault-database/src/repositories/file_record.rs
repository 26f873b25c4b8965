//! File record repository implementation.
//!
//! Owns every SQL statement touching the `file_records` table, including
//! the transactional latest-pointer handoff used by content updates.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_entity::file::record::{FileRecord, NewFileRecord};

/// Repository for file record CRUD and chain queries.
#[derive(Debug, Clone)]
pub struct FileRecordRepository {
    pool: SqlitePool,
}

impl FileRecordRepository {
    /// Create a new file record repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a record by ID, including soft-deleted ones.
    ///
    /// Lifecycle filtering (active/deleted/latest) is the engine's job;
    /// the repository reports what is stored.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM file_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find record", e))
    }

    /// Insert the root record of a fresh chain (version 1).
    pub async fn insert_root(&self, data: &NewFileRecord) -> AppResult<FileRecord> {
        let now = Utc::now();
        sqlx::query_as::<_, FileRecord>(
            "INSERT INTO file_records \
             (id, chain_id, display_name, original_name, content_type, size_bytes, storage_key, \
              version_number, parent_id, is_latest, description, tags, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.id)
        .bind(data.chain_id)
        .bind(&data.display_name)
        .bind(&data.original_name)
        .bind(&data.content_type)
        .bind(data.size_bytes)
        .bind(&data.storage_key)
        .bind(data.version_number)
        .bind(data.parent_id)
        .bind(true)
        .bind(&data.description)
        .bind(data.tags.clone().map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert record", e))
    }

    /// Insert a new version and retire its parent in one transaction.
    ///
    /// The parent flip is a guarded update on `is_latest`; if another
    /// writer already superseded (or deleted) the parent, zero rows match
    /// and the whole transaction rolls back with a conflict. This is what
    /// keeps `count(is_latest AND active) <= 1` per chain.
    pub async fn insert_version(&self, data: &NewFileRecord) -> AppResult<FileRecord> {
        let parent_id = data
            .parent_id
            .ok_or_else(|| AppError::internal("insert_version requires a parent record"))?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let now = Utc::now();
        let flipped = sqlx::query(
            "UPDATE file_records SET is_latest = 0, updated_at = ? \
             WHERE id = ? AND is_latest = 1 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(parent_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to retire previous version", e)
        })?;

        if flipped.rows_affected() != 1 {
            // Dropping the transaction rolls it back.
            return Err(AppError::conflict(format!(
                "Record {parent_id} is no longer the latest version"
            )));
        }

        let record = sqlx::query_as::<_, FileRecord>(
            "INSERT INTO file_records \
             (id, chain_id, display_name, original_name, content_type, size_bytes, storage_key, \
              version_number, parent_id, is_latest, description, tags, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.id)
        .bind(data.chain_id)
        .bind(&data.display_name)
        .bind(&data.original_name)
        .bind(&data.content_type)
        .bind(data.size_bytes)
        .bind(&data.storage_key)
        .bind(data.version_number)
        .bind(data.parent_id)
        .bind(true)
        .bind(&data.description)
        .bind(data.tags.clone().map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert version", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit version", e)
        })?;

        Ok(record)
    }

    /// Update the mutable metadata fields of a record in place.
    ///
    /// The caller passes the fully resolved values; partial-patch
    /// semantics live in the engine.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        display_name: &str,
        description: Option<&str>,
        tags: Option<&[String]>,
    ) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "UPDATE file_records SET display_name = ?, description = ?, tags = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL RETURNING *",
        )
        .bind(display_name)
        .bind(description)
        .bind(tags.map(|t| Json(t.to_vec())))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update metadata", e))?
        .ok_or_else(|| AppError::not_found(format!("Record {id} not found")))
    }

    /// Soft-delete a record by stamping `deleted_at`.
    ///
    /// Guarded on `deleted_at IS NULL` so a first delete's timestamp is
    /// never overwritten; returns `false` when no active row matched.
    pub async fn soft_delete(&self, id: Uuid, deleted_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE file_records SET deleted_at = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(deleted_at)
        .bind(deleted_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to soft-delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// List the current visible files: latest, active, one per chain.
    ///
    /// Ordered by `created_at` then `id` for a stable total order.
    pub async fn list_current(&self) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM file_records \
             WHERE is_latest = 1 AND deleted_at IS NULL \
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    /// List all active versions of a chain, ascending by version number.
    pub async fn find_chain(&self, chain_id: Uuid) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM file_records \
             WHERE chain_id = ? AND deleted_at IS NULL \
             ORDER BY version_number ASC",
        )
        .bind(chain_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    /// Count records currently flagged latest-and-active in a chain.
    ///
    /// Diagnostic query used by the invariant tests.
    pub async fn count_current_in_chain(&self, chain_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM file_records \
             WHERE chain_id = ? AND is_latest = 1 AND deleted_at IS NULL",
        )
        .bind(chain_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count chain", e))
    }

    /// Count all records.
    pub async fn count_all(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM file_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count records", e))
    }
}
