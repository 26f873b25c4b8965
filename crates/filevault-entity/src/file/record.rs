//! File record entity model.
//!
//! One row per *version*, not per logical file. A logical file is the
//! chain of records sharing a `chain_id`, linked by `parent_id` and
//! numbered `1, 2, 3, …` with no gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// One version of a logical file stored in FileVault.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Chain key shared by every version of the same logical file.
    /// Equals the `id` of version 1.
    pub chain_id: Uuid,
    /// User-facing name, mutable.
    pub display_name: String,
    /// Name the content carried when this version was uploaded.
    pub original_name: String,
    /// MIME type of this version's content.
    pub content_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Opaque content-store key for this version's bytes.
    pub storage_key: String,
    /// Sequential version number, starting at 1.
    pub version_number: i32,
    /// The immediately preceding version in the chain, if any.
    pub parent_id: Option<Uuid>,
    /// Whether this record is the chain's current latest version.
    pub is_latest: bool,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Optional tags, stored as a JSON array.
    pub tags: Option<Json<Vec<String>>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
    /// When the record was soft-deleted; `None` means active.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Whether this record is active (not soft-deleted).
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Whether this record is the latest *active* version of its chain.
    pub fn is_current(&self) -> bool {
        self.is_latest && self.is_active()
    }

    /// Get the file extension of the original name (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.original_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.original_name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to insert a new file record.
///
/// Used both for version 1 of a fresh chain and for subsequent versions
/// created by a content update; the engine fills in the version-chain
/// fields in each case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileRecord {
    /// Record identifier, generated by the engine.
    pub id: Uuid,
    /// Chain key.
    pub chain_id: Uuid,
    /// User-facing name.
    pub display_name: String,
    /// Name at upload time.
    pub original_name: String,
    /// MIME type.
    pub content_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Content-store key.
    pub storage_key: String,
    /// Version number.
    pub version_number: i32,
    /// Previous version, if any.
    pub parent_id: Option<Uuid>,
    /// Description.
    pub description: Option<String>,
    /// Tags.
    pub tags: Option<Vec<String>>,
}

/// Partial update of the mutable, version-independent fields.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// New user-facing name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New tags.
    pub tags: Option<Vec<String>>,
}

impl MetadataPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.description.is_none() && self.tags.is_none()
    }
}
