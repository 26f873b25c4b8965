//! Content store trait — the byte-storage collaborator keyed by opaque
//! storage keys.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for content-blob storage backends.
///
/// The store is append-only from the engine's perspective: `put` always
/// allocates a fresh key and no key is ever rewritten. Version history
/// therefore keeps every blob it has ever referenced.
///
/// The trait is defined here in `filevault-core` and implemented in
/// `filevault-storage`.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the store type name (e.g., "local").
    fn store_type(&self) -> &str;

    /// Check whether the store is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Persist a blob and return the newly allocated storage key.
    async fn put(&self, data: Bytes) -> AppResult<String>;

    /// Retrieve the blob for a previously returned storage key.
    async fn get(&self, key: &str) -> AppResult<Bytes>;
}
