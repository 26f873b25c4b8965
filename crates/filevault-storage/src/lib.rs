//! # filevault-storage
//!
//! Content store implementations for FileVault. The [`ContentStore`]
//! trait itself lives in `filevault-core`; this crate provides the local
//! filesystem backend.
//!
//! [`ContentStore`]: filevault_core::traits::ContentStore

pub mod local;

pub use local::LocalContentStore;
