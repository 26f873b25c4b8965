//! # filevault-service
//!
//! Business logic services for FileVault. The [`file`] module holds the
//! version chain engine (create, metadata update, content update, soft
//! delete), the download path, and the query/listing layer.

pub mod file;
