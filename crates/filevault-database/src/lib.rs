//! # filevault-database
//!
//! SQLite connection management, migrations, and repository
//! implementations for FileVault. All SQL lives in this crate.

pub mod connection;
pub mod migration;
pub mod repositories;
