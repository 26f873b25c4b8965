//! Trait definitions shared across FileVault crates.

pub mod content_store;

pub use content_store::ContentStore;
