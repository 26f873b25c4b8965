//! File domain entities.

pub mod record;

pub use record::{FileRecord, MetadataPatch, NewFileRecord};
