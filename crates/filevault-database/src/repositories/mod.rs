//! Repository implementations.

pub mod file_record;

pub use file_record::FileRecordRepository;
