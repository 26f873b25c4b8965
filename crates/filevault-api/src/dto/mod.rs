//! Request/response DTOs.

pub mod response;

pub use response::{ApiResponse, HealthResponse};
