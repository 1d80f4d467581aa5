//! Shared types for the form builder
//!
//! Domain models, auth DTOs, and the unified error system used by
//! `form-server` and any client talking to its API.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
