//! Data models
//!
//! Shared between form-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod employee;
pub mod form_template;
pub mod user;

// Re-exports
pub use employee::*;
pub use form_template::*;
pub use user::*;
