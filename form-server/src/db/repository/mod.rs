//! Repository Module
//!
//! Free async functions over `&SqlitePool` (or a `&mut SqliteConnection`
//! inside a transaction). Every read and write of owned data takes the
//! caller's user id and filters on it.

// Auth
pub mod refresh_token;
pub mod user;

// Forms
pub mod form_field;
pub mod form_template;

// Records
pub mod employee;

use shared::ErrorCode;
use std::fmt;
use thiserror::Error;

/// Entity kinds reported by [`RepoError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    FormTemplate,
    FormField,
    Employee,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::FormTemplate => "form template",
            Self::FormField => "form field",
            Self::Employee => "employee record",
        };
        f.write_str(name)
    }
}

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    /// Missing, or owned by another user
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Business rule rejected the input; `field` names the offending input key
    #[error("Invalid {field}: {code}")]
    Invalid { code: ErrorCode, field: &'static str },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
