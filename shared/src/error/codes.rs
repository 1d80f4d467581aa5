//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Account errors
//! - 4xxx: Form template / field errors
//! - 5xxx: Record errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can branch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource already exists
    AlreadyExists = 4,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Refresh token unknown, revoked or expired
    RefreshTokenInvalid = 1005,
    /// Account is disabled
    AccountDisabled = 1006,

    // ==================== 3xxx: Account ====================
    /// Username already taken
    UsernameExists = 3001,
    /// Email already registered
    EmailExists = 3002,
    /// Password shorter than the configured minimum
    PasswordTooShort = 3003,
    /// Password and confirmation differ
    PasswordMismatch = 3004,
    /// Old password did not match on change-password
    InvalidOldPassword = 3005,
    /// User not found
    UserNotFound = 3006,

    // ==================== 4xxx: Form ====================
    /// Form template not found (or not owned by the caller)
    TemplateNotFound = 4001,
    /// Form field not found (or not owned by the caller)
    FieldNotFound = 4002,
    /// Field options are not a structured map
    InvalidFieldOptions = 4003,
    /// Reorder payload is empty
    ReorderEmpty = 4004,

    // ==================== 5xxx: Record ====================
    /// Record not found (or not owned by the caller)
    RecordNotFound = 5001,
    /// Record references a template that does not exist or is not usable
    RecordTemplateInvalid = 5002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::AlreadyExists => "Resource already exists",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::RefreshTokenInvalid => "Refresh token is invalid or expired",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Account
            ErrorCode::UsernameExists => "A user with that username already exists",
            ErrorCode::EmailExists => "A user with that email already exists",
            ErrorCode::PasswordTooShort => "Password is too short",
            ErrorCode::PasswordMismatch => "Password fields didn't match",
            ErrorCode::InvalidOldPassword => "Invalid old password",
            ErrorCode::UserNotFound => "User not found",

            // Form
            ErrorCode::TemplateNotFound => "Form template not found",
            ErrorCode::FieldNotFound => "Form field not found",
            ErrorCode::InvalidFieldOptions => "Field options must be an object",
            ErrorCode::ReorderEmpty => "field_orders must not be empty",

            // Record
            ErrorCode::RecordNotFound => "Record not found",
            ErrorCode::RecordTemplateInvalid => "Invalid form template",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            4 => Ok(ErrorCode::AlreadyExists),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::RefreshTokenInvalid),
            1006 => Ok(ErrorCode::AccountDisabled),

            // Account
            3001 => Ok(ErrorCode::UsernameExists),
            3002 => Ok(ErrorCode::EmailExists),
            3003 => Ok(ErrorCode::PasswordTooShort),
            3004 => Ok(ErrorCode::PasswordMismatch),
            3005 => Ok(ErrorCode::InvalidOldPassword),
            3006 => Ok(ErrorCode::UserNotFound),

            // Form
            4001 => Ok(ErrorCode::TemplateNotFound),
            4002 => Ok(ErrorCode::FieldNotFound),
            4003 => Ok(ErrorCode::InvalidFieldOptions),
            4004 => Ok(ErrorCode::ReorderEmpty),

            // Record
            5001 => Ok(ErrorCode::RecordNotFound),
            5002 => Ok(ErrorCode::RecordTemplateInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
