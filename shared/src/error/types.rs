//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Error returned by every handler and repository call.
///
/// `details` carries field-level messages (`field -> [messages]`) for
/// validation failures; it is omitted from the envelope when empty.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the stock message of `code`
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach (or replace) one entry in `details`
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ---- shorthands ----

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// No (or unreadable) credentials on a protected route
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Wrong username or password; never says which
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }
}

/// Flatten nested validator errors into `field -> [messages]`.
///
/// Nested structs use `parent.child`, list items use `parent[index].child`.
fn collect_validation_errors(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut HashMap<String, Value>,
) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages = errs
                    .iter()
                    .map(|e| {
                        Value::String(
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("invalid ({})", e.code)),
                        )
                    })
                    .collect();
                out.insert(key, Value::Array(messages));
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_validation_errors(&format!("{key}[{idx}]"), inner, out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = HashMap::new();
        collect_validation_errors("", &errors, &mut details);
        Self {
            code: ErrorCode::ValidationFailed,
            message: ErrorCode::ValidationFailed.message().to_string(),
            details: Some(details),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, rejection.body_text())
    }
}

/// JSON envelope of every error response: `{code, message, details?}`.
///
/// Successful responses are the bare resource, not wrapped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== axum =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::error(&self);

        // 5xx only
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Child {
        #[validate(length(min = 1, message = "label must not be empty"))]
        label: String,
    }

    #[derive(Validate)]
    struct Parent {
        #[validate(length(min = 1, max = 5))]
        name: String,
        #[validate(nested)]
        children: Vec<Child>,
    }

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::TemplateNotFound);
        assert_eq!(err.code, ErrorCode::TemplateNotFound);
        assert_eq!(err.message, "Form template not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::with_message(ErrorCode::ValidationFailed, "Missing required fields")
            .with_detail("field", "name")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "name");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_app_error_http_status() {
        assert_eq!(
            AppError::new(ErrorCode::RecordNotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthorized().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::new(ErrorCode::InvalidFieldOptions).http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let parent = Parent {
            name: "too long name".to_string(),
            children: vec![
                Child {
                    label: "ok".to_string(),
                },
                Child {
                    label: String::new(),
                },
            ],
        };
        let err: AppError = parent.validate().unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let details = err.details.unwrap();
        assert!(details.contains_key("name"));
        assert_eq!(
            details.get("children[1].label").unwrap(),
            &serde_json::json!(["label must not be empty"])
        );
        assert!(!details.contains_key("children[0].label"));
    }

    #[test]
    fn test_api_response_error() {
        let err = AppError::with_message(ErrorCode::TemplateNotFound, "Template not found")
            .with_detail("id", 12);
        let response = ApiResponse::error(&err);

        assert_eq!(response.code, 4001);
        assert_eq!(response.message, "Template not found");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_api_response_omits_empty_details() {
        let json = serde_json::to_value(ApiResponse::error(&AppError::unauthorized())).unwrap();
        assert_eq!(json["code"], 1001);
        assert!(json.get("details").is_none());
    }
}
