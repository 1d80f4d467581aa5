//! 统一错误处理
//!
//! 错误类型来自 `shared::error`，这里只负责把仓储层错误映射为 [`AppError`]。
//!
//! | RepoError | ErrorCode | HTTP |
//! |-----------|-----------|------|
//! | NotFound(FormTemplate) | TemplateNotFound | 404 |
//! | NotFound(FormField) | FieldNotFound | 404 |
//! | NotFound(Employee) | RecordNotFound | 404 |
//! | NotFound(User) | UserNotFound | 404 |
//! | Duplicate | AlreadyExists | 409 |
//! | Invalid { code, field } | code | 400 |
//! | Database | DatabaseError | 500 |

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::repository::{Entity, RepoError};
use serde_json::Value;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(entity) => AppError::new(match entity {
                Entity::FormTemplate => ErrorCode::TemplateNotFound,
                Entity::FormField => ErrorCode::FieldNotFound,
                Entity::Employee => ErrorCode::RecordNotFound,
                Entity::User => ErrorCode::UserNotFound,
            }),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Invalid { code, field } => AppError::new(code).with_detail(
                field,
                Value::Array(vec![Value::String(code.message().to_string())]),
            ),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database operation failed");
                AppError::database("Database error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_not_found_mapping() {
        let err: AppError = RepoError::NotFound(Entity::FormTemplate).into();
        assert_eq!(err.code, ErrorCode::TemplateNotFound);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);

        let err: AppError = RepoError::NotFound(Entity::Employee).into();
        assert_eq!(err.code, ErrorCode::RecordNotFound);
    }

    #[test]
    fn test_invalid_mapping_carries_field_detail() {
        let err: AppError = RepoError::Invalid {
            code: ErrorCode::ReorderEmpty,
            field: "field_orders",
        }
        .into();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        let details = err.details.unwrap();
        assert_eq!(
            details["field_orders"],
            serde_json::json!(["field_orders must not be empty"])
        );
    }

    #[test]
    fn test_database_error_hides_message() {
        let err: AppError = RepoError::Database("disk I/O error".into()).into();
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("disk"));
    }
}
