//! Error handling for the MSME Business Directory
//!
//! Every failure leaves the service as a JSON envelope with a stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{OwnershipError, SearchError, UploadError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid request body: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("Ownership error: {0}")]
    Ownership(#[from] OwnershipError),

    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("Invalid search: {0}")]
    Search(#[from] SearchError),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// One failed rule on one request field
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl AppError {
    /// HTTP status and body for this error
    fn parts(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_CREDENTIALS",
                    "Invalid login credentials. Please check your email and password.",
                ),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid token"),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                ),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::InvalidOtp => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INVALID_OTP", "Invalid or expired OTP"),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone()).with_field(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::InvalidInput(errors) => {
                let mut detail = ErrorDetail::new("VALIDATION_ERROR", "Request body failed validation");
                detail.details = Some(field_errors(errors));
                (StatusCode::BAD_REQUEST, detail)
            }
            AppError::Ownership(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("OWNERSHIP_INVALID", err.to_string()).with_field("owners"),
            ),
            AppError::Upload(err) => {
                let status = match err {
                    UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (
                    status,
                    ErrorDetail::new("UPLOAD_REJECTED", err.to_string()).with_field("file"),
                )
            }
            AppError::Search(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", err.to_string()).with_field("keyword"),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                )
                .with_field(field.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::StorageError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("STORAGE_ERROR", "The file could not be stored"),
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("EXTERNAL_SERVICE_ERROR", format!("External service error: {}", msg)),
            ),
            AppError::DatabaseError(sqlx::Error::Database(db)) if db.is_unique_violation() => (
                StatusCode::CONFLICT,
                ErrorDetail::new("DUPLICATE_ENTRY", "A record with these details already exists"),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "Internal server error"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.parts();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Flatten validator output into `field` / `message` pairs, nested paths dotted
pub fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_field_errors("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_field_errors(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<FieldError>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", path, err.code));
                    out.push(FieldError {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_errors_are_bad_requests() {
        let err = AppError::from(OwnershipError::NoOwners);
        let (status, detail) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "OWNERSHIP_INVALID");
        assert_eq!(detail.field.as_deref(), Some("owners"));
    }

    #[test]
    fn long_keyword_is_a_validation_error() {
        let err = AppError::from(SearchError::TooManyKeywordTerms { count: 11, max: 10 });
        let (status, detail) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("keyword"));
    }

    #[test]
    fn oversized_upload_is_413() {
        let err = AppError::from(UploadError::TooLarge { max_mb: 50 });
        assert_eq!(err.parts().0, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = AppError::Internal("connection string postgres://secret".into());
        let (status, detail) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!detail.message.contains("secret"));
    }

    #[test]
    fn duplicate_entry_names_field() {
        let (status, detail) = AppError::DuplicateEntry("email_address".into()).parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(detail.field.as_deref(), Some("email_address"));
    }
}
