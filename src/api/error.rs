//! API Error Types
//!
//! Maps domain errors to HTTP responses. Backend failures are reported to the
//! client with the generic message of the operation that failed; the detail
//! only goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{AttendanceError, ReportAction, ReportError, RosterError, ThemeError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with what is already recorded
    #[error("{0}")]
    Conflict(String),

    /// Backend failure; `message` is safe to show, `detail` is logged
    #[error("{message}")]
    Internal { message: String, detail: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn internal(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Map a report error, using the generic message for `action`
    pub fn from_report(err: ReportError, action: ReportAction) -> Self {
        let message = err.user_message(action);
        match err {
            ReportError::NotFound(_) | ReportError::UnknownChild(_) => ApiError::NotFound(message),
            ReportError::AlreadyReported { .. } => ApiError::Conflict(message),
            e if e.is_user_error() => ApiError::Validation(message),
            e => ApiError::internal(message, e),
        }
    }
}

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        let message = err.user_message();
        match err {
            AttendanceError::UnknownChild(_) => ApiError::NotFound(message),
            AttendanceError::AlreadyMarked { .. } => ApiError::Conflict(message),
            e => ApiError::internal(message, e),
        }
    }
}

impl From<ThemeError> for ApiError {
    fn from(err: ThemeError) -> Self {
        let message = err.user_message();
        match err {
            ThemeError::Validation(_) | ThemeError::UnknownTag(_) => ApiError::Validation(message),
            e => ApiError::internal(message, e),
        }
    }
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Validation(msg) => ApiError::Validation(msg),
            RosterError::Csv(msg) => ApiError::Validation(msg),
            e @ RosterError::Duplicate(_) => ApiError::Conflict(e.to_string()),
            e => ApiError::internal("Failed to load children.", e),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        match &self {
            ApiError::Internal { detail, .. } => tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                detail = %detail,
                "API error occurred"
            ),
            _ => tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            ),
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_attendance_store_failure_is_generic() {
        let err: ApiError = AttendanceError::Store(StoreError::Lock("poisoned".into())).into();
        assert_eq!(err.to_string(), "Failed to mark attendance.");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_roster_and_theme_status_codes() {
        let duplicate: ApiError = RosterError::Duplicate("Alice".into()).into();
        assert_eq!(duplicate.into_response().status(), StatusCode::CONFLICT);

        let invalid: ApiError = RosterError::Validation("bad email".into()).into();
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let unknown: ApiError = ThemeError::UnknownTag("Space".into()).into();
        assert_eq!(unknown.into_response().status(), StatusCode::BAD_REQUEST);

        let io: ApiError = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy").into();
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_report_status_codes() {
        let conflict = ApiError::from_report(
            ReportError::AlreadyReported {
                child: "Alice".into(),
                date: chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            },
            ReportAction::Submit,
        );
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let missing = ApiError::from_report(ReportError::NotFound("x".into()), ReportAction::Update);
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let failed = ApiError::from_report(
            ReportError::Store(StoreError::Database("disk full".into())),
            ReportAction::Update,
        );
        assert_eq!(failed.to_string(), "Failed to update report.");
    }
}
