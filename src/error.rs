//! Handler error type.
//!
//! Every handler returns `Result<T, AppError>`. Client-facing errors carry
//! their message in a `{"detail": ...}` body; internal failures are logged
//! and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::formatter::FormatError;
use crate::pdf::PdfError;

pub const ACCESS_PROHIBITED: &str =
    "You do not have permission to access this resource. Please contact your administrator for assistance.";
pub const DB_NOT_SQLITE: &str =
    "This feature is only available when running with SQLite databases.";
pub const FILE_NOT_FOUND: &str = "File not found";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The PDF renderer reported a failure; its message is shown to the caller.
    #[error("pdf generation failed: {0}")]
    Pdf(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn access_prohibited() -> Self {
        AppError::Unauthorized(ACCESS_PROHIBITED.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            AppError::Pdf(m) => {
                error!(message = %m, "pdf generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
            AppError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR.to_string())
            }
            AppError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<FormatError> for AppError {
    fn from(e: FormatError) -> Self {
        match e {
            FormatError::Rejected(message) => AppError::BadRequest(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PdfError> for AppError {
    fn from(e: PdfError) -> Self {
        match e {
            PdfError::Spawn(_) => AppError::Internal(e.to_string()),
            other => AppError::Pdf(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(FILE_NOT_FOUND.to_string())
        } else {
            AppError::Internal(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::access_prohibited(), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Pdf("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_format_rejection_is_client_error() {
        let err = AppError::from(FormatError::Rejected("Cannot parse: 1:4".into()));
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Cannot parse: 1:4"));

        let err = AppError::from(FormatError::Timeout(30));
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_pdf_spawn_failure_is_masked() {
        let spawn = PdfError::Spawn(std::io::Error::new(std::io::ErrorKind::NotFound, "no binary"));
        assert!(matches!(AppError::from(spawn), AppError::Internal(_)));

        let render = PdfError::Render("Exit with code 1".into());
        assert!(matches!(AppError::from(render), AppError::Pdf(ref m) if m.contains("Exit with code 1")));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, AppError::NotFound(ref m) if m == FILE_NOT_FOUND));
    }
}
