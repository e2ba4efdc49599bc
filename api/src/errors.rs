use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false` for errors
    pub success: bool,
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// PostgREST answered with an error body. `code` is the PostgreSQL SQLSTATE when present.
    #[error("PostgREST error (HTTP {status}): {message}")]
    Upstream {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Map a PostgreSQL SQLSTATE code to an HTTP status and client-facing message.
pub(crate) fn sqlstate_response(code: &str) -> Option<(StatusCode, &'static str)> {
    match code {
        "23505" => Some((StatusCode::BAD_REQUEST, "Duplicate field value entered")),
        "23503" => Some((StatusCode::NOT_FOUND, "Resource not found")),
        "22P02" => Some((StatusCode::BAD_REQUEST, "Invalid input syntax")),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ExternalServiceError(msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Upstream {
                status,
                code,
                message,
            } => match code.as_deref().and_then(sqlstate_response) {
                Some((mapped, msg)) => (mapped, msg.to_string()),
                None => {
                    tracing::error!("PostgREST returned HTTP {}: {}", status, message);
                    (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
                }
            },
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, axum::Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_duplicate() {
        let (status, msg) = sqlstate_response("23505").unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Duplicate field value entered");
    }

    #[test]
    fn test_sqlstate_missing_reference() {
        let (status, _) = sqlstate_response("23503").unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_sqlstate_invalid_input() {
        let (status, msg) = sqlstate_response("22P02").unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Invalid input syntax");
    }

    #[test]
    fn test_sqlstate_unknown() {
        assert!(sqlstate_response("42P01").is_none());
    }

    #[test]
    fn test_upstream_error_maps_sqlstate_to_status() {
        let err = AppError::Upstream {
            status: 409,
            code: Some("23505".to_string()),
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_error_without_code_is_500() {
        let err = AppError::Upstream {
            status: 503,
            code: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_status() {
        let err = AppError::BadRequest("startDate and endDate are required".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
