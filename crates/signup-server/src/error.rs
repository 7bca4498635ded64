//! Error types for the signup service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use signup_core::{SubmitError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

/// Service error types.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("{0}")]
    Submission(#[from] SubmitError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Too many open sessions, try again later")]
    TooManySessions,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ServiceError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServiceError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            ServiceError::UnknownField(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_FIELD"),
            ServiceError::SubmissionInProgress => (StatusCode::CONFLICT, "SUBMISSION_IN_PROGRESS"),
            ServiceError::Submission(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.code()),
            ServiceError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.code()),
            ServiceError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            ServiceError::TooManySessions => (StatusCode::SERVICE_UNAVAILABLE, "TOO_MANY_SESSIONS"),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_errors_keep_user_message() {
        let err = ServiceError::from(SubmitError::EmailAlreadyRegistered);
        assert_eq!(err.to_string(), "email already registered");
        assert_eq!(
            err.status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "EmailAlreadyRegistered")
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::SessionNotFound(Uuid::nil()).status_and_code().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::SubmissionInProgress.status_and_code().0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::TooManySessions.status_and_code(),
            (StatusCode::SERVICE_UNAVAILABLE, "TOO_MANY_SESSIONS")
        );
        assert_eq!(
            ServiceError::from(ValidationError::MissingEmail)
                .status_and_code()
                .1,
            "MissingEmail"
        );
    }
}
