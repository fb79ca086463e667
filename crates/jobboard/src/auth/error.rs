//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use super::Role;

/// Client-visible message for every token or header failure.
pub const UNAUTHENTICATED_MESSAGE: &str = "Authentication required";

/// Client-visible message for every login failure.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed registration or login input.
    #[error("{0}")]
    Validation(String),

    /// A user with this email already exists.
    #[error("Email already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password. Deliberately one variant for both.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing authorization header.
    #[error("missing authorization header")]
    MissingAuthHeader,

    /// Authorization header is not `Bearer <token>`.
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    /// Signature mismatch or undecodable token.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token is past its `exp`.
    #[error("token expired")]
    TokenExpired,

    /// Authenticated, but the route needs another role.
    #[error("{0} role required")]
    Forbidden(Role),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Store or signing failure.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for failures that collapse to a plain 401 at the boundary.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeader
                | AuthError::InvalidToken(_)
                | AuthError::TokenExpired
        )
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AuthError::DuplicateEmail => {
                (StatusCode::BAD_REQUEST, "DUPLICATE_EMAIL", self.to_string())
            }
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired => {
                debug!(reason = %self, "Rejected unauthenticated request");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHENTICATED",
                    UNAUTHENTICATED_MESSAGE.to_string(),
                )
            }
            AuthError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AuthError::Hashing(_) | AuthError::Internal(_) => {
                error!(error = %self, "Authentication infrastructure failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(AuthErrorResponse {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}
