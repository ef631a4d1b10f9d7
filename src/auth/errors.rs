//! Authentication error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RefreshTokenError;
use crate::jwt::JwtError;

/// Rejection for routes that need an authenticated caller.
#[derive(Debug)]
pub enum AuthRejection {
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
        }
    }
}

/// Failure to start or end a session on behalf of an explicit user action.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to issue session token: {0}")]
    Token(#[from] JwtError),
    #[error("refresh token storage failed: {0}")]
    Storage(#[from] RefreshTokenError),
}
