//! Shared error handling for page handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Extension trait for concise error mapping on Results.
pub trait ResultExt<T> {
    fn db_err(self, msg: &str) -> Result<T, WebError>;
    fn internal_err(self, msg: &str) -> Result<T, WebError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn db_err(self, msg: &str) -> Result<T, WebError> {
        self.map_err(|e| WebError::db_error(msg, e))
    }
    fn internal_err(self, msg: &str) -> Result<T, WebError> {
        self.map_err(|e| WebError::internal(msg, e))
    }
}

/// Page error. Renders as the plain status text, like a browser would
/// expect from a server-rendered site.
#[derive(Debug)]
pub enum WebError {
    BadRequest,
    NotFound,
    Internal,
}

impl WebError {
    pub fn db_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal
    }

    pub fn internal(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal
    }

    fn status(&self) -> StatusCode {
        match self {
            WebError::BadRequest => StatusCode::BAD_REQUEST,
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Plain-text response carrying a status code and its reason phrase.
pub fn status_text(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        status_text(self.status())
    }
}

/// Fallback for unknown paths.
pub async fn not_found() -> WebError {
    WebError::NotFound
}
