//! Per-request session resolution.
//!
//! | refresh cookie | session cookie | outcome                          |
//! |----------------|----------------|----------------------------------|
//! | absent         | any            | unauthenticated                  |
//! | present        | absent         | renew from the refresh token     |
//! | present        | valid          | identity from the session token  |
//! | present        | invalid        | renew from the refresh token     |
//!
//! Resolution never fails: every error degrades to an unauthenticated
//! request and is logged.

use axum::http::HeaderMap;
use tracing::{debug, error, info};

use super::cookie::{REFRESH_COOKIE_NAME, SESSION_COOKIE_NAME, get_cookie, session_cookie};
use super::state::HasAuthBackend;
use super::types::Identity;
use crate::db::RefreshTokenError;

/// Outcome of resolving one request's cookies.
#[derive(Debug, Default)]
pub struct Resolution {
    pub identity: Option<Identity>,
    /// `Set-Cookie` value for a session token minted during renewal
    pub renewed_cookie: Option<String>,
}

/// Determine who is making the request from its cookies.
pub async fn resolve_session<S: HasAuthBackend>(headers: &HeaderMap, backend: &S) -> Resolution {
    let Some(refresh_value) = get_cookie(headers, REFRESH_COOKIE_NAME) else {
        return Resolution::default();
    };

    if let Some(token) = get_cookie(headers, SESSION_COOKIE_NAME) {
        match backend.jwt().verify(token) {
            Ok(identity) => {
                return Resolution {
                    identity: Some(identity),
                    renewed_cookie: None,
                };
            }
            Err(e) => debug!(error = %e, "Session token rejected, trying renewal"),
        }
    }

    renew(refresh_value, backend).await
}

async fn renew<S: HasAuthBackend>(refresh_value: &str, backend: &S) -> Resolution {
    let identity = match backend
        .db()
        .refresh_tokens()
        .check_and_resolve(refresh_value)
        .await
    {
        Ok(identity) => identity,
        Err(RefreshTokenError::NoRecord) => {
            debug!("Refresh token not found");
            return Resolution::default();
        }
        Err(RefreshTokenError::Expired) => {
            info!("Refresh token expired, user tokens revoked");
            return Resolution::default();
        }
        Err(e) => {
            error!(error = %e, "Failed to check refresh token");
            return Resolution::default();
        }
    };

    let session = match backend.jwt().issue(&identity) {
        Ok(session) => session,
        Err(e) => {
            error!(user_id = identity.id, error = %e, "Failed to issue session token");
            return Resolution::default();
        }
    };

    debug!(user_id = identity.id, "Session renewed from refresh token");

    Resolution {
        identity: Some(identity),
        renewed_cookie: Some(session_cookie(&session.token, backend.secure_cookies())),
    }
}
