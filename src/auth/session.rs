//! Session start and end for login, signup and logout.

use base64::Engine;
use rand::RngCore;

use super::cookie::{
    REFRESH_COOKIE_NAME, SESSION_COOKIE_NAME, clear_cookie, refresh_cookie, session_cookie,
};
use super::errors::SessionError;
use super::state::HasAuthBackend;
use super::types::Identity;

/// Lifetime of a stored refresh token.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 1;

/// Bytes of randomness in a refresh token value.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate an opaque refresh token value.
pub fn generate_refresh_value() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Issue a session token and a fresh refresh token for `identity`,
/// replacing any refresh token the user already holds.
///
/// Returns the two `Set-Cookie` values (session first).
pub async fn start_session<S: HasAuthBackend>(
    backend: &S,
    identity: &Identity,
) -> Result<[String; 2], SessionError> {
    let session = backend.jwt().issue(identity)?;
    let refresh_value = generate_refresh_value();

    backend
        .db()
        .refresh_tokens()
        .insert(&refresh_value, REFRESH_TOKEN_TTL_DAYS, identity.id)
        .await?;

    let secure = backend.secure_cookies();
    Ok([
        session_cookie(&session.token, secure),
        refresh_cookie(&refresh_value, secure),
    ])
}

/// Revoke every refresh token of `user_id` and return `Set-Cookie` values
/// that clear both cookies.
pub async fn end_session<S: HasAuthBackend>(
    backend: &S,
    user_id: i64,
) -> Result<[String; 2], SessionError> {
    let removed = backend.db().refresh_tokens().delete(user_id).await?;
    tracing::debug!(user_id, removed, "Revoked refresh tokens");

    let secure = backend.secure_cookies();
    Ok([
        clear_cookie(SESSION_COOKIE_NAME, secure),
        clear_cookie(REFRESH_COOKIE_NAME, secure),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::TestBackend;

    #[test]
    fn test_refresh_values_are_unique_and_url_safe() {
        let a = generate_refresh_value();
        let b = generate_refresh_value();

        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[tokio::test]
    async fn test_start_session_stores_refresh_token() {
        let backend = TestBackend::new().await;
        let identity = backend.create_user("alice").await;

        let [session, refresh] = start_session(&backend, &identity).await.unwrap();
        assert!(session.starts_with("auth_token="));
        assert!(refresh.starts_with("refresh_token="));

        let value = refresh
            .strip_prefix("refresh_token=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        let resolved = backend
            .db
            .refresh_tokens()
            .check_and_resolve(value)
            .await
            .unwrap();
        assert_eq!(resolved, identity);
    }

    #[tokio::test]
    async fn test_end_session_revokes_and_clears() {
        let backend = TestBackend::new().await;
        let identity = backend.create_user("alice").await;

        start_session(&backend, &identity).await.unwrap();
        let [session, refresh] = end_session(&backend, identity.id).await.unwrap();

        assert!(session.starts_with("auth_token=;") && session.contains("Max-Age=0"));
        assert!(refresh.starts_with("refresh_token=;") && refresh.contains("Max-Age=0"));
        assert_eq!(
            backend.db.refresh_tokens().delete(identity.id).await.unwrap(),
            0
        );
    }
}
