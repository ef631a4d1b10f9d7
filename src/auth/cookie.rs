//! Cookie parsing and `Set-Cookie` construction for the session cookies.

use axum::http::header;

use crate::jwt::SESSION_TOKEN_DURATION_SECS;

/// Cookie name for the session token (short-lived, 15 minutes).
pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Cookie name for the refresh token (long-lived, 1 day).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Refresh cookie lifetime, matching the stored token's TTL.
pub const REFRESH_COOKIE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

pub(crate) fn build_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        name, value, max_age, secure
    )
}

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie(token: &str, secure: bool) -> String {
    build_cookie(
        SESSION_COOKIE_NAME,
        token,
        SESSION_TOKEN_DURATION_SECS,
        secure,
    )
}

/// `Set-Cookie` value carrying a refresh token value.
pub fn refresh_cookie(value: &str, secure: bool) -> String {
    build_cookie(
        REFRESH_COOKIE_NAME,
        value,
        REFRESH_COOKIE_MAX_AGE_SECS,
        secure,
    )
}

/// `Set-Cookie` value that makes the browser drop the named cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}
