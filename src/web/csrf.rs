//! Cross-site request forgery protection.
//!
//! Double-submit tokens: every visitor holds a random `csrf_token` cookie and
//! every form echoes it back in a hidden `csrf_token` field. A state-changing
//! request whose field (or `X-CSRF-Token` header) does not match the cookie
//! is rejected with 400 before it reaches a handler.

use std::convert::Infallible;

use axum::{
    body::{Body, to_bytes},
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, Method, StatusCode, header, request::Parts},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use rand::RngCore;
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use super::error::status_text;
use crate::auth::{build_cookie, get_cookie};

pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_FIELD_NAME: &str = "csrf_token";
const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// Token cookie lifetime: one year.
const CSRF_COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

const TOKEN_BYTES: usize = 32;
/// Length of `TOKEN_BYTES` in unpadded base64.
const TOKEN_LEN: usize = 43;

/// Largest form body buffered for the token check.
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// The current visitor's token, for embedding in forms.
#[derive(Debug, Clone, Default)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .unwrap_or_default())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn tokens_match(expected: &str, submitted: &str) -> bool {
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}

/// Compare the submitted token with `expected`. On success the request is
/// handed back with its body intact.
async fn check_submitted(request: Request, expected: &str) -> Option<Request> {
    if let Some(submitted) = request
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|value| value.to_str().ok())
    {
        return tokens_match(expected, submitted).then_some(request);
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Could not read form body");
            return None;
        }
    };

    let submitted = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FIELD_NAME)
        .map(|(_, value)| value.into_owned())?;

    tokens_match(expected, &submitted).then(|| Request::from_parts(parts, Body::from(bytes)))
}

fn append_cookie(response: &mut Response, token: &str, secure: bool) {
    let cookie = build_cookie(CSRF_COOKIE_NAME, token, CSRF_COOKIE_MAX_AGE_SECS, secure);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => error!(error = %e, "CSRF cookie is not a valid header"),
    }
}

/// Issue the token cookie when missing and reject unsafe requests that do
/// not echo it back.
pub async fn csrf_protect(
    State(secure_cookies): State<bool>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = get_cookie(request.headers(), CSRF_COOKIE_NAME)
        .filter(|token| is_well_formed(token))
        .map(str::to_owned);
    let fresh = existing.is_none();
    let token = existing.unwrap_or_else(generate_token);

    if !is_safe(request.method()) {
        let method = request.method().clone();
        let uri = request.uri().clone();

        // Without a cookie there is nothing a submitted field could match
        let checked = if fresh {
            None
        } else {
            check_submitted(request, &token).await
        };

        match checked {
            Some(checked) => request = checked,
            None => {
                warn!(method = %method, uri = %uri, "CSRF token missing or mismatched");
                let mut response = status_text(StatusCode::BAD_REQUEST);
                if fresh {
                    append_cookie(&mut response, &token, secure_cookies);
                }
                return response;
            }
        }
    }

    request.extensions_mut().insert(CsrfToken(token.clone()));
    let mut response = next.run(request).await;

    if fresh {
        append_cookie(&mut response, &token, secure_cookies);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Form, Router,
        middleware::from_fn_with_state,
        routing::{get, post},
    };
    use std::collections::HashMap;
    use tower::ServiceExt;

    const TOKEN: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQ";

    fn app() -> Router {
        Router::new()
            .route("/", get(|csrf: CsrfToken| async move { csrf.0 }))
            .route(
                "/submit",
                post(|Form(form): Form<HashMap<String, String>>| async move {
                    form.get("title").cloned().unwrap_or_default()
                }),
            )
            .layer(from_fn_with_state(false, csrf_protect))
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request {
        let mut builder = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn set_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_generated_tokens_are_well_formed() {
        let token = generate_token();
        assert!(is_well_formed(&token));
        assert_ne!(token, generate_token());
        assert!(is_well_formed(TOKEN));
        assert!(!is_well_formed("short"));
    }

    #[tokio::test]
    async fn test_get_issues_cookie_matching_page_token() {
        let response = app().oneshot(request("GET", "/", None, "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = set_cookie(&response).unwrap();
        assert!(cookie.contains("HttpOnly"));
        let value = cookie
            .strip_prefix("csrf_token=")
            .and_then(|rest| rest.split(';').next())
            .unwrap()
            .to_string();
        assert_eq!(body_string(response).await, value);
    }

    #[tokio::test]
    async fn test_existing_cookie_is_kept() {
        let cookie = format!("csrf_token={}", TOKEN);
        let response = app()
            .oneshot(request("GET", "/", Some(&cookie), ""))
            .await
            .unwrap();

        assert!(set_cookie(&response).is_none());
        assert_eq!(body_string(response).await, TOKEN);
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_replaced() {
        let response = app()
            .oneshot(request("GET", "/", Some("csrf_token=forged"), ""))
            .await
            .unwrap();

        assert!(set_cookie(&response).unwrap().starts_with("csrf_token="));
        assert_ne!(body_string(response).await, "forged");
    }

    #[tokio::test]
    async fn test_post_without_cookie_is_rejected() {
        let body = format!("title=hi&csrf_token={}", TOKEN);
        let response = app()
            .oneshot(request("POST", "/submit", None, &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // The visitor gets a cookie to retry with
        assert!(set_cookie(&response).is_some());
    }

    #[tokio::test]
    async fn test_post_with_missing_or_wrong_field_is_rejected() {
        let cookie = format!("csrf_token={}", TOKEN);
        let wrong = format!("title=hi&csrf_token={}", generate_token());

        for body in ["title=hi", wrong.as_str()] {
            let response = app()
                .oneshot(request("POST", "/submit", Some(&cookie), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        }
    }

    #[tokio::test]
    async fn test_post_with_matching_field_reaches_handler() {
        let cookie = format!("csrf_token={}", TOKEN);
        let body = format!("title=hello&csrf_token={}", TOKEN);

        let response = app()
            .oneshot(request("POST", "/submit", Some(&cookie), &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "hello");
    }

    #[tokio::test]
    async fn test_header_token_is_accepted() {
        let cookie = format!("csrf_token={}", TOKEN);
        let mut req = request("POST", "/submit", Some(&cookie), "title=hello");
        req.headers_mut()
            .insert(CSRF_HEADER_NAME, HeaderValue::from_static(TOKEN));

        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
