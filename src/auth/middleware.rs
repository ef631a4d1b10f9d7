//! Authentication middleware: session resolution and route guards.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::cookie::SESSION_COOKIE_NAME;
use super::errors::AuthRejection;
use super::resolver::resolve_session;
use super::state::HasAuthBackend;
use super::types::AuthContext;

/// Resolve the caller, attach an [`AuthContext`] to the request and forward
/// any renewed session cookie on the response. Never rejects.
pub async fn authenticate<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    let resolution = resolve_session(request.headers(), &state).await;
    request
        .extensions_mut()
        .insert(AuthContext(resolution.identity));

    let mut response = next.run(request).await;

    // A handler that sets the session cookie itself (logout) has the last word
    if let Some(cookie) = resolution
        .renewed_cookie
        .filter(|_| !sets_session_cookie(&response))
    {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Renewed session cookie is not a valid header"),
        }
    }

    response
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

fn is_authenticated(request: &Request) -> bool {
    request
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated)
}

/// Guard for routes that need a logged-in user: 401 otherwise.
pub async fn require_auth(request: Request, next: Next) -> Response {
    if !is_authenticated(&request) {
        return AuthRejection::Unauthorized.into_response();
    }
    next.run(request).await
}

/// Guard for routes only anonymous users may use: logged-in users are sent home.
pub async fn require_no_auth(request: Request, next: Next) -> Response {
    if is_authenticated(&request) {
        return Redirect::to("/").into_response();
    }
    next.run(request).await
}
