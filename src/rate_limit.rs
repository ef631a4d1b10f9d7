//! Rate limiting for the credential-accepting endpoints.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down password
//! guessing and signup spam.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc};

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

const LOGIN_PER_SEC: NonZeroU32 = NonZeroU32::new(1).unwrap();
const LOGIN_BURST: NonZeroU32 = NonZeroU32::new(10).unwrap();
const SIGNUP_PER_MIN: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Rate limiting configuration for login and signup submissions.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Login: 1 request per second per IP, bursts of 10
    pub login: Arc<IpLimiter>,
    /// Signup: 10 requests per minute per IP
    pub signup: Arc<IpLimiter>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(
            Quota::per_second(LOGIN_PER_SEC).allow_burst(LOGIN_BURST),
            Quota::per_minute(SIGNUP_PER_MIN),
        )
    }
}

impl RateLimitConfig {
    pub fn new(login: Quota, signup: Quota) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(login)),
            signup: Arc::new(RateLimiter::keyed(signup)),
        }
    }
}

/// Client IP from the connection, or a shared bucket when unknown.
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn check(limiter: &IpLimiter, request: &Request, message: &'static str) -> Option<Response> {
    let ip = client_key(request);
    match limiter.check_key(&ip) {
        Ok(_) => None,
        Err(_) => {
            tracing::warn!(ip = %ip, "Rate limit exceeded");
            Some((StatusCode::TOO_MANY_REQUESTS, message).into_response())
        }
    }
}

/// Middleware for rate limiting login submissions.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(rejection) = check(
        &config.login,
        &request,
        "Too many login attempts. Please wait before trying again.",
    ) {
        return rejection;
    }
    next.run(request).await
}

/// Middleware for rate limiting signup submissions.
pub async fn rate_limit_signup(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(rejection) = check(
        &config.signup,
        &request,
        "Too many signup attempts. Please wait before trying again.",
    ) {
        return rejection;
    }
    next.run(request).await
}
