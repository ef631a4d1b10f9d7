//! Server-rendered pages: routes, handlers, forms and rendering.

pub mod csrf;
mod error;
pub mod forms;
pub mod middleware;
mod snippets;
mod static_files;
pub mod templates;
mod users;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;

use crate::auth::{require_auth, require_no_auth};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_signup};

pub use error::{ResultExt, WebError};

#[derive(Clone)]
pub struct WebState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
    pub rate_limit: Arc<RateLimitConfig>,
}

impl_has_auth_backend!(WebState);

/// Create the page router. Session resolution is layered on top by the caller.
pub fn create_web_router(state: WebState) -> Router {
    let public = Router::new()
        .route("/", get(snippets::home))
        .route("/snippet/view/{id}", get(snippets::snippet_view))
        .route("/static/{*path}", get(static_files::static_handler))
        .with_state(state.clone());

    // Logged-in users only
    let protected = Router::new()
        .route(
            "/snippet/create",
            get(snippets::snippet_create_get).post(snippets::snippet_create_post),
        )
        .route("/user/logout", post(users::logout_post))
        .route_layer(from_fn(require_auth))
        .with_state(state.clone());

    // Anonymous users only
    let anonymous = Router::new()
        .route(
            "/user/signup",
            get(users::signup_get).merge(
                post(users::signup_post)
                    .layer(from_fn_with_state(state.rate_limit.clone(), rate_limit_signup)),
            ),
        )
        .route(
            "/user/login",
            get(users::login_get).merge(
                post(users::login_post)
                    .layer(from_fn_with_state(state.rate_limit.clone(), rate_limit_login)),
            ),
        )
        .route_layer(from_fn(require_no_auth))
        .with_state(state);

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(anonymous)
        .fallback(error::not_found)
}
