#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use snippetbox::{ServerConfig, create_app, db::Database, jwt::JwtConfig};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";
pub const PASSWORD: &str = "Passw0rd!";

/// Create a test app and return (app, db, jwt_config).
pub async fn create_test_app() -> (Router, Database, JwtConfig) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_SECRET.to_vec(),
        secure_cookies: false,
    };
    (create_app(&config), db, JwtConfig::new(TEST_SECRET))
}

/// Create a user with the standard test password and return its ID.
pub async fn create_user(db: &Database, name: &str, email: &str) -> i64 {
    db.users()
        .insert(name, email, PASSWORD)
        .await
        .expect("Failed to create user")
}

/// CSRF token the request helpers send in both the cookie and the form.
pub const TEST_CSRF_TOKEN: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQ";

/// Cookie header with the test CSRF cookie added to `cookie`.
fn with_csrf_cookie(cookie: Option<&str>) -> String {
    match cookie {
        Some(cookie) => format!("{}; csrf_token={}", cookie, TEST_CSRF_TOKEN),
        None => format!("csrf_token={}", TEST_CSRF_TOKEN),
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, with_csrf_cookie(cookie))
        .body(Body::empty())
        .unwrap()
}

/// POST a form carrying a valid CSRF token.
pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let body = if body.is_empty() {
        format!("csrf_token={}", TEST_CSRF_TOKEN)
    } else {
        format!("{}&csrf_token={}", body, TEST_CSRF_TOKEN)
    };
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, with_csrf_cookie(cookie))
        .body(Body::from(body))
        .unwrap()
}

/// POST a form exactly as given, with no CSRF token added.
pub fn raw_form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of the named cookie among Set-Cookie headers.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookies
        .iter()
        .find_map(|c| c.strip_prefix(&prefix))
        .and_then(|rest| rest.split(';').next())
        .map(|v| v.to_string())
}

/// Check if cookies contain the named cookie being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", name)) && c.contains("Max-Age=0"))
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Log in through the login form and return (session_token, refresh_value).
pub async fn login(app: &Router, email: &str) -> (String, String) {
    let body = format!("email={}&password={}", email, "Passw0rd%21");
    let response = app
        .clone()
        .oneshot(form_post("/user/login", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), 303, "login should redirect");

    let cookies = extract_set_cookies(&response);
    (
        cookie_value(&cookies, "auth_token").expect("auth_token cookie"),
        cookie_value(&cookies, "refresh_token").expect("refresh_token cookie"),
    )
}

pub fn auth_cookies(session: &str, refresh: &str) -> String {
    format!("auth_token={}; refresh_token={}", session, refresh)
}
