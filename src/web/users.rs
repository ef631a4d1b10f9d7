//! Signup, login and logout.

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, info};

use super::WebState;
use super::csrf::CsrfToken;
use super::error::{ResultExt, WebError};
use super::forms::{Validator, not_blank, valid_email, valid_name, valid_password};
use super::templates::{login_page, render_page, signup_page};
use crate::auth::{AuthContext, CurrentUser, Identity, end_session, start_session};
use crate::db::UserError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Redirect home, setting the given cookies.
fn redirect_home_with_cookies(cookies: &[String]) -> Result<Response, WebError> {
    let mut response = Redirect::to("/").into_response();
    for cookie in cookies {
        let value = HeaderValue::from_str(cookie).internal_err("Invalid cookie")?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

async fn begin_session(state: &WebState, identity: &Identity) -> Result<Response, WebError> {
    let cookies = start_session(state, identity)
        .await
        .internal_err("Failed to start session")?;
    redirect_home_with_cookies(&cookies)
}

fn unprocessable(page: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
}

pub async fn signup_get(auth: AuthContext, csrf: CsrfToken) -> Result<Response, WebError> {
    let main = signup_page("", "", &Validator::default(), &csrf);
    let page = render_page("Signup", &auth, &csrf, &main)?;
    Ok(Html(page).into_response())
}

pub async fn signup_post(
    State(state): State<WebState>,
    auth: AuthContext,
    csrf: CsrfToken,
    form: Result<Form<SignupInput>, FormRejection>,
) -> Result<Response, WebError> {
    let Ok(Form(input)) = form else {
        return Err(WebError::BadRequest);
    };

    let mut v = Validator::default();
    v.check_field(not_blank(&input.name), "name", "This field cannot be blank");
    v.check_field(
        valid_name(&input.name),
        "name",
        "Name may contain letters, digits and single . _ - between them",
    );
    v.check_field(not_blank(&input.email), "email", "This field cannot be blank");
    v.check_field(
        valid_email(&input.email),
        "email",
        "This field must be a valid email address",
    );
    v.check_field(
        not_blank(&input.password),
        "password",
        "This field cannot be blank",
    );
    v.check_field(
        valid_password(&input.password),
        "password",
        "Password must be 8-16 characters with upper and lower case letters, a digit and a symbol",
    );

    if v.valid() {
        match state
            .db
            .users()
            .insert(&input.name, &input.email, &input.password)
            .await
        {
            Ok(id) => {
                info!(user_id = id, "User signed up");
                let identity = Identity {
                    id,
                    name: input.name,
                    email: input.email,
                };
                return begin_session(&state, &identity).await;
            }
            Err(UserError::DuplicateEmail) => {
                v.add_field_error("email", "Email address is already in use");
            }
            Err(e) => {
                error!(error = %e, "Failed to create user");
                return Err(WebError::Internal);
            }
        }
    }

    let main = signup_page(&input.name, &input.email, &v, &csrf);
    let page = render_page("Signup", &auth, &csrf, &main)?;
    Ok(unprocessable(page))
}

pub async fn login_get(auth: AuthContext, csrf: CsrfToken) -> Result<Response, WebError> {
    let main = login_page("", &Validator::default(), &csrf);
    let page = render_page("Login", &auth, &csrf, &main)?;
    Ok(Html(page).into_response())
}

pub async fn login_post(
    State(state): State<WebState>,
    auth: AuthContext,
    csrf: CsrfToken,
    form: Result<Form<LoginInput>, FormRejection>,
) -> Result<Response, WebError> {
    let Ok(Form(input)) = form else {
        return Err(WebError::BadRequest);
    };

    let mut v = Validator::default();
    v.check_field(not_blank(&input.email), "email", "This field cannot be blank");
    v.check_field(
        not_blank(&input.password),
        "password",
        "This field cannot be blank",
    );

    if v.valid() {
        match state
            .db
            .users()
            .authenticate(&input.email, &input.password)
            .await
        {
            Ok(identity) => {
                info!(user_id = identity.id, "User logged in");
                return begin_session(&state, &identity).await;
            }
            Err(UserError::WrongCredentials) => {
                v.add_non_field_error("Email or password is incorrect");
            }
            Err(e) => {
                error!(error = %e, "Failed to check credentials");
                return Err(WebError::Internal);
            }
        }
    }

    let main = login_page(&input.email, &v, &csrf);
    let page = render_page("Login", &auth, &csrf, &main)?;
    Ok(unprocessable(page))
}

pub async fn logout_post(
    State(state): State<WebState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Response, WebError> {
    let cookies = end_session(&state, identity.id)
        .await
        .internal_err("Failed to end session")?;

    info!(user_id = identity.id, "User logged out");
    redirect_home_with_cookies(&cookies)
}
