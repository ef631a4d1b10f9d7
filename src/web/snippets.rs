//! Snippet pages.

use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::WebState;
use super::csrf::CsrfToken;
use super::error::{ResultExt, WebError};
use super::forms::{Validator, max_chars, not_blank, permitted_value};
use super::templates::{create_page, home_page, render_page, view_page};
use crate::auth::AuthContext;

/// Allowed snippet lifetimes in days.
const PERMITTED_EXPIRES: [i64; 3] = [1, 7, 365];
const DEFAULT_EXPIRES: i64 = 365;
const MAX_TITLE_CHARS: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnippetCreateInput {
    pub title: String,
    pub content: String,
    /// Kept as text so a non-integer can be told apart from a bad choice
    pub expires: String,
}

pub async fn home(
    State(state): State<WebState>,
    auth: AuthContext,
    csrf: CsrfToken,
) -> Result<Response, WebError> {
    let snippets = state
        .db
        .snippets()
        .latest()
        .await
        .db_err("Failed to load latest snippets")?;

    let page = render_page("Home", &auth, &csrf, &home_page(&snippets))?;
    Ok(Html(page).into_response())
}

pub async fn snippet_view(
    State(state): State<WebState>,
    auth: AuthContext,
    csrf: CsrfToken,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id: i64 = match id.parse() {
        Ok(id) if id >= 1 => id,
        _ => return Err(WebError::NotFound),
    };

    let mut snippet = state
        .db
        .snippets()
        .get(id)
        .await
        .db_err("Failed to load snippet")?
        .ok_or(WebError::NotFound)?;

    // Content may carry literal "\n" sequences from plain-text sources
    snippet.content = snippet.content.replace("\\n", "\n");

    let title = format!("Snippet #{}", snippet.id);
    let page = render_page(&title, &auth, &csrf, &view_page(&snippet))?;
    Ok(Html(page).into_response())
}

pub async fn snippet_create_get(
    auth: AuthContext,
    csrf: CsrfToken,
) -> Result<Response, WebError> {
    let main = create_page("", "", DEFAULT_EXPIRES, &Validator::default(), &csrf);
    let page = render_page("Create a New Snippet", &auth, &csrf, &main)?;
    Ok(Html(page).into_response())
}

pub async fn snippet_create_post(
    State(state): State<WebState>,
    auth: AuthContext,
    csrf: CsrfToken,
    form: Result<Form<SnippetCreateInput>, FormRejection>,
) -> Result<Response, WebError> {
    let Ok(Form(input)) = form else {
        return Err(WebError::BadRequest);
    };
    let Ok(expires) = input.expires.trim().parse::<i64>() else {
        return Err(WebError::BadRequest);
    };

    let mut v = Validator::default();
    v.check_field(
        not_blank(&input.title),
        "title",
        "This field cannot be blank",
    );
    v.check_field(
        max_chars(&input.title, MAX_TITLE_CHARS),
        "title",
        "This field cannot be more than 100 characters long",
    );
    v.check_field(
        not_blank(&input.content),
        "content",
        "This field cannot be blank",
    );
    v.check_field(
        permitted_value(&expires, &PERMITTED_EXPIRES),
        "expires",
        "This field must equal 1, 7 or 365",
    );

    if !v.valid() {
        let main = create_page(&input.title, &input.content, expires, &v, &csrf);
        let page = render_page("Create a New Snippet", &auth, &csrf, &main)?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
    }

    let id = state
        .db
        .snippets()
        .insert(&input.title, &input.content, expires)
        .await
        .db_err("Failed to create snippet")?;

    tracing::info!(snippet_id = id, "Snippet created");

    Ok(Redirect::to(&format!("/snippet/view/{}", id)).into_response())
}
