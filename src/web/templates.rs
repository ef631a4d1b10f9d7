//! HTML rendering.
//!
//! Every page is the embedded `base.html` layout with its `{{title}}`,
//! `{{nav}}`, `{{main}}` and `{{year}}` slots filled in. Page bodies are built
//! here with all user-supplied text escaped.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use rust_embed::Embed;
use std::fmt::Write;

use super::csrf::{CSRF_FIELD_NAME, CsrfToken};
use super::error::WebError;
use super::forms::Validator;
use crate::auth::AuthContext;
use crate::db::Snippet;

/// Layout, stylesheet and other files under `ui/`.
#[derive(Embed)]
#[folder = "ui/"]
pub struct UiAssets;

const LAYOUT_PATH: &str = "html/base.html";

/// Format of `created`/`expires` columns as stored by SQLite.
const DB_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a timestamp as `02 Jan 2006 at 15:04` in UTC.
///
/// Accepts RFC 3339 (any offset) or the database's `YYYY-MM-DD HH:MM:SS`
/// (already UTC). Empty or unparseable input renders as an empty string.
pub fn human_date(value: &str) -> String {
    let utc = if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(value, DB_DATETIME_FORMAT) {
        naive.and_utc()
    } else {
        return String::new();
    };
    utc.format("%d %b %Y at %H:%M").to_string()
}

/// Hidden form field carrying the visitor's CSRF token.
fn csrf_field(csrf: &CsrfToken) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        CSRF_FIELD_NAME,
        escape_html(csrf.as_str())
    )
}

fn nav(auth: &AuthContext, csrf: &CsrfToken) -> String {
    if auth.is_authenticated() {
        format!(
            r#"      <div>
        <a href="/">Home</a>
        <a href="/snippet/create">Create snippet</a>
      </div>
      <div>
        <form action="/user/logout" method="POST">
          {}
          <button>Logout</button>
        </form>
      </div>"#,
            csrf_field(csrf)
        )
    } else {
        r#"      <div>
        <a href="/">Home</a>
      </div>
      <div>
        <a href="/user/signup">Signup</a>
        <a href="/user/login">Login</a>
      </div>"#
            .to_string()
    }
}

/// Fill the layout with a page title and body.
pub fn render_page(
    title: &str,
    auth: &AuthContext,
    csrf: &CsrfToken,
    main: &str,
) -> Result<String, WebError> {
    let layout = UiAssets::get(LAYOUT_PATH).ok_or_else(|| {
        tracing::error!(path = LAYOUT_PATH, "Layout template is missing");
        WebError::Internal
    })?;
    let layout = String::from_utf8_lossy(&layout.data);

    Ok(layout
        .replace("{{title}}", &escape_html(title))
        .replace("{{nav}}", &nav(auth, csrf))
        .replace("{{year}}", &Utc::now().year().to_string())
        .replace("{{main}}", main))
}

fn error_label(form: &Validator, key: &str) -> String {
    form.field_error(key)
        .map(|msg| format!("<label class=\"error\">{}</label>\n", escape_html(msg)))
        .unwrap_or_default()
}

pub fn home_page(snippets: &[Snippet]) -> String {
    let mut main = String::from("<h2>Latest Snippets</h2>\n");
    if snippets.is_empty() {
        main.push_str("<p>There's nothing to see here... yet!</p>\n");
        return main;
    }

    main.push_str("<table>\n<tr><th>Title</th><th>Created</th><th>ID</th></tr>\n");
    for snippet in snippets {
        let _ = writeln!(
            main,
            "<tr><td><a href=\"/snippet/view/{id}\">{title}</a></td><td>{created}</td><td>#{id}</td></tr>",
            id = snippet.id,
            title = escape_html(&snippet.title),
            created = human_date(&snippet.created),
        );
    }
    main.push_str("</table>\n");
    main
}

pub fn view_page(snippet: &Snippet) -> String {
    format!(
        r#"<div class="snippet">
  <div class="metadata">
    <strong>{title}</strong>
    <span>#{id}</span>
  </div>
  <pre><code>{content}</code></pre>
  <div class="metadata">
    <time>Created: {created}</time>
    <time>Expires: {expires}</time>
  </div>
</div>
"#,
        title = escape_html(&snippet.title),
        id = snippet.id,
        content = escape_html(&snippet.content),
        created = human_date(&snippet.created),
        expires = human_date(&snippet.expires),
    )
}

pub fn create_page(
    title: &str,
    content: &str,
    expires: i64,
    form: &Validator,
    csrf: &CsrfToken,
) -> String {
    let mut radios = String::new();
    for (days, label) in [(365, "One Year"), (7, "One Week"), (1, "One Day")] {
        let checked = if expires == days { " checked" } else { "" };
        let _ = write!(
            radios,
            "<input type=\"radio\" name=\"expires\" value=\"{days}\"{checked}> {label} "
        );
    }

    format!(
        r#"<form action="/snippet/create" method="POST">
  {csrf}
  <div>
    <label>Title:</label>
    {title_error}<input type="text" name="title" value="{title}">
  </div>
  <div>
    <label>Content:</label>
    {content_error}<textarea name="content">{content}</textarea>
  </div>
  <div>
    <label>Delete in:</label>
    {expires_error}{radios}
  </div>
  <div>
    <input type="submit" value="Publish snippet">
  </div>
</form>
"#,
        title_error = error_label(form, "title"),
        title = escape_html(title),
        content_error = error_label(form, "content"),
        content = escape_html(content),
        expires_error = error_label(form, "expires"),
        radios = radios,
        csrf = csrf_field(csrf),
    )
}

pub fn signup_page(name: &str, email: &str, form: &Validator, csrf: &CsrfToken) -> String {
    format!(
        r#"<form action="/user/signup" method="POST" novalidate>
  {csrf}
  <div>
    <label>Name:</label>
    {name_error}<input type="text" name="name" value="{name}">
  </div>
  <div>
    <label>Email:</label>
    {email_error}<input type="email" name="email" value="{email}">
  </div>
  <div>
    <label>Password:</label>
    {password_error}<input type="password" name="password">
  </div>
  <div>
    <input type="submit" value="Signup">
  </div>
</form>
"#,
        name_error = error_label(form, "name"),
        name = escape_html(name),
        email_error = error_label(form, "email"),
        email = escape_html(email),
        password_error = error_label(form, "password"),
        csrf = csrf_field(csrf),
    )
}

pub fn login_page(email: &str, form: &Validator, csrf: &CsrfToken) -> String {
    let non_field: String = form
        .non_field_errors
        .iter()
        .map(|msg| format!("<div class=\"error\">{}</div>\n", escape_html(msg)))
        .collect();

    format!(
        r#"<form action="/user/login" method="POST" novalidate>
  {csrf}
  {non_field}<div>
    <label>Email:</label>
    {email_error}<input type="email" name="email" value="{email}">
  </div>
  <div>
    <label>Password:</label>
    {password_error}<input type="password" name="password">
  </div>
  <div>
    <input type="submit" value="Login">
  </div>
</form>
"#,
        csrf = csrf_field(csrf),
        non_field = non_field,
        email_error = error_label(form, "email"),
        email = escape_html(email),
        password_error = error_label(form, "password"),
    )
}
