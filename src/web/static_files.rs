use axum::{
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

use super::templates::UiAssets;

/// Static files may be cached briefly; they are not content-hashed.
const STATIC_CACHE: &str = "public, max-age=3600";

/// Get MIME type from file extension. Only supports types we actually serve.
fn mime_from_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("ico") => "image/x-icon",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Serve a file from `ui/static/`.
pub async fn static_handler(Path(path): Path<String>) -> Response {
    serve_asset::<UiAssets>(&format!("static/{}", path))
}

fn serve_asset<T: Embed>(path: &str) -> Response {
    match T::get(path) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, mime_from_path(path)),
                (header::CACHE_CONTROL, STATIC_CACHE),
            ],
            content.data,
        )
            .into_response(),
        None => super::error::status_text(StatusCode::NOT_FOUND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path("css/main.css"), "text/css");
        assert_eq!(mime_from_path("img/logo.png"), "image/png");
        assert_eq!(mime_from_path("README"), "application/octet-stream");
    }

    #[test]
    fn test_serve_known_and_unknown() {
        let response = serve_asset::<UiAssets>("static/css/main.css");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");

        let response = serve_asset::<UiAssets>("static/nope.css");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
