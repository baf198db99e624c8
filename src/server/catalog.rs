//! Static file server for the game catalog
//!
//! Serves a directory as-is with caching disabled. Missing paths get the
//! directory's `404.html` with status 404 when that page exists.

use axum::http::{header, HeaderValue};
use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub const NOT_FOUND_PAGE: &str = "404.html";

pub fn catalog_router(root: &Path) -> Router {
    let not_found = root.join(NOT_FOUND_PAGE);
    let files = ServeDir::new(root);

    let app = if not_found.is_file() {
        Router::new().fallback_service(files.not_found_service(ServeFile::new(not_found)))
    } else {
        Router::new().fallback_service(files)
    };

    app.layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        header::EXPIRES,
        HeaderValue::from_static("0"),
    ))
    .layer(TraceLayer::new_for_http())
}
