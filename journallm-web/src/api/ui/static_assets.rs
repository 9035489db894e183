//! Static asset handlers, embedded at compile time

use axum::{http::StatusCode, response::{IntoResponse, Response}};

const JOURNALLM_CSS: &str = include_str!("../../../static/journallm.css");
const UPLOAD_JS: &str = include_str!("../../../static/upload.js");

/// GET /static/journallm.css
pub async fn serve_journallm_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        JOURNALLM_CSS,
    )
        .into_response()
}

/// GET /static/upload.js
pub async fn serve_upload_js() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "application/javascript"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        UPLOAD_JS,
    )
        .into_response()
}
