//! UI Routes - HTML pages for the JournalLM web interface
//!
//! Vanilla HTML/CSS/JS, no frameworks:
//!
//! - **Static Assets** (`static_assets`): embedded CSS/JS
//! - **Root Page** (`root`): upload form with status polling
//! - **Report Page** (`report`): finished report with download link

use axum::{routing::get, Router};
use crate::AppState;

mod report;
mod root;
mod static_assets;

use report::report_page;
use root::root_page;
use static_assets::{serve_journallm_css, serve_upload_js};

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_page))
        .route("/report/:job_id", get(report_page))
        .route("/static/journallm.css", get(serve_journallm_css))
        .route("/static/upload.js", get(serve_upload_js))
}

/// Header shared by every page, with build identification on the right
fn page_header() -> String {
    format!(
        r#"<header>
        <span class="build-info">v{} [{}] {}</span>
        <h1>JournalLM</h1>
        <p>Personal advice from your journal</p>
    </header>"#,
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
    )
}
