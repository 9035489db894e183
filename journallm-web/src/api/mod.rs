//! HTTP API handlers for journallm-web
//!
//! Upload-and-poll workflow: `POST /upload` returns a job id immediately,
//! `GET /status/{id}` reports progress, and the finished report is served by
//! the report page and `GET /download/{id}`.

pub mod download;
pub mod health;
pub mod status;
pub mod ui;
pub mod upload;

pub use download::download_routes;
pub use health::health_routes;
pub use status::status_routes;
pub use ui::ui_routes;
pub use upload::upload_routes;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a job id path segment; malformed ids are reported as unknown jobs
pub(crate) fn parse_job_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("Job not found: {raw}")))
}
