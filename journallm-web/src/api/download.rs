//! Report download
//!
//! GET /download/{job_id}

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use journallm_common::time::file_stamp;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Attachment name for a downloaded report
pub fn download_filename() -> String {
    format!("journallm-advice-{}.md", file_stamp())
}

/// GET /download/{job_id}
///
/// 404 for unknown jobs, 400 while the report is not ready.
pub async fn download_report(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = super::parse_job_id(&job_id)?;
    let job = state
        .jobs
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {id}")))?;

    let report = job
        .report
        .ok_or_else(|| ApiError::BadRequest(format!("Report for job {id} is not ready")))?;

    let disposition = format!("attachment; filename=\"{}\"", download_filename());
    tracing::info!(job_id = %id, "Report downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report,
    ))
}

/// Build download routes
pub fn download_routes() -> Router<AppState> {
    Router::new().route("/download/:job_id", get(download_report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_filename_shape() {
        let name = download_filename();
        assert!(name.starts_with("journallm-advice-"));
        assert!(name.ends_with(".md"));
        // journallm-advice-YYYYMMDD-HHMMSS.md
        assert_eq!(name.len(), "journallm-advice-".len() + 15 + 3);
    }
}
