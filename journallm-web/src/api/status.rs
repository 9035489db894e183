//! Job status polling
//!
//! GET /status/{job_id}

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::models::Job;
use crate::AppState;

/// GET /status/{job_id} response
///
/// `redirect` is present only when complete, `error` only on failure.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for StatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            status: job.status.as_str(),
            filename: job.filename.clone(),
            redirect: job.result_location().map(str::to_string),
            error: job.error_message().map(str::to_string),
        }
    }
}

/// GET /status/{job_id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let id = super::parse_job_id(&job_id)?;
    let job = state
        .jobs
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {id}")))?;

    tracing::debug!(job_id = %id, status = job.status.as_str(), "Status query");
    Ok(Json(StatusResponse::from(&job)))
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/status/:job_id", get(get_status))
}
