//! Journal upload
//!
//! POST /upload (multipart: `file`, optional `api_key`)
//!
//! All validation happens before a job exists; a rejected upload leaves the
//! job store untouched.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use journallm_common::format::check_size;
use journallm_common::{Error, InputFormat, RawInput};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::worker::WorkItem;
use crate::AppState;

/// POST /upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub job_id: Uuid,
}

/// Strip any client-side directory from a submitted file name
fn base_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim()
}

fn multipart_error(state: &AppState, err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!(
            "Upload exceeds the limit of {} bytes",
            state.max_upload_bytes
        ))
    } else {
        ApiError::BadRequest(format!("Multipart error: {err}"))
    }
}

/// POST /upload
///
/// Returns `{job_id}` as soon as the background task is spawned.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut api_key: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&state, e))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let filename = base_name(field.file_name().unwrap_or_default()).to_string();
                if filename.is_empty() {
                    return Err(ApiError::BadRequest("No file selected".to_string()));
                }
                // Reject by extension before reading the body
                InputFormat::from_path(&filename)?;

                let bytes = field.bytes().await.map_err(|e| multipart_error(&state, e))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("api_key") => {
                let value = field.text().await.map_err(|e| multipart_error(&state, e))?;
                api_key = Some(value.trim().to_string()).filter(|k| !k.is_empty());
            }
            other => tracing::debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::BadRequest("No file part in the request".to_string()))?;
    check_size(bytes.len() as u64, state.max_upload_bytes)?;

    if api_key.is_none() && !state.runner.has_server_key() {
        return Err(Error::MissingCredential.into());
    }

    let job = state.jobs.create(&filename).await;
    tracing::info!(
        job_id = %job.id,
        filename = %filename,
        bytes = bytes.len(),
        caller_key = api_key.is_some(),
        "Upload accepted"
    );

    state.runner.dispatch(WorkItem {
        job_id: job.id,
        input: RawInput::new(filename, bytes),
        api_key,
    });

    state.jobs.purge_expired(state.job_retention).await;

    Ok(Json(UploadResponse { job_id: job.id }))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}
