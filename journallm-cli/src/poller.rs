//! Client for a running journallm-web service
//!
//! [`StatusPoller::submit`] uploads a journal after the same pre-flight
//! checks the upload page runs in the browser. [`StatusPoller::poll_until_terminal`]
//! then asks for the job's status every `interval` until it finishes or
//! the caller cancels.

use journallm_common::{Error, RawInput, Result, MAX_INPUT_BYTES};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How polling ended without an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Job finished; the report is served at `redirect`
    Complete { redirect: String },
    /// Cancellation token fired before the job finished
    Cancelled,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    job_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    redirect: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Upload and status client
#[derive(Debug, Clone)]
pub struct StatusPoller {
    client: reqwest::Client,
    base_url: String,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(base_url: impl Into<String>, interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("journallm-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interval,
        })
    }

    /// Absolute URL for a server path such as `/report/{id}`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a journal file and return the new job id
    ///
    /// Extension and size are checked locally first; an unsupported or
    /// oversized file is never sent.
    pub async fn submit(&self, path: &Path, api_key: Option<&str>) -> Result<Uuid> {
        let input = RawInput::from_path(path, MAX_INPUT_BYTES)?;
        info!(file = %input.name, bytes = input.size(), "Uploading journal");

        let part = Part::bytes(input.bytes).file_name(input.name);
        let mut form = Form::new().part("file", part);
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            form = form.text("api_key", key.trim().to_string());
        }

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::TransportFailure(format!("upload failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(Error::TransportFailure(format!(
                "upload rejected (HTTP {}): {}",
                status.as_u16(),
                message
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::TransportFailure(format!("invalid upload response: {e}")))?;
        info!(job_id = %body.job_id, "Upload accepted");
        Ok(body.job_id)
    }

    /// Poll `GET /status/{id}` until the job completes, fails or `cancel` fires
    ///
    /// # Errors
    /// - `GenerationServiceFailure` carrying the job's message when it fails
    /// - `TransportFailure` on network errors, unknown jobs or unrecognized
    ///   statuses; polling stops immediately
    pub async fn poll_until_terminal(&self, job_id: Uuid, cancel: CancellationToken) -> Result<PollOutcome> {
        let url = self.url(&format!("/status/{job_id}"));

        loop {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
                status = self.fetch_status(&url) => status?,
            };

            match status.status.as_str() {
                "complete" => {
                    let redirect = status.redirect.ok_or_else(|| {
                        Error::TransportFailure("complete status without a redirect".to_string())
                    })?;
                    info!(job_id = %job_id, redirect = %redirect, "Job complete");
                    return Ok(PollOutcome::Complete { redirect });
                }
                "error" => {
                    let message = status.error.unwrap_or_else(|| "unknown error".to_string());
                    return Err(Error::GenerationServiceFailure(message));
                }
                "starting" | "processing" => {
                    debug!(job_id = %job_id, status = %status.status, "Job still running");
                }
                other => {
                    return Err(Error::TransportFailure(format!("unrecognized job status '{other}'")));
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Fetch a finished report's markdown
    pub async fn download(&self, job_id: Uuid) -> Result<String> {
        let response = self
            .client
            .get(self.url(&format!("/download/{job_id}")))
            .send()
            .await
            .map_err(|e| Error::TransportFailure(format!("download failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response).await;
            return Err(Error::TransportFailure(format!(
                "download rejected (HTTP {}): {}",
                status.as_u16(),
                message
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::TransportFailure(format!("download failed: {e}")))
    }

    async fn fetch_status(&self, url: &str) -> Result<StatusResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::TransportFailure(format!("status request failed: {e}")))?;

        match response.status() {
            StatusCode::OK => response
                .json()
                .await
                .map_err(|e| Error::TransportFailure(format!("invalid status response: {e}"))),
            status => {
                let message = error_message(response).await;
                Err(Error::TransportFailure(format!(
                    "status request failed (HTTP {}): {}",
                    status.as_u16(),
                    message
                )))
            }
        }
    }
}

/// `{"error": ...}` body when present, raw text otherwise
async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}
