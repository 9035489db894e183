//! journallm-web library interface
//!
//! Exposes the router and state for the binary and for integration tests.

pub mod api;
pub mod error;
pub mod job_store;
pub mod models;
pub mod worker;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use journallm_common::config::Settings;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::job_store::JobStore;
use crate::worker::{AnthropicSource, GeneratorSource, JobRunner};

/// Headroom over the file limit for multipart framing and the other fields
const MULTIPART_SLACK_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Every job accepted since startup (minus purged ones)
    pub jobs: JobStore,
    /// Spawns one background task per accepted upload
    pub runner: JobRunner,
    /// Largest accepted upload
    pub max_upload_bytes: u64,
    /// Jobs older than this are purged on the next upload
    pub job_retention: Duration,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State backed by the real generation service
    pub fn from_settings(settings: &Settings) -> journallm_common::Result<Self> {
        let source = AnthropicSource::new(settings.api_key.as_deref(), settings.generation.clone())?;
        Ok(Self::new(Arc::new(source), settings.max_upload_bytes, settings.job_retention))
    }

    pub fn new(generators: Arc<dyn GeneratorSource>, max_upload_bytes: u64, job_retention: Duration) -> Self {
        let jobs = JobStore::new();
        Self {
            runner: JobRunner::new(jobs.clone(), generators, max_upload_bytes),
            jobs,
            max_upload_bytes,
            job_retention,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_SLACK_BYTES);

    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // API routes
        .merge(api::upload_routes())
        .merge(api::status_routes())
        .merge(api::download_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
