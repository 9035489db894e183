//! In-memory job registry
//!
//! The outer map lock is held only to insert, look up or purge. Every job
//! sits behind its own lock, so transitions on one job never wait on
//! another, and a reader always clones a whole [`Job`] snapshot.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Job, JobStatus, JobTransitionError};

struct Slot {
    created_at: DateTime<Utc>,
    job: Arc<RwLock<Job>>,
}

/// Shared, cloneable handle to the job registry
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, Slot>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in `Starting` and return its snapshot
    pub async fn create(&self, filename: impl Into<String>) -> Job {
        let job = Job::new(filename);
        let slot = Slot {
            created_at: job.created_at,
            job: Arc::new(RwLock::new(job.clone())),
        };
        self.jobs.write().await.insert(job.id, slot);
        debug!(job_id = %job.id, filename = %job.filename, "Job created");
        job
    }

    /// Snapshot of a job, `None` when unknown or purged
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        let handle = self.handle(id).await?;
        let job = handle.read().await.clone();
        Some(job)
    }

    pub async fn mark_processing(&self, id: Uuid) -> Result<(), JobTransitionError> {
        self.transition(id, JobStatus::Processing, None).await
    }

    /// Move to `Complete`, storing the finished report with it
    pub async fn complete(
        &self,
        id: Uuid,
        result_location: impl Into<String>,
        report: String,
    ) -> Result<(), JobTransitionError> {
        let status = JobStatus::Complete {
            result_location: result_location.into(),
        };
        self.transition(id, status, Some(report)).await
    }

    pub async fn fail(&self, id: Uuid, message: impl Into<String>) -> Result<(), JobTransitionError> {
        let status = JobStatus::Error {
            message: message.into(),
        };
        self.transition(id, status, None).await
    }

    /// Drop every job created more than `max_age` ago; returns how many
    pub async fn purge_expired(&self, max_age: Duration) -> usize {
        let cutoff = match chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        {
            Some(cutoff) => cutoff,
            None => return 0,
        };

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, slot| slot.created_at >= cutoff);
        let purged = before - jobs.len();

        if purged > 0 {
            info!(purged, remaining = jobs.len(), "Purged expired jobs");
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    async fn handle(&self, id: Uuid) -> Option<Arc<RwLock<Job>>> {
        self.jobs.read().await.get(&id).map(|slot| Arc::clone(&slot.job))
    }

    async fn transition(
        &self,
        id: Uuid,
        status: JobStatus,
        report: Option<String>,
    ) -> Result<(), JobTransitionError> {
        let handle = self.handle(id).await.ok_or(JobTransitionError::NotFound(id))?;

        // Status and report change under one write guard
        let mut job = handle.write().await;
        job.transition_to(status)?;
        if report.is_some() {
            job.report = report;
        }
        debug!(job_id = %id, status = job.status.as_str(), "Job transitioned");
        Ok(())
    }
}
