//! Job state machine
//!
//! A job moves `Starting → Processing → Complete | Error`. The two terminal
//! states carry their payload inside the variant, so a result location
//! without completion (or an error message without failure) cannot be
//! represented.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Current status of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, worker not yet running
    Starting,
    /// Parsing or generating
    Processing,
    /// Report ready at `result_location`
    Complete { result_location: String },
    /// Failed; `message` is shown to the user
    Error { message: String },
}

impl JobStatus {
    /// Wire name used by the status endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Processing => "processing",
            JobStatus::Complete { .. } => "complete",
            JobStatus::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete { .. } | JobStatus::Error { .. })
    }
}

/// Rejected status change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobTransitionError {
    #[error("Job not found: {0}")]
    NotFound(Uuid),

    #[error("Job {id} cannot move from {from} to {to}")]
    Illegal {
        id: Uuid,
        from: &'static str,
        to: &'static str,
    },
}

/// One asynchronous processing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    /// Name of the uploaded file
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Finished markdown report, set together with `Complete`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

impl Job {
    pub fn new(filename: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Starting,
            filename: filename.into(),
            created_at: now,
            updated_at: now,
            report: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a status change, enforcing the lifecycle
    ///
    /// Allowed: `Starting → Processing`, `Starting | Processing → Error`,
    /// `Processing → Complete`. Terminal states never change.
    pub fn transition_to(&mut self, next: JobStatus) -> Result<(), JobTransitionError> {
        let allowed = matches!(
            (&self.status, &next),
            (JobStatus::Starting, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Complete { .. })
                | (JobStatus::Starting | JobStatus::Processing, JobStatus::Error { .. })
        );
        if !allowed {
            return Err(JobTransitionError::Illegal {
                id: self.id,
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `result_location` when complete
    pub fn result_location(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Complete { result_location } => Some(result_location),
            _ => None,
        }
    }

    /// `message` when failed
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Error { message } => Some(message),
            _ => None,
        }
    }
}
