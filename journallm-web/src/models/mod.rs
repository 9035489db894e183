//! Data models for journallm-web

pub mod job;

pub use job::{Job, JobStatus, JobTransitionError};
