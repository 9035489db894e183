//! Background job execution
//!
//! Each accepted upload becomes one [`WorkItem`] handed to
//! [`JobRunner::dispatch`], which spawns a single tokio task that owns every
//! status transition of that job. The upload handler returns as soon as the
//! task is spawned.

use journallm_common::generation::{AnthropicClient, GenerationSettings, ReportGenerator};
use journallm_common::pipeline::{extract_journal, generate_report};
use journallm_common::{Error, RawInput};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::job_store::JobStore;

/// Everything the worker needs for one job
pub struct WorkItem {
    pub job_id: Uuid,
    pub input: RawInput,
    /// Caller-supplied credential, if any
    pub api_key: Option<String>,
}

/// Chooses the generator for a job
pub trait GeneratorSource: Send + Sync {
    /// True when a credential is configured server-side, so uploads may omit one
    fn has_server_key(&self) -> bool;

    /// Generator for a job; a caller-supplied key takes precedence
    ///
    /// # Errors
    /// `MissingCredential` when neither key is available
    fn generator_for(&self, api_key: Option<&str>) -> journallm_common::Result<Arc<dyn ReportGenerator>>;
}

/// Production source backed by the Anthropic client
///
/// A server key builds one shared client at startup; a caller key builds a
/// client for that job only.
pub struct AnthropicSource {
    settings: GenerationSettings,
    shared: Option<Arc<dyn ReportGenerator>>,
}

impl AnthropicSource {
    pub fn new(server_key: Option<&str>, settings: GenerationSettings) -> journallm_common::Result<Self> {
        let shared = match server_key {
            Some(key) => Some(Arc::new(AnthropicClient::new(key, settings.clone())?) as Arc<dyn ReportGenerator>),
            None => None,
        };
        Ok(Self { settings, shared })
    }
}

impl GeneratorSource for AnthropicSource {
    fn has_server_key(&self) -> bool {
        self.shared.is_some()
    }

    fn generator_for(&self, api_key: Option<&str>) -> journallm_common::Result<Arc<dyn ReportGenerator>> {
        match (api_key.filter(|k| !k.trim().is_empty()), &self.shared) {
            (Some(key), _) => Ok(Arc::new(AnthropicClient::new(key, self.settings.clone())?)),
            (None, Some(shared)) => Ok(Arc::clone(shared)),
            (None, None) => Err(Error::MissingCredential),
        }
    }
}

/// Spawns and drives job tasks
#[derive(Clone)]
pub struct JobRunner {
    store: JobStore,
    generators: Arc<dyn GeneratorSource>,
    max_input_bytes: u64,
}

impl JobRunner {
    pub fn new(store: JobStore, generators: Arc<dyn GeneratorSource>, max_input_bytes: u64) -> Self {
        Self {
            store,
            generators,
            max_input_bytes,
        }
    }

    pub fn has_server_key(&self) -> bool {
        self.generators.has_server_key()
    }

    /// Start processing a job in the background
    pub fn dispatch(&self, item: WorkItem) -> JoinHandle<()> {
        let runner = self.clone();
        tokio::spawn(async move {
            let job_id = item.job_id;
            info!(job_id = %job_id, filename = %item.input.name, "Background job task started");

            if let Err(e) = runner.store.mark_processing(job_id).await {
                warn!(job_id = %job_id, error = %e, "Job vanished before processing");
                return;
            }

            // Inner task so a panic still ends the job in a terminal state
            let worker = runner.clone();
            let processed = tokio::spawn(async move { worker.process(item).await })
                .await
                .map_err(|e| anyhow::anyhow!("Job task aborted: {e}"))
                .and_then(|result| result);

            let outcome = match processed {
                Ok(report) => {
                    let location = report_location(job_id);
                    runner.store.complete(job_id, location, report).await
                }
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "Job failed");
                    runner.store.fail(job_id, e.to_string()).await
                }
            };

            match outcome {
                Ok(()) => info!(job_id = %job_id, "Background job task finished"),
                Err(e) => warn!(job_id = %job_id, error = %e, "Final job transition rejected"),
            }
        })
    }

    /// Parse, normalize and generate; no retry
    async fn process(&self, item: WorkItem) -> anyhow::Result<String> {
        let generator = self.generators.generator_for(item.api_key.as_deref())?;

        let limit = self.max_input_bytes;
        let input = item.input;
        let journal = tokio::task::spawn_blocking(move || extract_journal(std::slice::from_ref(&input), limit))
            .await
            .map_err(|e| anyhow::anyhow!("Parsing task aborted: {e}"))??;

        info!(job_id = %item.job_id, entries = journal.len(), "Journal extracted, generating report");
        let report = generate_report(generator.as_ref(), &journal).await?;
        Ok(report)
    }
}

/// Where a finished job's report is served
pub fn report_location(job_id: Uuid) -> String {
    format!("/report/{job_id}")
}
