//! Local pipeline commands
//!
//! `extract` normalizes inputs into the XML exchange format; `report` also
//! sends the journal to the generator. A `.xml` input is a previously
//! extracted journal and is read back through the same pipeline. `submit`
//! hands a file to a running journallm-web service instead.

use journallm_common::generation::ReportGenerator;
use journallm_common::pipeline::{extract_journal, generate_report};
use journallm_common::{NormalizedJournal, RawInput, Result, MAX_INPUT_BYTES};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::output::{default_journal_path, default_report_path, write_output};
use crate::poller::{PollOutcome, StatusPoller};

/// Where `report` should keep the intermediate journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveJournal {
    No,
    /// Save under the default timestamped name
    DefaultPath,
    At(PathBuf),
}

impl From<Option<Option<PathBuf>>> for SaveJournal {
    fn from(arg: Option<Option<PathBuf>>) -> Self {
        match arg {
            None => SaveJournal::No,
            Some(None) => SaveJournal::DefaultPath,
            Some(Some(path)) => SaveJournal::At(path),
        }
    }
}

/// Files written by a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Written {
    pub journal: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

fn load_journal(inputs: &[PathBuf]) -> Result<NormalizedJournal> {
    let raw = inputs
        .iter()
        .map(|path| RawInput::from_path(path, MAX_INPUT_BYTES))
        .collect::<Result<Vec<_>>>()?;
    extract_journal(&raw, MAX_INPUT_BYTES)
}

/// Normalize `inputs` and write the XML journal
pub fn extract(inputs: &[PathBuf], output: Option<&Path>) -> Result<Written> {
    let journal = load_journal(inputs)?;
    let path = output.map(Path::to_path_buf).unwrap_or_else(default_journal_path);
    write_output(&path, &journal.to_xml())?;

    info!(entries = journal.len(), path = %path.display(), "Journal extracted");
    Ok(Written {
        journal: Some(path),
        report: None,
    })
}

/// Normalize `inputs`, generate the report and write it
pub async fn report(
    inputs: &[PathBuf],
    output: Option<&Path>,
    save_journal: SaveJournal,
    generator: &dyn ReportGenerator,
) -> Result<Written> {
    let journal = load_journal(inputs)?;

    let journal_path = match save_journal {
        SaveJournal::No => None,
        SaveJournal::DefaultPath => Some(default_journal_path()),
        SaveJournal::At(path) => Some(path),
    };
    if let Some(path) = &journal_path {
        write_output(path, &journal.to_xml())?;
    }

    let report = generate_report(generator, &journal).await?;
    let report_path = output.map(Path::to_path_buf).unwrap_or_else(default_report_path);
    write_output(&report_path, &report)?;

    info!(entries = journal.len(), path = %report_path.display(), "Report written");
    Ok(Written {
        journal: journal_path,
        report: Some(report_path),
    })
}

/// How a `submit` run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// Report downloaded to `report`; also viewable at `redirect`
    Saved {
        job_id: Uuid,
        report: PathBuf,
        redirect: String,
    },
    /// Stopped waiting; the job keeps running on the server
    Cancelled { job_id: Uuid },
}

/// Upload `file`, wait for the job and save the finished report
///
/// Only the explicitly given `api_key` is uploaded. Keys from the
/// environment or config file stay local, since the server may hold its own.
pub async fn submit(
    poller: &StatusPoller,
    file: &Path,
    api_key: Option<&str>,
    output: Option<&Path>,
    cancel: CancellationToken,
) -> Result<Submitted> {
    let job_id = poller.submit(file, api_key).await?;

    match poller.poll_until_terminal(job_id, cancel).await? {
        PollOutcome::Complete { redirect } => {
            let report = poller.download(job_id).await?;
            let path = output.map(Path::to_path_buf).unwrap_or_else(default_report_path);
            write_output(&path, &report)?;
            info!(job_id = %job_id, path = %path.display(), "Report downloaded");
            Ok(Submitted::Saved {
                job_id,
                report: path,
                redirect,
            })
        }
        PollOutcome::Cancelled => {
            warn!(job_id = %job_id, "Stopped waiting; the job keeps running on the server");
            Ok(Submitted::Cancelled { job_id })
        }
    }
}
