//! Output file naming and writing

use journallm_common::time::file_stamp;
use journallm_common::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// `journal-YYYYMMDD-HHMMSS.xml` in the working directory
pub fn default_journal_path() -> PathBuf {
    PathBuf::from(format!("journal-{}.xml", file_stamp()))
}

/// `advice-YYYYMMDD-HHMMSS.md` in the working directory
pub fn default_report_path() -> PathBuf {
    PathBuf::from(format!("advice-{}.md", file_stamp()))
}

/// Write `content`, creating missing parent directories
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    info!(path = %path.display(), bytes = content.len(), "Wrote output");
    Ok(())
}
