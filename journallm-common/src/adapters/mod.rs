//! Format adapters
//!
//! Convert one raw input (bytes + name) into [`EntryGroup`]s. Adapters either
//! succeed completely or fail without producing any entries; callers never
//! see a partially parsed input.
//!
//! - **Archive** (`archive`): zip of Day One JSON exports, one group per member
//! - **Structured export** (`dayone`): a single Day One JSON export
//! - **Exchange** (`crate::exchange`): the normalizer's own XML output
//! - **Freeform** (`freeform`): plain text or markdown, one entry

pub mod archive;
pub mod dayone;
pub mod freeform;

use crate::entry::EntryGroup;
use crate::format::{check_size, InputFormat};
use crate::{exchange, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info};

/// One raw journal input as received from disk or an upload
#[derive(Debug, Clone)]
pub struct RawInput {
    /// File name including extension (used for format inference and naming)
    pub name: String,
    pub bytes: Vec<u8>,
    /// Source modification time, when known
    pub modified: Option<DateTime<Utc>>,
}

impl RawInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.modified = modified;
        self
    }

    /// Read an input file from disk
    ///
    /// The extension and the on-disk size are checked before the body is
    /// read, so an oversized or unsupported file is never loaded.
    pub fn from_path(path: impl AsRef<Path>, limit: u64) -> Result<Self> {
        let path = path.as_ref();
        InputFormat::from_path(path)?;

        let metadata = std::fs::metadata(path)?;
        check_size(metadata.len(), limit)?;

        let bytes = std::fs::read(path)?;
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        debug!(path = %path.display(), bytes = bytes.len(), "Loaded input file");
        Ok(Self::new(name, bytes).with_modified(modified))
    }

    pub fn format(&self) -> Result<InputFormat> {
        InputFormat::from_path(&self.name)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        file_stem(&self.name)
    }
}

/// Validate and adapt one input
///
/// # Errors
/// - `UnsupportedFormat` for an unknown extension
/// - `TooLarge` when the input exceeds `limit` (checked before parsing)
/// - `MalformedInput` when the content cannot be parsed
pub fn load(input: &RawInput, limit: u64) -> Result<Vec<EntryGroup>> {
    let format = input.format()?;
    check_size(input.size(), limit)?;

    let groups = adapt(input, format)?;
    info!(
        input = %input.name,
        format = %format,
        groups = groups.len(),
        entries = groups.iter().map(EntryGroup::len).sum::<usize>(),
        "Adapted journal input"
    );
    Ok(groups)
}

/// Run the adapter for `format`
pub fn adapt(input: &RawInput, format: InputFormat) -> Result<Vec<EntryGroup>> {
    match format {
        InputFormat::Archive => archive::parse_archive(&input.name, &input.bytes),
        InputFormat::StructuredExport => {
            let group = dayone::parse_export(&input.name, Some(input.stem()), &input.bytes)?;
            Ok(vec![group])
        }
        InputFormat::Exchange => {
            let entries = exchange::parse_bytes(&input.name, &input.bytes)?;
            Ok(vec![EntryGroup::new(None, entries)])
        }
        InputFormat::Freeform => Ok(vec![freeform::parse_document(input)?]),
    }
}

pub(crate) fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}
