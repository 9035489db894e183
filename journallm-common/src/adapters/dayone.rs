//! Day One JSON export adapter
//!
//! Accepts the export document (`{"metadata": ..., "entries": [...]}`) and
//! the container-less form (a bare array of entry objects). Only the fields
//! the report needs are read; everything else in the export is ignored.

use crate::entry::{Entry, EntryGroup};
use crate::time::parse_timestamp;
use crate::{Error, Result};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportDocument {
    Wrapped { entries: Vec<RawEntry> },
    Bare(Vec<RawEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    creation_date: Option<String>,
    modified_date: Option<String>,
    location: Option<RawLocation>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    address: Option<String>,
    place_name: Option<String>,
    locality_name: Option<String>,
}

impl RawLocation {
    /// Street address, else place name, else locality
    fn best_label(self) -> Option<String> {
        [self.address, self.place_name, self.locality_name]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Parse one export file into a group tagged with `journal_name`
///
/// `source_name` identifies the file (or archive member) in error messages.
pub fn parse_export(source_name: &str, journal_name: Option<String>, bytes: &[u8]) -> Result<EntryGroup> {
    let document: ExportDocument = serde_json::from_slice(bytes)
        .map_err(|e| Error::malformed(source_name, format!("invalid journal export: {e}")))?;

    let raw_entries = match document {
        ExportDocument::Wrapped { entries } => entries,
        ExportDocument::Bare(entries) => entries,
    };

    let mut entries = Vec::with_capacity(raw_entries.len());
    for (index, raw) in raw_entries.into_iter().enumerate() {
        let created = raw
            .creation_date
            .as_deref()
            .ok_or_else(|| Error::malformed(source_name, format!("entry {index} has no creationDate")))
            .and_then(|value| {
                parse_timestamp(value).ok_or_else(|| {
                    Error::malformed(source_name, format!("entry {index} has invalid creationDate '{value}'"))
                })
            })?;

        let modified = raw.modified_date.as_deref().and_then(|value| {
            let parsed = parse_timestamp(value);
            if parsed.is_none() {
                warn!(source = %source_name, entry = index, value = %value, "Ignoring unparseable modifiedDate");
            }
            parsed
        });

        entries.push(
            Entry::new(created, raw.text.unwrap_or_default())
                .with_modified(modified)
                .with_location(raw.location.and_then(RawLocation::best_label))
                .with_journal_name(journal_name.clone()),
        );
    }

    debug!(source = %source_name, entries = entries.len(), "Parsed journal export");
    Ok(EntryGroup::new(journal_name, entries))
}
