//! Canonical journal entry model
//!
//! Every adapter produces [`Entry`] values; the normalizer merges and orders
//! them. Entries are immutable once built: fields are private and the
//! `with_*` methods consume `self`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped journal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    journal_name: Option<String>,
    text: String,
}

impl Entry {
    /// Create an entry with the two required fields
    pub fn new(created: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            created,
            modified: None,
            location: None,
            journal_name: None,
            text: text.into(),
        }
    }

    pub fn with_modified(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.modified = modified;
        self
    }

    /// Attach a location; blank strings are treated as absent
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_journal_name(mut self, journal_name: Option<String>) -> Self {
        self.journal_name = journal_name;
        self
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn journal_name(&self) -> Option<&str> {
        self.journal_name.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Entries produced from one named source (one sub-journal of an archive,
/// one export file, one freeform document)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGroup {
    /// Journal name (file stem), `None` when the source carries no name
    pub name: Option<String>,
    pub entries: Vec<Entry>,
}

impl EntryGroup {
    pub fn new(name: Option<String>, entries: Vec<Entry>) -> Self {
        Self { name, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
