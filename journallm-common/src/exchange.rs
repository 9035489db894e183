//! Canonical exchange format (XML)
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <journal>
//!   <entry>
//!     <created>2024-01-02T08:00:00Z</created>
//!     <modified>2024-01-02T09:00:00Z</modified>
//!     <journal_name>Work</journal_name>
//!     <loc>Lisbon</loc>
//!     <text>...</text>
//!   </entry>
//! </journal>
//! ```
//!
//! `modified`, `journal_name` and `loc` are omitted when absent. The same
//! document is both the pipeline's output and an accepted input, so a saved
//! journal can be fed back in without re-adapting the original export.

use crate::entry::Entry;
use crate::time::{format_timestamp, parse_timestamp};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Write;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Serialize entries in the given order
///
/// Journal names are written only when `include_journal_names` is set.
pub fn write(entries: &[Entry], include_journal_names: bool) -> String {
    let mut out = String::with_capacity(64 + entries.iter().map(|e| e.text().len() + 96).sum::<usize>());
    out.push_str(XML_DECLARATION);
    out.push_str("\n<journal>\n");

    for entry in entries {
        out.push_str("  <entry>\n");
        write_element(&mut out, "created", &format_timestamp(entry.created()));
        if let Some(modified) = entry.modified() {
            write_element(&mut out, "modified", &format_timestamp(modified));
        }
        if include_journal_names {
            if let Some(name) = entry.journal_name() {
                write_element(&mut out, "journal_name", name);
            }
        }
        if let Some(location) = entry.location() {
            write_element(&mut out, "loc", location);
        }
        write_element(&mut out, "text", entry.text());
        out.push_str("  </entry>\n");
    }

    out.push_str("</journal>\n");
    out
}

fn write_element(out: &mut String, tag: &str, value: &str) {
    // Writing into a String cannot fail
    let _ = writeln!(out, "    <{tag}>{}</{tag}>", escape(value));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Created,
    Modified,
    JournalName,
    Location,
    Text,
    Unknown,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Self {
        match tag {
            b"created" => Field::Created,
            b"modified" => Field::Modified,
            b"journal_name" => Field::JournalName,
            b"loc" => Field::Location,
            b"text" => Field::Text,
            _ => Field::Unknown,
        }
    }
}

#[derive(Debug, Default)]
struct PartialEntry {
    created: Option<String>,
    modified: Option<String>,
    journal_name: Option<String>,
    location: Option<String>,
    text: Option<String>,
}

impl PartialEntry {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Created => self.created = Some(value),
            Field::Modified => self.modified = Some(value),
            Field::JournalName => self.journal_name = Some(value),
            Field::Location => self.location = Some(value),
            Field::Text => self.text = Some(value),
            Field::Unknown => {}
        }
    }

    fn finish(self, source_name: &str, index: usize) -> Result<Entry> {
        let created = self
            .created
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| Error::malformed(source_name, format!("entry {index} has a missing or invalid <created>")))?;

        // Older exports always emit <modified>, possibly empty
        let modified = optional_timestamp(self.modified.as_deref(), source_name, index)?;

        Ok(Entry::new(created, self.text.unwrap_or_default())
            .with_modified(modified)
            .with_journal_name(self.journal_name.filter(|n| !n.is_empty()))
            .with_location(self.location))
    }
}

fn optional_timestamp(value: Option<&str>, source_name: &str, index: usize) -> Result<Option<DateTime<Utc>>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_timestamp(v)
            .map(Some)
            .ok_or_else(|| Error::malformed(source_name, format!("entry {index} has invalid <modified> '{v}'"))),
    }
}

/// Parse an exchange document
///
/// # Errors
/// `MalformedInput` if the XML is not well formed or ends early, the root
/// element is not `<journal>`, a field contains markup, or an entry lacks a
/// valid `<created>`.
pub fn parse(source_name: &str, xml: &str) -> Result<Vec<Entry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut root_seen = false;
    let mut root_closed = false;
    let mut current: Option<PartialEntry> = None;
    let mut field: Option<Field> = None;
    let mut value = String::new();

    let xml_error = |reader: &Reader<&[u8]>, e: &dyn std::fmt::Display| {
        Error::malformed(source_name, format!("XML error at byte {}: {e}", reader.buffer_position()))
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                if field.is_some() {
                    return Err(nested_element(source_name, name.as_ref(), entries.len()));
                }
                if !root_seen {
                    expect_root(source_name, name.as_ref())?;
                    root_seen = true;
                } else if name.as_ref() == b"entry" {
                    if current.is_some() {
                        return Err(Error::malformed(source_name, "nested <entry> element"));
                    }
                    current = Some(PartialEntry::default());
                } else if current.is_some() {
                    field = Some(Field::from_tag(name.as_ref()));
                    value.clear();
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.local_name();
                if field.is_some() {
                    return Err(nested_element(source_name, name.as_ref(), entries.len()));
                }
                if !root_seen {
                    // `<journal/>`: an empty journal
                    expect_root(source_name, name.as_ref())?;
                    root_seen = true;
                    root_closed = true;
                } else if name.as_ref() == b"entry" {
                    return Err(Error::malformed(
                        source_name,
                        format!("entry {} has a missing or invalid <created>", entries.len()),
                    ));
                } else if let Some(entry) = current.as_mut() {
                    entry.set(Field::from_tag(name.as_ref()), String::new());
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    let text = e.unescape().map_err(|err| xml_error(&reader, &err))?;
                    value.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    value.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                if name.as_ref() == b"entry" {
                    if let Some(partial) = current.take() {
                        let index = entries.len();
                        entries.push(partial.finish(source_name, index)?);
                    }
                } else if name.as_ref() == b"journal" && current.is_none() {
                    root_closed = true;
                } else if let (Some(f), Some(entry)) = (field.take(), current.as_mut()) {
                    entry.set(f, std::mem::take(&mut value));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, &e)),
            _ => {}
        }
    }

    if !root_seen {
        return Err(Error::malformed(source_name, "document has no <journal> root element"));
    }
    if current.is_some() {
        return Err(Error::malformed(
            source_name,
            format!("document ends inside entry {}", entries.len()),
        ));
    }
    if !root_closed {
        return Err(Error::malformed(source_name, "document ends before </journal>"));
    }

    Ok(entries)
}

/// Parse exchange bytes (must be UTF-8)
pub fn parse_bytes(source_name: &str, bytes: &[u8]) -> Result<Vec<Entry>> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| Error::malformed(source_name, format!("not valid UTF-8: {e}")))?;
    parse(source_name, xml)
}

/// Entry fields hold text only; markup inside one is not ours
fn nested_element(source_name: &str, name: &[u8], index: usize) -> Error {
    Error::malformed(
        source_name,
        format!("entry {index} has unexpected <{}> inside a field", String::from_utf8_lossy(name)),
    )
}

fn expect_root(source_name: &str, name: &[u8]) -> Result<()> {
    if name != b"journal" {
        return Err(Error::malformed(
            source_name,
            format!("expected <journal> root element, found <{}>", String::from_utf8_lossy(name)),
        ));
    }
    Ok(())
}
