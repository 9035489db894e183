//! Zip archive adapter
//!
//! A Day One backup is a zip holding one JSON export per journal, plus
//! attachment folders (photos, audio). Each `*.json` member becomes one
//! group named by its file stem; everything else is skipped. When two
//! members share a stem in different folders, both are named by their
//! path inside the archive instead.

use super::{dayone, file_stem};
use crate::entry::EntryGroup;
use crate::format::{check_size, MAX_INPUT_BYTES};
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::debug;

/// Parse every JSON export inside the archive
///
/// Fails as a whole if any member is malformed; no groups from sibling
/// members are returned in that case. Decompressed bytes across all
/// members count against [`MAX_INPUT_BYTES`].
pub fn parse_archive(source_name: &str, bytes: &[u8]) -> Result<Vec<EntryGroup>> {
    parse_archive_within(source_name, bytes, MAX_INPUT_BYTES)
}

fn parse_archive_within(source_name: &str, bytes: &[u8], limit: u64) -> Result<Vec<EntryGroup>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::malformed(source_name, format!("invalid zip archive: {e}")))?;

    debug!(source = %source_name, members = archive.len(), "Opened archive");

    let members: Vec<(usize, String)> = (0..archive.len())
        .filter_map(|index| archive.name_for_index(index).map(|name| (index, name.to_string())))
        .filter(|(_, name)| is_journal_member(name))
        .collect();
    let names = journal_names(members.iter().map(|(_, name)| name.as_str()));

    let mut groups = Vec::new();
    let mut total: u64 = 0;
    for ((index, member_name), journal_name) in members.into_iter().zip(names) {
        let member = archive
            .by_index(index)
            .map_err(|e| Error::malformed(source_name, format!("unreadable archive member {index}: {e}")))?;
        if member.is_dir() {
            continue;
        }

        // Decompressed size is bounded separately from the upload size
        let remaining = limit.saturating_sub(total);
        let mut buf = Vec::new();
        member
            .take(remaining + 1)
            .read_to_end(&mut buf)
            .map_err(|e| Error::malformed(&member_name, format!("failed to decompress: {e}")))?;
        total += buf.len() as u64;
        check_size(total, limit)?;

        groups.push(dayone::parse_export(&member_name, Some(journal_name), &buf)?);
    }

    if groups.is_empty() {
        return Err(Error::malformed(source_name, "archive contains no JSON journal exports"));
    }

    Ok(groups)
}

/// Journal name per member: the file stem, or the extensionless path when
/// the stem is shared with another member
fn journal_names<'a>(members: impl Iterator<Item = &'a str> + Clone) -> Vec<String> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for name in members.clone() {
        *stem_counts.entry(file_stem(name)).or_default() += 1;
    }

    members
        .map(|name| {
            let stem = file_stem(name);
            if stem_counts.get(&stem).copied().unwrap_or(0) > 1 {
                name.rsplit_once('.').map_or(name, |(path, _)| path).to_string()
            } else {
                stem
            }
        })
        .collect()
}

/// JSON member that is not a macOS resource fork
fn is_journal_member(name: &str) -> bool {
    if name.starts_with("__MACOSX/") {
        return false;
    }
    let base = name.rsplit('/').next().unwrap_or(name);
    !base.starts_with("._") && base.to_ascii_lowercase().ends_with(".json")
}
