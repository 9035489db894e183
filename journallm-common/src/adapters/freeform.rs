//! Plain text / markdown adapter: the whole document is one entry

use super::RawInput;
use crate::entry::{Entry, EntryGroup};
use crate::{Error, Result};
use chrono::Utc;

/// Wrap the document in a single entry
///
/// `created` is the file's modification time, or now when unknown. Freeform
/// input carries no location and no journal name.
pub fn parse_document(input: &RawInput) -> Result<EntryGroup> {
    let text = std::str::from_utf8(&input.bytes)
        .map_err(|e| Error::malformed(&input.name, format!("not valid UTF-8 text: {e}")))?;

    let created = input.modified.unwrap_or_else(Utc::now);
    Ok(EntryGroup::new(None, vec![Entry::new(created, text)]))
}
