//! Supported input formats
//!
//! Format dispatch is a closed enum: every variant maps to exactly one
//! adapter in [`crate::adapters::adapt`], so adding a format without an
//! adapter fails to compile.

use crate::{Error, Result};
use std::fmt;
use std::path::Path;

/// Maximum accepted input size (100 MiB), enforced before any parsing
pub const MAX_INPUT_BYTES: u64 = 100 * 1024 * 1024;

/// File extensions accepted by the pipeline, lowercase, without the dot
pub const ACCEPTED_EXTENSIONS: &[&str] = &["zip", "json", "xml", "txt", "md", "markdown"];

/// Journal input format, inferred from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// `.zip` archive holding one JSON export per journal
    Archive,
    /// `.json` single Day One style export
    StructuredExport,
    /// `.xml` canonical exchange format produced by the normalizer
    Exchange,
    /// `.txt` / `.md` freeform document, one entry
    Freeform,
}

impl InputFormat {
    /// Map a bare extension (no dot, any case) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "zip" => Some(InputFormat::Archive),
            "json" => Some(InputFormat::StructuredExport),
            "xml" => Some(InputFormat::Exchange),
            "txt" | "md" | "markdown" => Some(InputFormat::Freeform),
            _ => None,
        }
    }

    /// Infer the format of a file name or path
    ///
    /// # Errors
    /// `UnsupportedFormat` when the extension is missing or not accepted
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!(
                    "{} (accepted: {})",
                    path.display(),
                    accepted_extensions_list()
                ))
            })
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Archive => "archive",
            InputFormat::StructuredExport => "structured export",
            InputFormat::Exchange => "exchange",
            InputFormat::Freeform => "freeform",
        };
        f.write_str(name)
    }
}

/// Accepted extensions as a human-readable list (".zip, .json, ...")
pub fn accepted_extensions_list() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reject inputs above `limit` bytes
pub fn check_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(Error::TooLarge { size, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(InputFormat::from_path("backup.zip").unwrap(), InputFormat::Archive);
        assert_eq!(InputFormat::from_path("Journal.JSON").unwrap(), InputFormat::StructuredExport);
        assert_eq!(InputFormat::from_path("journal-2024.xml").unwrap(), InputFormat::Exchange);
        assert_eq!(InputFormat::from_path("notes.md").unwrap(), InputFormat::Freeform);
        assert_eq!(InputFormat::from_path("notes.txt").unwrap(), InputFormat::Freeform);
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["report.pdf", "no_extension", "archive.tar.gz"] {
            let err = InputFormat::from_path(name).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat(_)), "{name} should be rejected");
        }
    }

    #[test]
    fn test_every_accepted_extension_maps() {
        for ext in ACCEPTED_EXTENSIONS {
            assert!(InputFormat::from_extension(ext).is_some(), ".{ext} has no format");
        }
    }

    #[test]
    fn test_check_size_boundary() {
        assert!(check_size(MAX_INPUT_BYTES, MAX_INPUT_BYTES).is_ok());
        let err = check_size(MAX_INPUT_BYTES + 1, MAX_INPUT_BYTES).unwrap_err();
        assert!(matches!(err, Error::TooLarge { .. }));
    }
}
