//! # JournalLM Common Library
//!
//! Shared code for the JournalLM web service and command-line tool:
//! - Canonical entry model
//! - Format detection and per-format adapters (zip, Day One JSON, XML, text)
//! - Normalizer and the XML exchange format
//! - Report generation client
//! - Configuration loading

pub mod adapters;
pub mod config;
pub mod entry;
pub mod error;
pub mod exchange;
pub mod format;
pub mod generation;
pub mod normalizer;
pub mod pipeline;
pub mod time;

pub use adapters::RawInput;
pub use entry::{Entry, EntryGroup};
pub use error::{Error, Result};
pub use format::{InputFormat, MAX_INPUT_BYTES};
pub use normalizer::{NormalizedJournal, Normalizer};
