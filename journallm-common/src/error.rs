//! Common error types for JournalLM

use thiserror::Error;

/// Common result type for JournalLM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the adapters, the normalizer, the generation
/// client and both front ends
#[derive(Error, Debug)]
pub enum Error {
    /// Input extension is not one of the accepted formats
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Structured content could not be parsed; `source_name` names the
    /// offending file or archive member
    #[error("Malformed input in {source_name}: {reason}")]
    MalformedInput { source_name: String, reason: String },

    /// Input exceeds the configured maximum size
    #[error("Input too large: {size} bytes exceeds the limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// No API key configured and none supplied by the caller
    #[error("Missing credential: an API key is required")]
    MissingCredential,

    /// The text-generation service rejected or failed the request
    #[error("Generation service failure: {0}")]
    GenerationServiceFailure(String),

    /// Client-to-server communication failed (upload or status polling)
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn malformed(source_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::MalformedInput {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
