//! Report generation
//!
//! The text-generation service is reached through the [`ReportGenerator`]
//! trait so the web worker and the CLI can be exercised with a stub.
//! [`AnthropicClient`] is the production implementation.

pub mod anthropic;
pub mod prompt;

pub use anthropic::{AnthropicClient, GenerationSettings};

use crate::Result;

/// Turns a serialized journal into a markdown report
#[async_trait::async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Generate the report for `journal_xml` (canonical exchange format)
    ///
    /// # Errors
    /// `GenerationServiceFailure` when the service rejects the request,
    /// is unreachable, or returns no text
    async fn generate(&self, journal_xml: &str) -> Result<String>;
}
