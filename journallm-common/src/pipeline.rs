//! End-to-end pipeline: raw inputs → normalized journal → report
//!
//! Shared by the web worker and the CLI. Any adapter error aborts the whole
//! run; a report is never produced from partially parsed input.

use crate::adapters::{self, RawInput};
use crate::generation::ReportGenerator;
use crate::normalizer::{NormalizedJournal, Normalizer};
use crate::Result;
use tracing::info;

/// Adapt every input and merge the results
pub fn extract_journal(inputs: &[RawInput], limit: u64) -> Result<NormalizedJournal> {
    let mut groups = Vec::new();
    for input in inputs {
        groups.extend(adapters::load(input, limit)?);
    }

    let journal = Normalizer::merge(groups);
    match journal.date_range() {
        Some((first, last)) => info!(
            entries = journal.len(),
            multi_journal = journal.is_multi_journal(),
            first = %first,
            last = %last,
            "Journal normalized"
        ),
        None => info!("Journal normalized (no entries)"),
    }
    Ok(journal)
}

/// Serialize the journal and ask the generator for a report
pub async fn generate_report(generator: &dyn ReportGenerator, journal: &NormalizedJournal) -> Result<String> {
    let xml = journal.to_xml();
    info!(xml_bytes = xml.len(), "Requesting report");
    generator.generate(&xml).await
}
