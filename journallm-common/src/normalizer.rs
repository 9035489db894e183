//! Entry normalizer
//!
//! Merges the groups produced by one or more adapters into a single
//! [`NormalizedJournal`]:
//!
//! 1. Concatenate all entries in group order (nothing is dropped or merged).
//! 2. Tag untagged entries with their group's journal name.
//! 3. Stable-sort ascending by `created`; equal timestamps keep input order.
//! 4. Keep `journal_name` only if the merged set spans two or more distinct
//!    journals; otherwise clear it on every entry.
//!
//! Step 4 is decided over the whole merged set, not per group, so a single
//! named journal serializes without names and re-parses to an equal value.

use crate::entry::{Entry, EntryGroup};
use crate::{exchange, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::debug;

/// Ordered, merged journal ready for serialization
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedJournal {
    entries: Vec<Entry>,
    journal_names: BTreeSet<String>,
}

impl NormalizedJournal {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct journal names, empty unless the journal is multi-journal
    pub fn journal_names(&self) -> impl Iterator<Item = &str> {
        self.journal_names.iter().map(String::as_str)
    }

    pub fn is_multi_journal(&self) -> bool {
        self.journal_names.len() > 1
    }

    /// First and last `created` timestamps
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.entries.first()?.created(), self.entries.last()?.created()))
    }

    /// Serialize to the canonical exchange format
    pub fn to_xml(&self) -> String {
        exchange::write(&self.entries, self.is_multi_journal())
    }
}

/// Merge rule and serialization entry points
pub struct Normalizer;

impl Normalizer {
    /// Merge entry groups into one ordered journal
    pub fn merge(groups: impl IntoIterator<Item = EntryGroup>) -> NormalizedJournal {
        let mut entries = Vec::new();
        for group in groups {
            let EntryGroup { name, entries: group_entries } = group;
            entries.extend(group_entries.into_iter().map(|entry| {
                if entry.journal_name().is_none() && name.is_some() {
                    entry.with_journal_name(name.clone())
                } else {
                    entry
                }
            }));
        }

        // `sort_by_key` is stable
        entries.sort_by_key(Entry::created);

        let journal_names: BTreeSet<String> = entries
            .iter()
            .filter_map(|e| e.journal_name().map(str::to_string))
            .collect();

        let (entries, journal_names) = if journal_names.len() > 1 {
            (entries, journal_names)
        } else {
            let cleared = entries.into_iter().map(|e| e.with_journal_name(None)).collect();
            (cleared, BTreeSet::new())
        };

        debug!(
            entries = entries.len(),
            journals = journal_names.len(),
            "Merged journal entries"
        );

        NormalizedJournal {
            entries,
            journal_names,
        }
    }

    /// Re-read a serialized journal (the pre-normalized input path)
    pub fn parse_xml(source_name: &str, xml: &str) -> Result<NormalizedJournal> {
        let entries = exchange::parse(source_name, xml)?;
        Ok(Self::merge([EntryGroup::new(None, entries)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, hour, 0, 0).unwrap()
    }

    fn group(name: Option<&str>, items: &[(u32, &str)]) -> EntryGroup {
        let name = name.map(str::to_string);
        let entries = items
            .iter()
            .map(|(hour, text)| Entry::new(at(*hour), *text).with_journal_name(name.clone()))
            .collect();
        EntryGroup::new(name, entries)
    }

    #[test]
    fn test_sorted_across_groups() {
        let journal = Normalizer::merge([
            group(Some("alpha"), &[(9, "a9"), (3, "a3")]),
            group(Some("beta"), &[(5, "b5"), (1, "b1")]),
        ]);

        let texts: Vec<_> = journal.entries().iter().map(Entry::text).collect();
        assert_eq!(texts, vec!["b1", "a3", "b5", "a9"]);
        assert!(journal.is_multi_journal());
        assert_eq!(journal.journal_names().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        assert_eq!(journal.entries()[0].journal_name(), Some("beta"));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let journal = Normalizer::merge([
            group(None, &[(7, "first"), (7, "second")]),
            group(None, &[(7, "third")]),
        ]);
        let texts: Vec<_> = journal.entries().iter().map(Entry::text).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_single_journal_drops_names() {
        let journal = Normalizer::merge([group(Some("Journal"), &[(1, "x"), (2, "y")])]);
        assert!(!journal.is_multi_journal());
        assert!(journal.entries().iter().all(|e| e.journal_name().is_none()));
        assert!(!journal.to_xml().contains("journal_name"));
    }

    #[test]
    fn test_two_groups_same_name_is_single_journal() {
        let journal = Normalizer::merge([
            group(Some("Journal"), &[(1, "x")]),
            group(Some("Journal"), &[(2, "y")]),
        ]);
        assert!(!journal.is_multi_journal());
    }

    #[test]
    fn test_identical_entries_are_not_deduplicated() {
        let journal = Normalizer::merge([group(None, &[(4, "same")]), group(None, &[(4, "same")])]);
        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn test_date_range() {
        assert!(NormalizedJournal::default().date_range().is_none());
        let journal = Normalizer::merge([group(None, &[(8, "b"), (2, "a")])]);
        assert_eq!(journal.date_range(), Some((at(2), at(8))));
    }

    #[test]
    fn test_round_trip_multi_journal() {
        let journal = Normalizer::merge([
            group(Some("alpha"), &[(2, "a & b"), (6, "<tag>")]),
            group(Some("beta"), &[(2, "tie after alpha"), (4, "")]),
        ]);
        let reparsed = Normalizer::parse_xml("journal.xml", &journal.to_xml()).unwrap();
        assert_eq!(reparsed, journal);
    }

    #[test]
    fn test_round_trip_single_journal() {
        let entries = vec![
            Entry::new(at(3), "one")
                .with_modified(Some(at(4)))
                .with_location(Some("Kyoto".into())),
            Entry::new(at(1), "zero"),
        ];
        let journal = Normalizer::merge([EntryGroup::new(Some("Diary".into()), entries)]);
        let reparsed = Normalizer::parse_xml("journal.xml", &journal.to_xml()).unwrap();
        assert_eq!(reparsed, journal);
    }
}
