//! Integration tests for the adapter → normalizer pipeline
//!
//! Tests cover:
//! - Archive sub-journals tagged by member name, merged and sorted
//! - Malformed member aborts the whole archive
//! - Output sorted by `created` for every input format
//! - `journal_name` present iff two or more distinct journals
//! - Serialize → re-parse through the exchange adapter round-trips

use chrono::{DateTime, TimeZone, Utc};
use journallm_common::adapters::{self, RawInput};
use journallm_common::pipeline::extract_journal;
use journallm_common::{Entry, Error, InputFormat, Normalizer, MAX_INPUT_BYTES};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

// =============================================================================
// Fixtures
// =============================================================================

fn export(entries: &[(&str, &str)]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|(created, text)| format!(r#"{{"creationDate":"{created}","text":"{text}"}}"#))
        .collect();
    format!(r#"{{"metadata":{{"version":"1.0"}},"entries":[{}]}}"#, items.join(","))
}

fn zip_of(members: &[(&str, String)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in members {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn assert_sorted(entries: &[Entry]) {
    for pair in entries.windows(2) {
        assert!(pair[0].created() <= pair[1].created(), "entries out of order");
    }
}

// =============================================================================
// Archive behavior
// =============================================================================

#[test]
fn test_archive_alpha_beta_merged_and_tagged() {
    let bytes = zip_of(&[
        (
            "alpha.json",
            export(&[("2024-03-03T10:00:00Z", "alpha late"), ("2024-03-01T10:00:00Z", "alpha early")]),
        ),
        ("beta.json", export(&[("2024-03-02T10:00:00Z", "beta middle")])),
    ]);

    let journal = extract_journal(&[RawInput::new("backup.zip", bytes)], MAX_INPUT_BYTES).unwrap();

    let seen: Vec<(&str, Option<&str>)> = journal
        .entries()
        .iter()
        .map(|e| (e.text(), e.journal_name()))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("alpha early", Some("alpha")),
            ("beta middle", Some("beta")),
            ("alpha late", Some("alpha")),
        ]
    );

    let xml = journal.to_xml();
    assert!(xml.contains("<journal_name>alpha</journal_name>"));
    assert!(xml.contains("<journal_name>beta</journal_name>"));
}

#[test]
fn test_malformed_member_aborts_archive() {
    let bytes = zip_of(&[
        ("alpha.json", export(&[("2024-03-01T10:00:00Z", "fine")])),
        ("beta.json", "{\"entries\": [ {\"creationDate\": ".to_string()),
    ]);

    let err = adapters::load(&RawInput::new("backup.zip", bytes), MAX_INPUT_BYTES).unwrap_err();
    match err {
        Error::MalformedInput { source_name, .. } => assert_eq!(source_name, "beta.json"),
        other => panic!("expected MalformedInput, got {other:?}"),
    }
}

#[test]
fn test_single_journal_archive_omits_names() {
    let bytes = zip_of(&[("Journal.json", export(&[("2024-03-01T10:00:00Z", "only")]))]);
    let journal = extract_journal(&[RawInput::new("backup.zip", bytes)], MAX_INPUT_BYTES).unwrap();
    assert!(!journal.is_multi_journal());
    assert!(!journal.to_xml().contains("journal_name"));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_every_format_yields_sorted_output() {
    let json = export(&[
        ("2024-05-03T00:00:00Z", "c"),
        ("2024-05-01T00:00:00Z", "a"),
        ("2024-05-02T00:00:00Z", "b"),
    ]);
    let xml = Normalizer::merge(adapters::load(&RawInput::new("j.json", json.clone().into_bytes()), MAX_INPUT_BYTES).unwrap())
        .to_xml();
    // Write the XML out of order to prove the exchange path sorts as well
    let shuffled = xml.replacen("2024-05-01T00:00:00Z", "2024-05-09T00:00:00Z", 1);

    let inputs = [
        RawInput::new("j.json", json.into_bytes()),
        RawInput::new("j.zip", zip_of(&[("j.json", export(&[("2024-05-02T00:00:00Z", "z")]))])),
        RawInput::new("j.xml", shuffled.into_bytes()),
        RawInput::new("j.md", b"# note".to_vec()).with_modified(Some(utc("2024-05-01T12:00:00Z"))),
    ];

    for input in &inputs {
        let journal = extract_journal(std::slice::from_ref(input), MAX_INPUT_BYTES).unwrap();
        assert_sorted(journal.entries());
    }
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_round_trip_through_exchange_adapter() {
    let bytes = zip_of(&[
        (
            "alpha.json",
            r#"{"entries":[
                {"creationDate":"2024-01-01T08:00:00Z","modifiedDate":"2024-01-01T09:30:00.5Z",
                 "location":{"address":"Rua Augusta 1"},"text":"Line one\nLine <two> & three"},
                {"creationDate":"2024-01-01T08:00:00Z","text":"tie"}
            ]}"#
            .to_string(),
        ),
        ("beta.json", export(&[("2024-01-01T08:00:00Z", "tie from beta"), ("2023-12-31T23:59:59Z", "")])),
    ]);

    let journal = extract_journal(&[RawInput::new("backup.zip", bytes)], MAX_INPUT_BYTES).unwrap();
    let xml = journal.to_xml();

    let reparsed = extract_journal(&[RawInput::new("journal.xml", xml.into_bytes())], MAX_INPUT_BYTES).unwrap();
    assert_eq!(reparsed.entries(), journal.entries());

    let ties: Vec<&str> = reparsed
        .entries()
        .iter()
        .filter(|e| e.created() == Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        .map(Entry::text)
        .collect();
    assert_eq!(ties, vec!["Line one\nLine <two> & three", "tie", "tie from beta"]);
}

// =============================================================================
// Rejection before parsing
// =============================================================================

#[test]
fn test_unsupported_and_oversize_rejected() {
    let pdf = RawInput::new("journal.pdf", b"%PDF".to_vec());
    assert!(matches!(extract_journal(&[pdf], MAX_INPUT_BYTES), Err(Error::UnsupportedFormat(_))));

    let big = RawInput::new("journal.json", vec![b' '; 33]);
    assert!(matches!(extract_journal(&[big], 32), Err(Error::TooLarge { .. })));

    assert_eq!(InputFormat::from_path("x.zip").unwrap(), InputFormat::Archive);
}
