//! Timestamp utilities

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a journal timestamp
///
/// RFC 3339 with any offset is normalized to UTC; offset-less
/// `YYYY-MM-DDTHH:MM:SS[.fff]` values are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a timestamp losslessly: RFC 3339, `Z` suffix, only the
/// fractional digits that are needed
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Local `YYYYMMDD-HHMMSS` stamp used in generated file names
pub fn file_stamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_offsetless_as_utc() {
        let ts = parse_timestamp(" 2024-01-01T12:00:00 ").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_format_is_lossless() {
        let whole = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap();
        assert_eq!(format_timestamp(whole), "2024-06-30T23:59:59Z");

        let fractional = whole.with_nanosecond(123_456_789).unwrap();
        let formatted = format_timestamp(fractional);
        assert_eq!(formatted, "2024-06-30T23:59:59.123456789Z");
        assert_eq!(parse_timestamp(&formatted), Some(fractional));
    }

    #[test]
    fn test_file_stamp_shape() {
        let stamp = file_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "-");
    }
}
