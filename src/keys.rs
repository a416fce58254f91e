// 🔑 Key Scheme - Partition keys on a flat key/value medium
//
//   {prefix}_{date}_{kind}     e.g. pilaris_control_2024-03-01_schedule
//
// The date is not escaped: it may contain '-' but never '_'.
// These literals are compatibility-critical for data already on disk.

use crate::error::{PilarisError, Result};
use chrono::NaiveDate;

pub const SEPARATOR: char = '_';

// ============================================================================
// RECORD KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Schedule,
    Expenses,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Schedule => "schedule",
            RecordKind::Expenses => "expenses",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "schedule" => Some(RecordKind::Schedule),
            "expenses" => Some(RecordKind::Expenses),
            _ => None,
        }
    }
}

/// ISO calendar date as used inside keys
pub fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| PilarisError::InvalidDate(value.to_string()))
}

pub fn record_key(prefix: &str, date: &str, kind: RecordKind) -> String {
    format!("{}{}{}{}{}", prefix, SEPARATOR, date, SEPARATOR, kind.as_str())
}

/// Literal text every key of `year` starts with. Textual match, not a
/// calendar range: year 24 selects "prefix_24-", not "prefix_0024-".
pub fn year_prefix(prefix: &str, year: i32) -> String {
    format!("{}{}{}-", prefix, SEPARATOR, year)
}

// ============================================================================
// PARSING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey<'a> {
    pub date: &'a str,
    pub kind: &'a str,
}

/// Split `key` on the separator and pick the date and kind segments, which
/// sit right after the prefix's own segments. Returns `None` when the key has
/// too few segments. Trailing extra segments are ignored.
pub fn parse_record_key<'a>(prefix: &str, key: &'a str) -> Option<RecordKey<'a>> {
    let prefix_segments = prefix.split(SEPARATOR).count();
    let parts: Vec<&str> = key.split(SEPARATOR).collect();

    if parts.len() < prefix_segments + 2 {
        return None;
    }

    Some(RecordKey {
        date: parts[prefix_segments],
        kind: parts[prefix_segments + 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "pilaris_control";

    #[test]
    fn test_record_key_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert_eq!(
            record_key(PREFIX, &date_label(date), RecordKind::Schedule),
            "pilaris_control_2024-03-01_schedule"
        );
        assert_eq!(
            record_key(PREFIX, "2024-03-01", RecordKind::Expenses),
            "pilaris_control_2024-03-01_expenses"
        );
    }

    #[test]
    fn test_parse_record_key() {
        let parsed = parse_record_key(PREFIX, "pilaris_control_2024-03-01_schedule").unwrap();
        assert_eq!(parsed.date, "2024-03-01");
        assert_eq!(parsed.kind, "schedule");

        // fewer than four segments
        assert_eq!(parse_record_key(PREFIX, "pilaris_control_2024-03-01"), None);
        assert_eq!(parse_record_key(PREFIX, "pilaris_control_settings"), None);
    }

    #[test]
    fn test_year_prefix_is_literal() {
        assert_eq!(year_prefix(PREFIX, 2024), "pilaris_control_2024-");
        assert!("pilaris_control_2024-01-01_schedule".starts_with(&year_prefix(PREFIX, 2024)));
        assert!(!"pilaris_control_2023-12-31_schedule".starts_with(&year_prefix(PREFIX, 2024)));
        assert!(!"pilaris_control_20245-01-01_schedule".starts_with(&year_prefix(PREFIX, 2024)));
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-03-01").unwrap();
        assert_eq!(date_label(date), "2024-03-01");
        assert!(matches!(parse_date("01/03/2024"), Err(PilarisError::InvalidDate(_))));
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_kind_literals() {
        assert_eq!(RecordKind::parse("schedule"), Some(RecordKind::Schedule));
        assert_eq!(RecordKind::parse("expenses"), Some(RecordKind::Expenses));
        assert_eq!(RecordKind::parse("Schedule"), None);
    }
}
