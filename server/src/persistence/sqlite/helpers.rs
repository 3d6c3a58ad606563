//! Shared encode/decode helpers for SQLite ↔ domain type conversions.
//!
//! Sort keys map onto fixed SQL expressions here, so no caller-supplied text
//! ever reaches a query string.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use portal::models::empty_parts;
use portal::{GroupSortKey, GroupWordSortKey, SortOrder};
use serde_json::Value;

use crate::persistence::PersistenceError;

// ── Sorting ────────────────────────────────────────────────────────────

/// `ORDER BY` expression for a group listing.
pub fn group_sort_column(key: GroupSortKey) -> &'static str {
    match key {
        GroupSortKey::Name => "g.name",
        GroupSortKey::WordsCount => "g.words_count",
    }
}

/// `ORDER BY` expression for the words of a group.
pub fn group_word_sort_column(key: GroupWordSortKey) -> &'static str {
    match key {
        GroupWordSortKey::Kanji => "w.kanji",
        GroupWordSortKey::Romaji => "w.romaji",
        GroupWordSortKey::English => "w.english",
        GroupWordSortKey::CorrectCount => "correct_count",
        GroupWordSortKey::WrongCount => "wrong_count",
    }
}

pub fn order_keyword(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

// ── Word parts ─────────────────────────────────────────────────────────

/// Encode a `parts` blob for the `words.parts` TEXT column.
pub fn encode_parts(parts: &Value) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(parts)?)
}

/// Decode the `words.parts` column. NULL or blank decodes to `{}`.
pub fn decode_parts(raw: Option<&str>) -> Result<Value, PersistenceError> {
    match raw {
        None => Ok(empty_parts()),
        Some(s) if s.trim().is_empty() => Ok(empty_parts()),
        Some(s) => Ok(serde_json::from_str(s)?),
    }
}

/// `COUNT(*)` results are never negative; clamp anyway for the `u64` totals.
pub fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

// ── Timestamps ─────────────────────────────────────────────────────────

/// Encode a timestamp as fixed-width RFC 3339 text in UTC.
///
/// Fixed width keeps lexical order equal to chronological order, which the
/// `ORDER BY created_at` clauses rely on.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Drop sub-microsecond precision so a value equals what a read returns.
pub fn normalize_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    let micros = ts.nanosecond() / 1_000;
    ts.with_nanosecond(micros * 1_000).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn parts_roundtrip() {
        let parts = json!([{"kanji": "食", "romaji": ["ta"]}]);
        let encoded = encode_parts(&parts).unwrap();
        assert_eq!(decode_parts(Some(&encoded)).unwrap(), parts);
    }

    #[test]
    fn missing_parts_decode_to_empty_object() {
        assert_eq!(decode_parts(None).unwrap(), json!({}));
        assert_eq!(decode_parts(Some("")).unwrap(), json!({}));
    }

    #[test]
    fn corrupt_parts_are_an_error() {
        assert!(matches!(
            decode_parts(Some("{oops")),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let later = earlier + chrono::Duration::milliseconds(500);
        let a = encode_timestamp(&earlier);
        let b = encode_timestamp(&later);
        assert_eq!(a, "2025-03-01T09:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn normalize_truncates_to_micros() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_234_567);
        let normalized = normalize_timestamp(ts);
        assert_eq!(normalized.nanosecond(), 1_234_000);
        assert_eq!(encode_timestamp(&normalized), encode_timestamp(&ts));
    }

    #[test]
    fn every_sort_key_has_a_column() {
        assert_eq!(group_sort_column(GroupSortKey::default()), "g.name");
        assert_eq!(group_word_sort_column(GroupWordSortKey::default()), "w.kanji");
        assert_eq!(order_keyword(SortOrder::default()), "ASC");
        assert_eq!(order_keyword(SortOrder::Desc), "DESC");
    }
}
