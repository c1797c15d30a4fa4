//! Turning fetched headlines into the time-ordered table that gets scored.
//!
//! Rows whose `publishedAt` does not parse are dropped. The remaining rows
//! are sorted ascending by timestamp; the sort is stable, so rows with equal
//! timestamps keep their fetch order.

use crate::models::{DatedHeadline, HeadlineRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use itertools::Itertools;
use tracing::debug;

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Layouts without a numeric offset; a trailing `Z` or nothing reads as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%dT%H:%M",
];

/// Parse a raw `publishedAt` value into a UTC timestamp.
///
/// Accepts RFC 3339 (`2024-01-05T14:30:00Z`, `2024-01-05T09:30:00-05:00`),
/// ISO 8601 basic offsets (`2024-01-05T14:30:00+0000`), a space separator,
/// minute precision (`2024-01-05T14:30Z`), offset-less date-times, and bare
/// dates (midnight UTC). Returns `None` for anything else, including the empty
/// string.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Drop rows without a parseable timestamp and sort the rest ascending.
pub fn build_dataset(records: Vec<HeadlineRecord>) -> Vec<DatedHeadline> {
    let fetched = records.len();
    let rows: Vec<DatedHeadline> = records
        .into_iter()
        .filter_map(|record| match parse_published_at(&record.published_at) {
            Some(published_at) => Some(DatedHeadline {
                headline: record.headline,
                published_at,
            }),
            None => {
                debug!(
                    headline = %record.headline,
                    published_at = %record.published_at,
                    "Dropping headline with unparseable timestamp"
                );
                None
            }
        })
        .sorted_by_key(|row| row.published_at)
        .collect();

    debug!(fetched, kept = rows.len(), "Built dataset");
    rows
}
