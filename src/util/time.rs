//! Time and date handling.
//!
//! Timestamps are stored and served in RFC3339 with millisecond precision
//! (`YYYY-MM-DDTHH:MM:SS.sssZ`). Storing the same string the API serves
//! keeps exact-match date filters a plain string comparison.

use crate::error::{Result, TrackerError};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a timestamp the way the API serves it.
#[must_use]
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp read back from the database.
///
/// Lenient: the database only ever holds strings written by
/// [`format_timestamp`], so a parse failure means external tampering and
/// falls back to the epoch rather than failing the whole row.
#[must_use]
pub fn parse_db_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc))
}

/// Parse a caller-supplied filter date.
///
/// Accepts RFC3339 (`2026-01-15T12:00:00.000Z`) or a simple date
/// (`2026-01-15`, meaning midnight UTC).
///
/// # Errors
///
/// Returns a validation error naming the field when the value parses as
/// neither format.
pub fn parse_filter_date(s: &str, field_name: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        return Ok(Utc.from_utc_datetime(&naive));
    }

    Err(TrackerError::validation(format!(
        "invalid date for {field_name}: {s}"
    )))
}
