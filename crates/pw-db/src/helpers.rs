//! Row-to-entity parsing helpers.
//!
//! Datetimes are written with `to_rfc3339_opts(Micros, true)` so that TEXT
//! ordering matches chronological ordering; rows seeded by SQL use
//! `datetime('now')`. Both formats parse.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::DatabaseError;

/// Format a timestamp for storage.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00.000000Z"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a `YYYY-MM-DD` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` on a malformed date.
pub fn parse_day(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a non-negative INTEGER column.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` for negative or out-of-range values.
pub fn get_count<T: TryFrom<i64>>(row: &libsql::Row, idx: i32) -> Result<T, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    T::try_from(raw)
        .map_err(|_| DatabaseError::InvalidState(format!("column {idx} holds out-of-range count {raw}")))
}

/// Convert a count for binding as an INTEGER parameter.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` when the value exceeds `i64::MAX`.
pub fn to_sql_count(value: u64) -> Result<i64, DatabaseError> {
    i64::try_from(value).map_err(|_| DatabaseError::InvalidState(format!("count {value} overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use rstest::rstest;

    #[test]
    fn stored_datetimes_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 59).unwrap();
        let later = earlier + chrono::TimeDelta::microseconds(1);
        assert!(format_datetime(&earlier) < format_datetime(&later));
    }

    #[test]
    fn datetime_round_trips_with_micros() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap() + chrono::TimeDelta::microseconds(42);
        assert_eq!(parse_datetime(&format_datetime(&dt)).unwrap(), dt);
    }

    #[test]
    fn parses_sqlite_default_format() {
        let dt = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap());
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2026-03-09T25:00:00Z")]
    #[case("")]
    fn rejects_garbage_datetime(#[case] raw: &str) {
        assert!(parse_datetime(raw).is_err());
    }

    #[rstest]
    #[case("2026-13-01")]
    #[case("2026/03/09")]
    #[case("2026-03-09T00:00:00Z")]
    fn rejects_garbage_day(#[case] raw: &str) {
        assert!(parse_day(raw).is_err());
    }
}
