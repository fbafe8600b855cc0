//! Shared value conversion utilities.
//!
//! Timestamp parsing used by type inference, and coercion of cell values to the
//! relational type of the column they are inserted into.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::dataset::CellValue;
use crate::types::RelationalType;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Parses a date or date-time string permissively.
///
/// Supports RFC 3339 and RFC 2822 (converted to UTC), ISO-like date-times with
/// a space or `T` separator and optional fractional seconds, slash and dot
/// separated dates, and dates with month names. Date-only inputs yield
/// midnight. Bare numbers are never accepted.
///
/// # Example
/// ```ignore
/// assert!(parse_timestamp("2023-01-05").is_some());
/// assert!(parse_timestamp("N/A").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() || !s.bytes().any(|b| !b.is_ascii_digit()) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parses a boolean literal (`true`/`false`, `yes`/`no`, `t`/`f`, `1`/`0`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Coerces a cell value into the representation bound for a column of type `target`.
///
/// Text columns accept anything via the value's textual form. Numeric,
/// boolean and timestamp columns accept compatible values and parseable text.
///
/// # Returns
/// * `Ok(CellValue)` - The value to bind
/// * `Err(String)` - Why the value cannot be stored in the column
pub fn coerce_value(value: &CellValue, target: &RelationalType) -> Result<CellValue, String> {
    if value.is_null() {
        return Ok(CellValue::Null);
    }

    let coerced = match (target, value) {
        (RelationalType::Varchar { .. } | RelationalType::Text, CellValue::Text(s)) => {
            Some(CellValue::Text(s.clone()))
        }
        (RelationalType::Varchar { .. } | RelationalType::Text, other) => {
            Some(CellValue::Text(other.to_string()))
        }

        (RelationalType::BigInt, CellValue::Int(v)) => Some(CellValue::Int(*v)),
        (RelationalType::BigInt, CellValue::Float(v))
            if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
        {
            Some(CellValue::Int(*v as i64))
        }
        (RelationalType::BigInt, CellValue::Bool(v)) => Some(CellValue::Int(i64::from(*v))),
        (RelationalType::BigInt, CellValue::Text(s)) => s.trim().parse().ok().map(CellValue::Int),

        (RelationalType::Double, CellValue::Int(v)) => Some(CellValue::Float(*v as f64)),
        (RelationalType::Double, CellValue::Float(v)) => Some(CellValue::Float(*v)),
        (RelationalType::Double, CellValue::Text(s)) => {
            s.trim().parse().ok().map(CellValue::Float)
        }

        (RelationalType::Boolean, CellValue::Bool(v)) => Some(CellValue::Bool(*v)),
        (RelationalType::Boolean, CellValue::Int(0)) => Some(CellValue::Bool(false)),
        (RelationalType::Boolean, CellValue::Int(1)) => Some(CellValue::Bool(true)),
        (RelationalType::Boolean, CellValue::Text(s)) => parse_bool(s).map(CellValue::Bool),

        (RelationalType::Timestamp, CellValue::Timestamp(ts)) => Some(CellValue::Timestamp(*ts)),
        (RelationalType::Timestamp, CellValue::Text(s)) => {
            parse_timestamp(s).map(CellValue::Timestamp)
        }

        _ => None,
    };

    coerced.ok_or_else(|| format!("Value '{value}' cannot be stored in a {target} column"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_timestamp("2023-01-05"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_timestamp(" 2023-02-10 "), Some(ymd(2023, 2, 10)));
    }

    #[test]
    fn test_parse_iso_datetime() {
        let ts = parse_timestamp("2024-01-15 10:30:00").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 30);

        let ts = parse_timestamp("2024-01-15T10:30:00.123456").unwrap();
        assert_eq!(ts.nanosecond(), 123_456_000);

        assert!(parse_timestamp("2024-01-15 10:30").is_some());
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        let ts = parse_timestamp("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_parse_other_date_layouts() {
        assert_eq!(parse_timestamp("2023/03/04"), Some(ymd(2023, 3, 4)));
        assert_eq!(parse_timestamp("03/04/2023"), Some(ymd(2023, 3, 4)));
        assert_eq!(parse_timestamp("04.03.2023"), Some(ymd(2023, 3, 4)));
        assert_eq!(parse_timestamp("Jan 5 2023"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_timestamp("January 5, 2023"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_timestamp("5 January 2023"), Some(ymd(2023, 1, 5)));
    }

    #[test]
    fn test_parse_rejects_non_dates() {
        assert!(parse_timestamp("N/A").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("hello").is_none());
        assert!(parse_timestamp("12345").is_none());
        assert!(parse_timestamp("20230105").is_none());
        assert!(parse_timestamp("2023-13-01").is_none());
        assert!(parse_timestamp("1.5").is_none());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_coerce_null_passes_through() {
        for ty in [
            RelationalType::BigInt,
            RelationalType::Double,
            RelationalType::Timestamp,
            RelationalType::Text,
        ] {
            assert_eq!(coerce_value(&CellValue::Null, &ty), Ok(CellValue::Null));
        }
    }

    #[test]
    fn test_coerce_to_text() {
        let ty = RelationalType::Varchar { size: 10 };
        assert_eq!(
            coerce_value(&CellValue::Int(7), &ty),
            Ok(CellValue::Text("7".into()))
        );
        assert_eq!(
            coerce_value(&CellValue::Float(1.5), &RelationalType::Text),
            Ok(CellValue::Text("1.5".into()))
        );
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(
            coerce_value(&CellValue::Int(3), &RelationalType::Double),
            Ok(CellValue::Float(3.0))
        );
        assert_eq!(
            coerce_value(&CellValue::Float(4.0), &RelationalType::BigInt),
            Ok(CellValue::Int(4))
        );
        assert!(coerce_value(&CellValue::Float(4.5), &RelationalType::BigInt).is_err());
        assert_eq!(
            coerce_value(&CellValue::Text(" 12 ".into()), &RelationalType::BigInt),
            Ok(CellValue::Int(12))
        );
    }

    #[test]
    fn test_coerce_timestamp_from_text() {
        assert_eq!(
            coerce_value(&CellValue::Text("2023-01-05".into()), &RelationalType::Timestamp),
            Ok(CellValue::Timestamp(ymd(2023, 1, 5)))
        );

        let err = coerce_value(&CellValue::Text("N/A".into()), &RelationalType::Timestamp)
            .unwrap_err();
        assert!(err.contains("N/A"));
        assert!(err.contains("TIMESTAMP"));
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(
            coerce_value(&CellValue::Int(1), &RelationalType::Boolean),
            Ok(CellValue::Bool(true))
        );
        assert!(coerce_value(&CellValue::Int(2), &RelationalType::Boolean).is_err());
    }
}
