//! Shared parsing utilities for raw event-store records.
//!
//! The event store performs no schema enforcement, so coordinates and
//! timestamps may arrive as JSON numbers, numeric strings or ISO 8601 text.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Parses an ISO 8601 datetime, with or without an offset and fractional
/// seconds. Naive values are taken as UTC.
#[must_use]
pub fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// Parses a coordinate from a JSON number or numeric string. Returns `None`
/// if missing, unparseable or not finite.
#[must_use]
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Parses an epoch-millisecond timestamp from a JSON number, a numeric
/// string, or an ISO 8601 datetime string.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_epoch_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let ms = n.as_f64()?;
            (ms.is_finite() && ms.abs() < 9.0e15).then_some(ms as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| parse_iso_datetime(trimmed).map(|dt| dt.timestamp_millis()))
        }
        _ => None,
    }
}

/// Returns the first non-empty string value among `keys`.
#[must_use]
pub fn first_str<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| record.get(*key)?.as_str())
        .find(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_iso_with_offset() {
        let dt = parse_iso_datetime("2024-01-15T21:30:00+07:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00 UTC");
    }

    #[test]
    fn parses_naive_iso_with_fractional() {
        let dt = parse_iso_datetime("2024-01-15T14:30:00.000").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00 UTC");
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_iso_datetime("not-a-date").is_none());
    }

    #[test]
    fn parses_coordinate_number_and_string() {
        let lat = parse_coordinate(&json!(-7.7956)).unwrap();
        assert!((lat - -7.7956).abs() < f64::EPSILON);
        let lng = parse_coordinate(&json!(" 110.3695 ")).unwrap();
        assert!((lng - 110.3695).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_numeric_coordinate() {
        assert!(parse_coordinate(&json!("north")).is_none());
        assert!(parse_coordinate(&json!(null)).is_none());
        assert!(parse_coordinate(&json!([1.0, 2.0])).is_none());
    }

    #[test]
    fn parses_epoch_ms_variants() {
        assert_eq!(parse_epoch_ms(&json!(1_705_312_200_000_i64)), Some(1_705_312_200_000));
        assert_eq!(parse_epoch_ms(&json!(1_705_312_200_000.0_f64)), Some(1_705_312_200_000));
        assert_eq!(parse_epoch_ms(&json!("1705312200000")), Some(1_705_312_200_000));
        assert_eq!(
            parse_epoch_ms(&json!("2024-01-15T09:50:00Z")),
            Some(1_705_312_200_000)
        );
        assert_eq!(parse_epoch_ms(&json!(true)), None);
    }

    #[test]
    fn first_str_skips_blank_values() {
        let record = json!({"intensity": "  ", "category": "Badai"});
        assert_eq!(
            first_str(&record, &["intensity", "category"]),
            Some("Badai")
        );
    }
}
