// Timestamp parsing for the formats vendors actually send.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Epoch values at or above this are milliseconds. 10^11 seconds is the
/// year 5138, so no real seconds value reaches it.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Parse epoch seconds, epoch milliseconds (numeric or string), RFC 3339,
/// naive ISO-8601 (assumed UTC), `YYYY-MM-DD HH:MM:SS`, a bare date, or
/// Twitter's `Wed Oct 10 20:19:24 +0000 2018`. Anything else is `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                from_epoch(i)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .and_then(|f| from_epoch(f as i64))
            }
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value <= 0 {
        return None;
    }
    if value >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(from_epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn epoch_seconds_and_millis_agree() {
        assert_eq!(parse_timestamp(&json!(1_709_294_400)), Some(expected()));
        assert_eq!(parse_timestamp(&json!(1_709_294_400_000i64)), Some(expected()));
        assert_eq!(parse_timestamp(&json!("1709294400")), Some(expected()));
    }

    #[test]
    fn iso_variants_parse() {
        assert_eq!(parse_timestamp(&json!("2024-03-01T12:00:00.000Z")), Some(expected()));
        assert_eq!(parse_timestamp(&json!("2024-03-01T14:00:00+02:00")), Some(expected()));
        assert_eq!(parse_timestamp(&json!("2024-03-01T12:00:00")), Some(expected()));
        assert_eq!(parse_timestamp(&json!("2024-03-01 12:00:00")), Some(expected()));
    }

    #[test]
    fn twitter_format_parses() {
        assert_eq!(
            parse_timestamp(&json!("Fri Mar 01 12:00:00 +0000 2024")),
            Some(expected())
        );
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        assert_eq!(
            parse_timestamp(&json!("2024-03-01")),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_timestamp(&json!("3 hours ago")), None);
        assert_eq!(parse_timestamp(&json!(0)), None);
        assert_eq!(parse_timestamp(&json!(-5)), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
        assert_eq!(parse_timestamp(&json!({ "ts": 1 })), None);
    }
}
