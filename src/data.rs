use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y"];

/// Parses a numeric analytics cell.
///
/// Plain numbers are accepted as-is. Durations written as `mm:ss` or
/// `h:mm:ss` are converted to seconds. Anything else is missing.
pub fn parse_metric(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(number) = value.parse::<f64>() {
        return number.is_finite().then_some(number);
    }
    parse_duration_seconds(value)
}

fn parse_duration_seconds(value: &str) -> Option<f64> {
    let parts = value.split(':').collect::<Vec<_>>();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let mut seconds = 0.0;
    for (idx, part) in parts.iter().enumerate() {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        let component = part.parse::<f64>().ok()?;
        // Minutes and seconds past the leading component must stay below 60.
        if idx > 0 && component >= 60.0 {
            return None;
        }
        seconds = seconds * 60.0 + component;
    }
    Some(seconds)
}

/// Parses a publish timestamp into wall-clock time.
///
/// Offsets are kept as local time of the given offset, so the hour matches
/// what the export shows. Date-only values land on midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn metric_accepts_numbers_and_durations() {
        assert_eq!(parse_metric(" 42 "), Some(42.0));
        assert_eq!(parse_metric("4.75"), Some(4.75));
        assert_eq!(parse_metric("3:25"), Some(205.0));
        assert_eq!(parse_metric("1:00:05"), Some(3605.0));
    }

    #[test]
    fn metric_rejects_text_and_non_finite_values() {
        assert_eq!(parse_metric(""), None);
        assert_eq!(parse_metric("n/a"), None);
        assert_eq!(parse_metric("NaN"), None);
        assert_eq!(parse_metric("inf"), None);
        assert_eq!(parse_metric("1:75"), None);
        assert_eq!(parse_metric("1:2:3:4"), None);
        assert_eq!(parse_metric("-1:30"), None);
    }

    #[test]
    fn timestamp_formats_resolve_hour() {
        let cases = [
            ("2024-03-01 14:30:00", 14),
            ("2024-03-01T09:05:00", 9),
            ("2024-03-01T21:00:00+05:30", 21),
            ("03/01/2024 18:45", 18),
            ("2024-03-01", 0),
            ("Mar 1, 2024", 0),
        ];
        for (raw, hour) in cases {
            let parsed = parse_timestamp(raw).unwrap_or_else(|| panic!("parse {raw}"));
            assert_eq!(parsed.hour(), hour, "{raw}");
        }
    }

    #[test]
    fn timestamp_garbage_is_missing() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
        assert!(parse_timestamp("   ").is_none());
    }
}
