//! Date, datetime, time-of-day and duration parsers. Formats are tried in
//! order; the first that matches wins.

use crate::descriptor::TypeDesc;
use crate::{Capability, Registry, Rejection, Value, ValueMap};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::time::Duration;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d", "%d %B %Y", "%B %d, %Y"];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn date_only(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(Utc.from_utc_datetime(&naive));
    }
    date_only(text)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_date(raw: &str) -> Result<Value, Rejection> {
    let text = raw.trim();
    date_only(text)
        .or_else(|| datetime(text).map(|dt| dt.date_naive()))
        .map(Value::Date)
        .ok_or_else(|| Rejection::new("expected a date such as 2024-01-15"))
}

fn parse_datetime(raw: &str) -> Result<Value, Rejection> {
    datetime(raw.trim())
        .map(Value::DateTime)
        .ok_or_else(|| Rejection::new("expected a datetime such as 2024-01-15T10:30:00Z"))
}

fn parse_time(raw: &str) -> Result<Value, Rejection> {
    let text = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .map(Value::Time)
        .ok_or_else(|| Rejection::new("expected a time such as 12:34:56"))
}

/// `HH:MM:SS` with optional fractional seconds.
fn clock_seconds(text: &str) -> Result<f64, Rejection> {
    let invalid = || Rejection::new("expected HH:MM:SS");
    let parts: Vec<&str> = text.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };
    let hours = hours.parse::<u32>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
    let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return Err(Rejection::new("minutes and seconds must be below 60"));
    }
    Ok(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

/// A number of seconds or `HH:MM:SS`, read as `{secs, nanos}`.
fn parse_duration(raw: &str) -> Result<Value, Rejection> {
    let text = raw.trim();
    let seconds = if text.contains(':') {
        clock_seconds(text)?
    } else {
        text.parse::<f64>()
            .map_err(|_| Rejection::new("expected seconds such as 90.5 or HH:MM:SS"))?
    };
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(Rejection::new("duration must be a finite, non-negative number of seconds"));
    }
    let duration = Duration::try_from_secs_f64(seconds).map_err(Rejection::new)?;
    let secs = i64::try_from(duration.as_secs()).map_err(|_| Rejection::new("duration is too long"))?;

    let mut parts = ValueMap::with_capacity(2);
    parts.insert("secs".to_string(), Value::from(secs));
    parts.insert("nanos".to_string(), Value::from(duration.subsec_nanos()));
    Ok(Value::Object(parts))
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register(&TypeDesc::exact("date"), Capability::leaf(parse_date));
    registry.register(&TypeDesc::exact("datetime"), Capability::leaf(parse_datetime));
    registry.register(&TypeDesc::exact("time"), Capability::leaf(parse_time));
    registry.register(&TypeDesc::exact("duration"), Capability::leaf(parse_duration));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_formats() {
        let expected = Ok(Value::Date(ymd(2024, 1, 15)));
        for text in [
            "2024-01-15",
            "2024/01/15",
            "15.01.2024",
            "20240115",
            "15 January 2024",
            "January 15, 2024",
            "2024-01-15T23:59:00Z",
        ] {
            assert_eq!(parse_date(text), expected, "{text}");
        }
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_datetime_normalizes_to_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();
        for text in [
            "2024-01-15T08:30:00Z",
            "2024-01-15T10:30:00+02:00",
            "2024-01-15 10:30:00+0200",
            "2024-01-15T08:30:00",
            "2024-01-15 08:30",
        ] {
            assert_eq!(parse_datetime(text), Ok(Value::DateTime(expected)), "{text}");
        }
        assert_eq!(
            parse_datetime("2024-01-15"),
            Ok(Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()))
        );
        assert!(parse_datetime("15:30").is_err());
    }

    #[test]
    fn test_time_formats() {
        let expected = Ok(Value::Time(NaiveTime::from_hms_opt(12, 34, 56).unwrap()));
        assert_eq!(parse_time("12:34:56"), expected);
        assert_eq!(parse_time(" 12:34:56 "), expected);
        assert_eq!(parse_time("12:34:56 PM"), expected);
        assert_eq!(
            parse_time("07:05"),
            Ok(Value::Time(NaiveTime::from_hms_opt(7, 5, 0).unwrap()))
        );
        assert!(parse_time("not-a-time").is_err());
        assert!(parse_time("25:00").is_err());
    }

    fn secs_nanos(value: Value) -> (Option<i64>, Option<i64>) {
        let parts = value.as_object().unwrap().clone();
        (
            parts.get("secs").and_then(Value::as_i64),
            parts.get("nanos").and_then(Value::as_i64),
        )
    }

    #[test]
    fn test_duration_from_seconds_and_clock() {
        assert_eq!(secs_nanos(parse_duration("3600").unwrap()), (Some(3600), Some(0)));
        assert_eq!(secs_nanos(parse_duration("90.5").unwrap()), (Some(90), Some(500_000_000)));
        assert_eq!(secs_nanos(parse_duration("01:00:00").unwrap()), (Some(3600), Some(0)));
        assert_eq!(secs_nanos(parse_duration("00:30:00").unwrap()), (Some(1800), Some(0)));
        assert_eq!(secs_nanos(parse_duration("26:00:01.25").unwrap()), (Some(93601), Some(250_000_000)));
    }

    #[test]
    fn test_duration_rejections() {
        for bad in ["invalid", "-5", "inf", "nan", "1:2", "00:60:00", "1:00:00:00"] {
            assert!(parse_duration(bad).is_err(), "{bad}");
        }
    }
}
