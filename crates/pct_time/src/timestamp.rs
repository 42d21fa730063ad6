//! Time-zone aware timestamp parsing and formatting.
//!
//! Price files carry naive local timestamps in a handful of layouts. They are
//! interpreted in the exchange time zone and converted to UTC instants.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::TimeError;

/// Accepted naive date-time layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Accepted date-only layouts (midnight local time).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Output layout used by every CSV writer.
pub const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Parse an IANA time zone name such as `US/Eastern` or `America/Chicago`.
pub fn parse_timezone(name: &str) -> Result<Tz, TimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimeZone(name.to_string()))
}

/// Resolve a naive local time in `tz`.
///
/// A repeated local time (DST fall-back) resolves to the earlier instant.
pub fn localize(naive: &NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(early, _) => Ok(early.with_timezone(&Utc)),
        LocalResult::None => Err(TimeError::NonexistentLocalTime(
            naive.to_string(),
            tz.name().to_string(),
        )),
    }
}

/// Parse a timestamp in any accepted layout.
///
/// RFC 3339 text carries its own offset; every other layout is local to `tz`.
pub fn parse_timestamp(text: &str, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return localize(&naive, tz);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return localize(&naive, tz);
            }
        }
    }
    Err(TimeError::Unparseable(text.to_string()))
}

/// Parse a timestamp with one explicit `strftime` layout.
pub fn parse_timestamp_with(text: &str, fmt: &str, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    let text = text.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
        return localize(&naive, tz);
    }
    NaiveDate::parse_from_str(text, fmt)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimeError::Unparseable(text.to_string()))
        .and_then(|naive| localize(&naive, tz))
}

/// Format a UTC instant in `tz` using [`OUTPUT_FORMAT`].
pub fn format_timestamp(dt: &DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format(OUTPUT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::US::Eastern;

    #[test]
    fn naive_is_local() {
        let dt = parse_timestamp("2011-06-14 09:30:00", Eastern).unwrap();
        assert_eq!(dt.hour(), 13);
    }

    #[test]
    fn date_only_is_local_midnight() {
        let dt = parse_timestamp("01/03/2012", Eastern).unwrap();
        assert_eq!(dt.to_rfc3339(), "2012-01-03T05:00:00+00:00");
    }

    #[test]
    fn rfc3339_keeps_offset() {
        let dt = parse_timestamp("2012-01-03T00:00:00Z", Eastern).unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            parse_timestamp("yesterday", Eastern),
            Err(TimeError::Unparseable(_))
        ));
    }

    #[test]
    fn spring_forward_gap_rejected() {
        let err = parse_timestamp("2012-03-11 02:30:00", Eastern).unwrap_err();
        assert!(matches!(err, TimeError::NonexistentLocalTime(_, _)));
    }

    #[test]
    fn fall_back_takes_earlier() {
        let dt = parse_timestamp("2012-11-04 01:30:00", Eastern).unwrap();
        // EDT (UTC-4) is the earlier of the two instants.
        assert_eq!(dt.hour(), 5);
    }

    #[test]
    fn explicit_format() {
        let dt = parse_timestamp_with("03.01.2012 1600", "%d.%m.%Y %H%M", Eastern).unwrap();
        assert_eq!(dt.hour(), 21);
    }

    #[test]
    fn timezone_names() {
        assert!(parse_timezone("America/Chicago").is_ok());
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn format_in_zone() {
        let dt = parse_timestamp("2012-01-03 16:00:00", Eastern).unwrap();
        assert_eq!(format_timestamp(&dt, Eastern), "2012-01-03 16:00:00 EST");
    }
}
