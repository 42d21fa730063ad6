//! Julian Date ↔ calendar conversions (proleptic Gregorian after 1582-Oct-15).
//!
//! Algorithms from Meeus, "Astronomical Algorithms", chapter 7.

use chrono::{DateTime, Utc};

use crate::error::TimeError;

/// Julian Date of the J2000.0 epoch (2000-Jan-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Julian Date of the Unix epoch (1970-Jan-01 00:00 UTC).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days in one Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Convert a calendar date with fractional day into a Julian Date.
///
/// Dates before 1582-Oct-15 are interpreted in the Julian calendar.
pub fn calendar_to_jd(year: i32, month: u32, day_frac: f64) -> f64 {
    let (mut y, mut m) = (year as f64, month as f64);
    if month <= 2 {
        y -= 1.0;
        m += 12.0;
    }
    let gregorian = (year, month, day_frac) >= (1582, 10, 15.0);
    let b = if gregorian {
        let a = (y / 100.0).floor();
        2.0 - a + (a / 4.0).floor()
    } else {
        0.0
    };
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day_frac + b - 1524.5
}

/// Convert a Julian Date into `(year, month, day_frac)`.
pub fn jd_to_calendar(jd: f64) -> (i32, u32, f64) {
    let z = (jd + 0.5).floor();
    let f = jd + 0.5 - z;
    let a = if z < 2_299_161.0 {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = b - d - (30.6001 * e).floor() + f;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };
    (year as i32, month as u32, day)
}

/// Julian centuries since J2000.0.
pub fn jd_to_centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

/// Julian Date (UT) of a UTC instant.
pub fn datetime_to_jd(dt: &DateTime<Utc>) -> f64 {
    let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    UNIX_EPOCH_JD + secs / SECONDS_PER_DAY
}

/// UTC instant of a Julian Date (UT), rounded to the millisecond.
pub fn jd_to_datetime(jd: f64) -> Result<DateTime<Utc>, TimeError> {
    if !jd.is_finite() {
        return Err(TimeError::OutOfRange(jd));
    }
    let millis = ((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return Err(TimeError::OutOfRange(jd));
    }
    DateTime::from_timestamp_millis(millis as i64).ok_or(TimeError::OutOfRange(jd))
}

/// Decimal year of a Julian Date, good enough for ΔT lookup.
pub fn jd_to_decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000_JD) / 365.25
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    #[test]
    fn j2000_noon() {
        assert_abs_diff_eq!(calendar_to_jd(2000, 1, 1.5), J2000_JD, epsilon = 1e-9);
    }

    #[test]
    fn meeus_examples() {
        // Meeus example 7.a and 7.b
        assert_abs_diff_eq!(calendar_to_jd(1957, 10, 4.81), 2_436_116.31, epsilon = 1e-6);
        assert_abs_diff_eq!(calendar_to_jd(333, 1, 27.5), 1_842_713.0, epsilon = 1e-6);
    }

    #[test]
    fn calendar_roundtrip() {
        let jd = calendar_to_jd(2024, 3, 20.125);
        let (y, m, d) = jd_to_calendar(jd);
        assert_eq!((y, m), (2024, 3));
        assert_abs_diff_eq!(d, 20.125, epsilon = 1e-8);
    }

    #[test]
    fn january_roundtrip() {
        let (y, m, d) = jd_to_calendar(calendar_to_jd(1987, 1, 27.0));
        assert_eq!((y, m), (1987, 1));
        assert_abs_diff_eq!(d, 27.0, epsilon = 1e-8);
    }

    #[test]
    fn unix_epoch() {
        let dt = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_abs_diff_eq!(datetime_to_jd(&dt), UNIX_EPOCH_JD, epsilon = 1e-12);
    }

    #[test]
    fn datetime_roundtrip_millis() {
        let dt = Utc.with_ymd_and_hms(2011, 6, 14, 17, 45, 12).unwrap();
        let back = jd_to_datetime(datetime_to_jd(&dt)).unwrap();
        assert_eq!(back, dt);
    }

    #[test]
    fn non_finite_rejected() {
        assert!(jd_to_datetime(f64::NAN).is_err());
        assert!(jd_to_datetime(f64::INFINITY).is_err());
    }

    #[test]
    fn centuries_at_j2000() {
        assert_eq!(jd_to_centuries(J2000_JD), 0.0);
        assert_abs_diff_eq!(jd_to_centuries(J2000_JD + DAYS_PER_CENTURY), 1.0);
    }
}
