//! Time handling for the planetary cycle toolkit.
//!
//! This crate provides:
//! - Julian Date ↔ calendar conversions
//! - Julian Date ↔ `chrono` UTC instants
//! - ΔT (TT − UT) for converting civil timestamps to ephemeris time
//! - Time-zone aware timestamp parsing for price files

pub mod delta_t;
pub mod error;
pub mod julian;
pub mod timestamp;

pub use delta_t::{delta_t_seconds, jd_ut_to_tt};
pub use error::TimeError;
pub use julian::{
    DAYS_PER_CENTURY, J2000_JD, SECONDS_PER_DAY, UNIX_EPOCH_JD, calendar_to_jd, datetime_to_jd,
    jd_to_calendar, jd_to_centuries, jd_to_datetime, jd_to_decimal_year,
};
pub use timestamp::{
    OUTPUT_FORMAT, format_timestamp, localize, parse_timestamp, parse_timestamp_with,
    parse_timezone,
};

pub use chrono_tz::Tz;
