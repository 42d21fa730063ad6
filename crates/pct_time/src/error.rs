//! Error types for time conversions and timestamp parsing.

use thiserror::Error;

/// Errors from calendar conversion or timestamp parsing.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimeError {
    /// Text did not match any accepted timestamp layout.
    #[error("unparseable timestamp '{0}'")]
    Unparseable(String),
    /// Local time does not exist in the zone (skipped by a DST transition).
    #[error("local time '{0}' does not exist in time zone {1}")]
    NonexistentLocalTime(String, String),
    /// Unknown IANA time zone name.
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),
    /// Julian Date cannot be represented as a calendar instant.
    #[error("julian date {0} is outside the representable range")]
    OutOfRange(f64),
}
