//! Error type for price files and swing files.

use pct_time::TimeError;
use thiserror::Error;

/// Errors from reading or writing market data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MarketError {
    /// CSV layout options are inconsistent.
    #[error("invalid layout: {0}")]
    InvalidLayout(&'static str),
    /// Detection settings are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// A data row could not be turned into a price bar.
    #[error("line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    /// A timestamp in the file could not be parsed.
    #[error("time error: {0}")]
    Time(#[from] TimeError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
