//! Error type for searches.

use pct_ephem::EphemError;
use thiserror::Error;

/// Errors from crossing, separation, station and travel searches.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SearchError {
    /// Search configuration or arguments are invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// A refinement ran out of iterations before reaching the requested tolerance.
    #[error("no convergence after {iterations} iterations (bracket still {width_days} days wide)")]
    NoConvergence { iterations: u32, width_days: f64 },
    /// Ephemeris lookup failed.
    #[error("ephemeris error: {0}")]
    Ephem(#[from] EphemError),
}
