//! Error types for ephemeris queries.

use thiserror::Error;

use crate::body::{Body, Frame, Perspective};

/// Errors from ephemeris lookups.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EphemError {
    /// Body name did not match any supported body.
    #[error("unknown body '{0}'")]
    UnknownBody(String),
    /// Perspective name did not match geocentric or heliocentric.
    #[error("unknown perspective '{0}'")]
    UnknownPerspective(String),
    /// The body has no position from the requested perspective.
    #[error("{body} has no {perspective} position")]
    UnsupportedQuery { body: Body, perspective: Perspective },
    /// Epoch outside the source's coverage.
    #[error("epoch JD {jd} is outside the ephemeris range")]
    EpochOutOfRange { jd: f64 },
    /// Tabulated positions are in a different frame than requested.
    #[error("table holds {table:?} longitudes, query asked for {query:?}")]
    FrameMismatch { table: Frame, query: Frame },
    /// Tabulated ephemeris file could not be read or parsed.
    #[error("ephemeris table error: {0}")]
    Table(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EphemError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for EphemError {
    fn from(e: csv::Error) -> Self {
        Self::Table(e.to_string())
    }
}
