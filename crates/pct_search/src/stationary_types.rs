//! Types for stationary point search.

use pct_ephem::Body;
use serde::{Deserialize, Serialize};

/// Station type: retrograde or direct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StationType {
    /// Longitude speed crosses from positive to negative (starts retrograde).
    StationRetrograde,
    /// Longitude speed crosses from negative to positive (ends retrograde).
    StationDirect,
}

impl StationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StationRetrograde => "station-retrograde",
            Self::StationDirect => "station-direct",
        }
    }
}

/// A stationary point event (longitude speed crosses zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationaryEvent {
    /// Event time as Julian Date (UT).
    pub jd: f64,
    pub body: Body,
    /// Ecliptic longitude at station in degrees [0, 360).
    pub longitude_deg: f64,
    /// Ecliptic latitude at station in degrees.
    pub latitude_deg: f64,
    pub station_type: StationType,
}

/// Configuration for stationary searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationaryConfig {
    /// Coarse scan step size in days.
    pub step_days: f64,
    /// Maximum bisection iterations.
    pub max_iterations: u32,
    /// Convergence threshold in days (default 1e-6, ~0.09 s).
    pub max_time_error_days: f64,
    /// Next/previous searches give up after this many days.
    pub max_scan_days: f64,
}

impl Default for StationaryConfig {
    fn default() -> Self {
        Self::inner_planet()
    }
}

impl StationaryConfig {
    /// Mercury, Venus, Mars: 1-day step.
    pub fn inner_planet() -> Self {
        Self {
            step_days: 1.0,
            max_iterations: 60,
            max_time_error_days: 1e-6,
            max_scan_days: 800.0,
        }
    }

    /// Jupiter through Pluto: 2-day step.
    pub fn outer_planet() -> Self {
        Self {
            step_days: 2.0,
            ..Self::inner_planet()
        }
    }

    pub fn for_body(body: Body) -> Self {
        match body {
            Body::Mercury | Body::Venus | Body::Mars => Self::inner_planet(),
            _ => Self::outer_planet(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !self.step_days.is_finite() || self.step_days <= 0.0 {
            return Err("step_days must be positive");
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0");
        }
        if !self.max_time_error_days.is_finite() || self.max_time_error_days <= 0.0 {
            return Err("max_time_error_days must be positive");
        }
        if !self.max_scan_days.is_finite() || self.max_scan_days < self.step_days {
            return Err("max_scan_days must be at least one step");
        }
        Ok(())
    }
}
