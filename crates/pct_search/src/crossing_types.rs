//! Types for the angle-crossing refiner.

use pct_ephem::{Body, Frame, Perspective, Query};
use serde::{Deserialize, Serialize};

/// Scan direction for next/previous searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    pub(crate) fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Direction of motion when the target angle was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossingDirection {
    /// Longitude increasing through the target.
    Direct,
    /// Longitude decreasing through the target.
    Retrograde,
    /// Longitude reached the target and turned back without passing it.
    Touch,
}

impl CrossingDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Retrograde => "retrograde",
            Self::Touch => "touch",
        }
    }
}

/// Which crossings a direction-aware search keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossingFilter {
    #[default]
    Any,
    DirectOnly,
    RetrogradeOnly,
}

impl CrossingFilter {
    pub fn accepts(self, direction: CrossingDirection) -> bool {
        match self {
            Self::Any => true,
            Self::DirectOnly => direction == CrossingDirection::Direct,
            Self::RetrogradeOnly => direction == CrossingDirection::Retrograde,
        }
    }
}

/// One refined crossing of a target angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEvent {
    /// Crossing time as Julian Date (UT).
    pub jd: f64,
    /// Longitude at the refined time, degrees [0, 360).
    pub longitude_deg: f64,
    /// Direction of motion through the target.
    pub direction: CrossingDirection,
}

/// Configuration for crossing searches.
///
/// Two passes inside one sampling step are recovered from the turn between
/// them, except in the first and last step of a window; pick `step_days` well
/// below the shortest retrograde loop of the body being searched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingConfig {
    /// Coarse sampling step in days.
    pub step_days: f64,
    /// Refined crossings are within this many days of the true instant.
    pub max_time_error_days: f64,
    /// Cap on bisection halvings (default 100). Running out before
    /// `max_time_error_days` is reached is an error.
    pub max_iterations: u32,
    /// A turn of the longitude that ends within this many degrees of the
    /// target is reported as one touch.
    pub touch_tolerance_deg: f64,
    /// Longest span scanned by next/previous searches, in days.
    pub max_scan_days: f64,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self::planet()
    }
}

impl CrossingConfig {
    /// Explicit step and tolerance, other fields defaulted.
    pub fn new(step_days: f64, max_time_error_days: f64) -> Self {
        Self {
            step_days,
            max_time_error_days,
            max_iterations: 100,
            touch_tolerance_deg: 1e-6,
            max_scan_days: 36_525.0,
        }
    }

    /// Moon: quarter-day sampling.
    pub fn moon() -> Self {
        Self::new(0.25, 1e-5)
    }

    /// Sun and planets: one-day sampling, which resolves the shortest
    /// geocentric retrograde loop (Mercury's) comfortably.
    pub fn planet() -> Self {
        Self::new(1.0, 1e-5)
    }

    /// Preset matched to how fast a body moves.
    pub fn for_body(body: Body) -> Self {
        match body {
            Body::Moon => Self::moon(),
            _ => Self::planet(),
        }
    }

    /// Validate the configuration.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !self.step_days.is_finite() || self.step_days <= 0.0 {
            return Err("step_days must be positive");
        }
        if !self.max_time_error_days.is_finite() || self.max_time_error_days <= 0.0 {
            return Err("max_time_error_days must be positive");
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0");
        }
        if !(0.0..1.0).contains(&self.touch_tolerance_deg) {
            return Err("touch_tolerance_deg must be in [0, 1)");
        }
        if !self.max_scan_days.is_finite() || self.max_scan_days <= 0.0 {
            return Err("max_scan_days must be positive");
        }
        Ok(())
    }
}

/// A body seen from one perspective in one frame: what a search samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub body: Body,
    #[serde(default)]
    pub perspective: Perspective,
    #[serde(default)]
    pub frame: Frame,
}

impl Track {
    pub fn new(body: Body, perspective: Perspective, frame: Frame) -> Self {
        Self {
            body,
            perspective,
            frame,
        }
    }

    /// Geocentric, of-date track.
    pub fn geocentric(body: Body) -> Self {
        Self::new(body, Perspective::Geocentric, Frame::EclipticOfDate)
    }

    /// Heliocentric, of-date track.
    pub fn heliocentric(body: Body) -> Self {
        Self::new(body, Perspective::Heliocentric, Frame::EclipticOfDate)
    }

    /// Ephemeris query for this track at `jd_ut`.
    pub fn query(&self, jd_ut: f64) -> Query {
        Query::new(self.body, self.perspective, self.frame, jd_ut)
    }

    /// Column label such as `mars_geo`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.body.name(), self.perspective.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planet_defaults() {
        let c = CrossingConfig::planet();
        assert!((c.step_days - 1.0).abs() < 1e-12);
        assert_eq!(c.max_iterations, 100);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn moon_uses_finer_step() {
        assert!(CrossingConfig::for_body(Body::Moon).step_days < 1.0);
        assert!(CrossingConfig::for_body(Body::Saturn).validate().is_ok());
    }

    #[test]
    fn rejects_zero_step() {
        assert!(CrossingConfig::new(0.0, 1e-5).validate().is_err());
        assert!(CrossingConfig::new(f64::NAN, 1e-5).validate().is_err());
    }

    #[test]
    fn rejects_zero_tolerance() {
        assert!(CrossingConfig::new(1.0, 0.0).validate().is_err());
    }

    #[test]
    fn rejects_zero_iterations() {
        let mut c = CrossingConfig::planet();
        c.max_iterations = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn filter_accepts() {
        assert!(CrossingFilter::Any.accepts(CrossingDirection::Retrograde));
        assert!(CrossingFilter::DirectOnly.accepts(CrossingDirection::Direct));
        assert!(!CrossingFilter::DirectOnly.accepts(CrossingDirection::Retrograde));
        assert!(!CrossingFilter::RetrogradeOnly.accepts(CrossingDirection::Direct));
        assert!(CrossingFilter::Any.accepts(CrossingDirection::Touch));
        assert!(!CrossingFilter::DirectOnly.accepts(CrossingDirection::Touch));
        assert!(!CrossingFilter::RetrogradeOnly.accepts(CrossingDirection::Touch));
    }

    #[test]
    fn rejects_bad_touch_tolerance() {
        let mut c = CrossingConfig::planet();
        c.touch_tolerance_deg = -1e-6;
        assert!(c.validate().is_err());
        c.touch_tolerance_deg = f64::NAN;
        assert!(c.validate().is_err());
        c.touch_tolerance_deg = 0.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn track_label() {
        assert_eq!(Track::heliocentric(Body::Mars).label(), "mars_helio");
        assert_eq!(Track::geocentric(Body::MeanNorthNode).label(), "mean-north-node_geo");
    }
}
