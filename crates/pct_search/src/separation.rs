//! Two-body separation search (conjunctions, oppositions, any fixed angle).
//!
//! The separation lon1 - lon2 is just another longitude-like function of
//! time, so the crossing refiner does the work: a separation event is a
//! crossing of the target separation by that difference.

use pct_ephem::{Ephemeris, normalize_360, normalize_pm180};
use serde::{Deserialize, Serialize};

use crate::crossing::{find_crossings, find_next_crossing};
use crate::crossing_types::{CrossingConfig, CrossingDirection, CrossingEvent, SearchDirection, Track};
use crate::error::SearchError;

/// Configuration for separation searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparationConfig {
    /// Target value of `lon1 - lon2`, degrees [0, 360).
    pub target_separation_deg: f64,
    /// Sampling and refinement settings.
    #[serde(default)]
    pub crossing: CrossingConfig,
}

impl SeparationConfig {
    /// Any target separation with the given sampling step.
    pub fn aspect(target_separation_deg: f64, step_days: f64) -> Self {
        Self {
            target_separation_deg,
            crossing: CrossingConfig::new(step_days, 1e-5),
        }
    }

    /// Same longitude.
    pub fn conjunction(step_days: f64) -> Self {
        Self::aspect(0.0, step_days)
    }

    /// Longitudes 180° apart.
    pub fn opposition(step_days: f64) -> Self {
        Self::aspect(180.0, step_days)
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !self.target_separation_deg.is_finite()
            || !(0.0..360.0).contains(&self.target_separation_deg)
        {
            return Err("target_separation_deg must be in [0, 360)");
        }
        self.crossing.validate()
    }
}

/// A moment when two tracks are the target separation apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationEvent {
    /// Event time as Julian Date (UT).
    pub jd: f64,
    /// `lon1 - lon2` reported next to the target (e.g. -0.0001 rather than 359.9999).
    pub actual_separation_deg: f64,
    pub body1_longitude_deg: f64,
    pub body2_longitude_deg: f64,
    /// Whether `lon1 - lon2` was growing through the target.
    pub separation_increasing: bool,
}

/// Separation closest to the target, avoiding the 0°/360° ambiguity.
fn compute_actual_separation(lon1: f64, lon2: f64, target_deg: f64) -> f64 {
    let raw = normalize_360(lon1 - lon2);
    target_deg + normalize_pm180(raw - target_deg)
}

fn separation_fn<'a, E>(
    eph: &'a E,
    track1: &'a Track,
    track2: &'a Track,
) -> impl Fn(f64) -> Result<f64, SearchError> + 'a
where
    E: Ephemeris + ?Sized,
{
    move |t: f64| -> Result<f64, SearchError> {
        let lon1 = eph.longitude(&track1.query(t))?;
        let lon2 = eph.longitude(&track2.query(t))?;
        Ok(lon1 - lon2)
    }
}

fn to_event<E>(
    eph: &E,
    track1: &Track,
    track2: &Track,
    target_deg: f64,
    crossing: &CrossingEvent,
) -> Result<SeparationEvent, SearchError>
where
    E: Ephemeris + ?Sized,
{
    let lon1 = eph.longitude(&track1.query(crossing.jd))?;
    let lon2 = eph.longitude(&track2.query(crossing.jd))?;
    Ok(SeparationEvent {
        jd: crossing.jd,
        actual_separation_deg: compute_actual_separation(lon1, lon2, target_deg),
        body1_longitude_deg: lon1,
        body2_longitude_deg: lon2,
        separation_increasing: crossing.direction == CrossingDirection::Direct,
    })
}

/// Search for every separation event in a time range.
pub fn search_separations<E>(
    eph: &E,
    track1: &Track,
    track2: &Track,
    jd_start: f64,
    jd_end: f64,
    config: &SeparationConfig,
) -> Result<Vec<SeparationEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    config.validate().map_err(SearchError::InvalidConfig)?;
    if track1 == track2 {
        return Err(SearchError::InvalidConfig("tracks must differ"));
    }

    let target = config.target_separation_deg;
    find_crossings(
        separation_fn(eph, track1, track2),
        jd_start,
        jd_end,
        target,
        &config.crossing,
    )?
    .iter()
    .map(|c| to_event(eph, track1, track2, target, c))
    .collect()
}

/// Find the next separation event after `jd`.
pub fn next_separation<E>(
    eph: &E,
    track1: &Track,
    track2: &Track,
    jd: f64,
    config: &SeparationConfig,
) -> Result<Option<SeparationEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_separation(eph, track1, track2, jd, SearchDirection::Forward, config)
}

/// Find the previous separation event before `jd`.
pub fn prev_separation<E>(
    eph: &E,
    track1: &Track,
    track2: &Track,
    jd: f64,
    config: &SeparationConfig,
) -> Result<Option<SeparationEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_separation(eph, track1, track2, jd, SearchDirection::Backward, config)
}

fn find_separation<E>(
    eph: &E,
    track1: &Track,
    track2: &Track,
    jd: f64,
    direction: SearchDirection,
    config: &SeparationConfig,
) -> Result<Option<SeparationEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    config.validate().map_err(SearchError::InvalidConfig)?;
    if track1 == track2 {
        return Err(SearchError::InvalidConfig("tracks must differ"));
    }
    let target = config.target_separation_deg;
    find_next_crossing(
        separation_fn(eph, track1, track2),
        jd,
        target,
        direction,
        &config.crossing,
    )?
    .map(|c| to_event(eph, track1, track2, target, &c))
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actual_sep_near_zero() {
        // lon1 slightly less than lon2 → raw ≈ 359.999°, target=0 → report ~0
        let sep = compute_actual_separation(100.0, 100.0001, 0.0);
        assert!(sep.abs() < 0.01, "sep = {sep}");
    }

    #[test]
    fn actual_sep_opposition() {
        let sep = compute_actual_separation(280.0, 100.0, 180.0);
        assert!((sep - 180.0).abs() < 0.01, "sep = {sep}");
    }

    #[test]
    fn config_presets() {
        assert!((SeparationConfig::conjunction(1.0).target_separation_deg).abs() < 1e-12);
        assert!((SeparationConfig::opposition(1.0).target_separation_deg - 180.0).abs() < 1e-12);
        assert!(SeparationConfig::aspect(90.0, 1.0).validate().is_ok());
    }

    #[test]
    fn config_rejects_360_target() {
        assert!(SeparationConfig::aspect(360.0, 1.0).validate().is_err());
        assert!(SeparationConfig::aspect(-10.0, 1.0).validate().is_err());
    }

    #[test]
    fn config_rejects_zero_step() {
        assert!(SeparationConfig::conjunction(0.0).validate().is_err());
    }
}
