//! Cycle travel: when has a body moved a given number of degrees?
//!
//! Longitude is unwrapped while scanning (each step adds the shortest signed
//! difference), so retrograde back-tracking is subtracted from the travel
//! instead of being counted twice. A lookback of `n` cycles from a reference
//! time is the latest earlier instant at which the body was `n × 360°` of
//! travel behind its reference position.

use pct_ephem::{Ephemeris, normalize_pm180};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crossing_types::{SearchDirection, Track};
use crate::error::SearchError;
use crate::search_util::{bisect_zero, check_scan, side};

/// Configuration for travel searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Coarse scan step in days. Must keep per-step motion under 180°.
    pub step_days: f64,
    pub max_time_error_days: f64,
    pub max_iterations: u32,
    /// Give up after scanning this many days from the reference.
    pub max_scan_days: f64,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            step_days: 1.0,
            max_time_error_days: 1e-5,
            max_iterations: 100,
            max_scan_days: 100_000.0,
        }
    }
}

impl TravelConfig {
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
        if !self.max_scan_days.is_finite() || self.max_scan_days < self.step_days {
            return Err("max_scan_days must be at least one step");
        }
        Ok(())
    }
}

/// The instant at which the requested travel was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelEvent {
    /// Event time as Julian Date (UT).
    pub jd: f64,
    /// Longitude at the event, degrees [0, 360).
    pub longitude_deg: f64,
    /// Signed travel between the event and the reference, measured forward in time
    /// for projections and backward in time for lookbacks.
    pub travelled_deg: f64,
}

/// Find the instant nearest `jd_ref` (in `direction`) at which the body has
/// travelled `degrees` of longitude relative to its position at `jd_ref`.
///
/// Travel is counted along the direction of the search: looking backward,
/// a planet in direct motion has positive travel. Negative `degrees` asks for
/// net retrograde travel (the natural case for the mean nodes).
pub fn find_travel<E>(
    eph: &E,
    track: &Track,
    jd_ref: f64,
    degrees: f64,
    direction: SearchDirection,
    config: &TravelConfig,
) -> Result<Option<TravelEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    config.validate().map_err(SearchError::InvalidConfig)?;
    if !degrees.is_finite() {
        return Err(SearchError::InvalidConfig("degrees must be finite"));
    }

    let sign = direction.sign();
    let lon_at = |t: f64| -> Result<f64, SearchError> { Ok(eph.longitude(&track.query(t))?) };

    let lon_ref = lon_at(jd_ref)?;
    if degrees == 0.0 {
        return Ok(Some(TravelEvent {
            jd: jd_ref,
            longitude_deg: lon_ref,
            travelled_deg: 0.0,
        }));
    }

    let step = sign * config.step_days;
    check_scan(jd_ref, jd_ref + sign * config.max_scan_days, config.step_days)?;
    let max_steps = (config.max_scan_days / config.step_days).ceil() as usize;

    let mut t_prev = jd_ref;
    let mut lon_prev = lon_ref;
    let mut acc_prev = 0.0;
    let mut f_prev = -degrees;

    for _ in 0..max_steps {
        let t_curr = t_prev + step;
        let lon_curr = lon_at(t_curr)?;
        let acc_curr = acc_prev + normalize_pm180(lon_curr - lon_prev);
        let f_curr = sign * acc_curr - degrees;

        if side(f_prev) != side(f_curr) {
            debug!(t_prev, t_curr, degrees, "travel level bracketed");

            // Travel relative to the bracket start stays within one step.
            let (lon0, acc0) = (lon_prev, acc_prev);
            let f_at = |t: f64| -> Result<f64, SearchError> {
                let acc = acc0 + normalize_pm180(lon_at(t)? - lon0);
                Ok(sign * acc - degrees)
            };

            let (t_a, f_a, t_b) = if t_prev < t_curr {
                (t_prev, f_prev, t_curr)
            } else {
                (t_curr, f_curr, t_prev)
            };
            let jd = bisect_zero(
                t_a,
                f_a,
                t_b,
                config.max_iterations,
                config.max_time_error_days,
                &f_at,
            )?;
            let travelled = f_at(jd)? + degrees;

            return Ok(Some(TravelEvent {
                jd,
                longitude_deg: lon_at(jd)?,
                travelled_deg: travelled,
            }));
        }

        t_prev = t_curr;
        lon_prev = lon_curr;
        acc_prev = acc_curr;
        f_prev = f_curr;
    }

    Ok(None)
}

/// Look back `cycles` full revolutions (of 360°) from `jd_ref`.
pub fn lookback<E>(
    eph: &E,
    track: &Track,
    jd_ref: f64,
    cycles: f64,
    config: &TravelConfig,
) -> Result<Option<TravelEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_travel(eph, track, jd_ref, cycles * 360.0, SearchDirection::Backward, config)
}

/// Project `cycles` full revolutions forward from `jd_ref`.
pub fn project<E>(
    eph: &E,
    track: &Track,
    jd_ref: f64,
    cycles: f64,
    config: &TravelConfig,
) -> Result<Option<TravelEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_travel(eph, track, jd_ref, cycles * 360.0, SearchDirection::Forward, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pct_ephem::{Body, EclipticPosition, EphemError, Query, normalize_360};

    /// Unwrapped longitude `f(jd)` served modulo 360.
    struct Synthetic<F: Fn(f64) -> f64>(F);

    impl<F: Fn(f64) -> f64> Ephemeris for Synthetic<F> {
        fn position(&self, query: &Query) -> Result<EclipticPosition, EphemError> {
            Ok(EclipticPosition {
                lon_deg: normalize_360((self.0)(query.jd_ut)),
                lat_deg: 0.0,
                distance_au: 1.0,
            })
        }
    }

    fn track() -> Track {
        Track::geocentric(Body::Mars)
    }

    #[test]
    fn linear_lookback_one_cycle() {
        let eph = Synthetic(|t: f64| t);
        let ev = lookback(&eph, &track(), 1000.0, 1.0, &TravelConfig::default())
            .unwrap()
            .unwrap();
        assert!((ev.jd - 640.0).abs() < 1e-4, "jd = {}", ev.jd);
        assert!((ev.travelled_deg - 360.0).abs() < 1e-3);
    }

    #[test]
    fn linear_projection_half_cycle() {
        let eph = Synthetic(|t: f64| 2.0 * t);
        let ev = project(&eph, &track(), 100.0, 0.5, &TravelConfig::default())
            .unwrap()
            .unwrap();
        assert!((ev.jd - 190.0).abs() < 1e-4, "jd = {}", ev.jd);
    }

    #[test]
    fn retrograde_loops_are_netted() {
        // Speed 1 + 3cos(t/10) goes negative for part of each loop.
        let acc = |t: f64| t + 30.0 * (t / 10.0).sin();
        let eph = Synthetic(acc);
        let jd_ref = 1000.0;
        let ev = lookback(&eph, &track(), jd_ref, 1.0, &TravelConfig::default())
            .unwrap()
            .unwrap();
        assert!(ev.jd < jd_ref);
        assert!((acc(jd_ref) - acc(ev.jd) - 360.0).abs() < 1e-3);
    }

    #[test]
    fn negative_travel_for_backward_mover() {
        let eph = Synthetic(|t: f64| -0.05 * t);
        let ev = lookback(&eph, &track(), 10_000.0, -1.0, &TravelConfig::default())
            .unwrap()
            .unwrap();
        assert!((ev.jd - (10_000.0 - 7200.0)).abs() < 1e-3, "jd = {}", ev.jd);
    }

    #[test]
    fn zero_travel_is_reference() {
        let eph = Synthetic(|t: f64| t);
        let ev = lookback(&eph, &track(), 500.0, 0.0, &TravelConfig::default())
            .unwrap()
            .unwrap();
        assert!((ev.jd - 500.0).abs() < 1e-12);
    }

    #[test]
    fn scan_limit_gives_none() {
        let eph = Synthetic(|t: f64| 0.01 * t);
        let cfg = TravelConfig {
            max_scan_days: 1000.0,
            ..TravelConfig::default()
        };
        assert!(lookback(&eph, &track(), 50_000.0, 1.0, &cfg).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_config() {
        let eph = Synthetic(|t: f64| t);
        let cfg = TravelConfig {
            step_days: -1.0,
            ..TravelConfig::default()
        };
        assert!(lookback(&eph, &track(), 0.0, 1.0, &cfg).is_err());
        assert!(lookback(&eph, &track(), 0.0, f64::NAN, &TravelConfig::default()).is_err());
    }

    #[test]
    fn step_below_time_resolution_is_rejected() {
        let eph = Synthetic(|t: f64| t);
        let cfg = TravelConfig {
            step_days: 1e-12,
            ..TravelConfig::default()
        };
        let r = lookback(&eph, &track(), 2_451_545.0, 1.0, &cfg);
        assert!(matches!(r, Err(SearchError::InvalidConfig(_))));
    }
}
