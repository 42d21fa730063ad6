//! Stationary point search.
//!
//! Finds when a body's geocentric longitude speed crosses zero (station
//! retrograde / station direct), using the same coarse scan + bisection as
//! the crossing refiner, with the speed as the scanned function.

use pct_ephem::{Body, Ephemeris, Perspective};
use tracing::debug;

use crate::crossing_types::{SearchDirection, Track};
use crate::error::SearchError;
use crate::search_util::{bisect_zero, check_scan, side};
use crate::stationary_types::{StationType, StationaryConfig, StationaryEvent};

/// Only geocentric planets go retrograde. The Sun and Moon always move
/// forward, the mean nodes always move backward, and nothing stations
/// heliocentrically.
fn validate_track(track: &Track) -> Result<(), SearchError> {
    if track.perspective == Perspective::Heliocentric {
        return Err(SearchError::InvalidConfig(
            "heliocentric longitudes have no stationary points",
        ));
    }
    match track.body {
        Body::Sun | Body::Moon | Body::Earth | Body::MeanNorthNode | Body::MeanSouthNode => Err(
            SearchError::InvalidConfig("Sun, Moon, Earth and the nodes have no stationary points"),
        ),
        _ => Ok(()),
    }
}

fn speed_fn<'a, E>(eph: &'a E, track: &'a Track) -> impl Fn(f64) -> Result<f64, SearchError> + 'a
where
    E: Ephemeris + ?Sized,
{
    move |t: f64| -> Result<f64, SearchError> {
        Ok(eph.longitude_state(&track.query(t))?.speed_deg_per_day)
    }
}

fn refine<E>(
    eph: &E,
    track: &Track,
    t_a: f64,
    v_a: f64,
    t_b: f64,
    config: &StationaryConfig,
) -> Result<StationaryEvent, SearchError>
where
    E: Ephemeris + ?Sized,
{
    let t_station = bisect_zero(
        t_a,
        v_a,
        t_b,
        config.max_iterations,
        config.max_time_error_days,
        &speed_fn(eph, track),
    )?;
    let pos = eph.position(&track.query(t_station))?;

    // positive→negative = StationRetrograde, negative→positive = StationDirect
    let station_type = if side(v_a) {
        StationType::StationRetrograde
    } else {
        StationType::StationDirect
    };

    debug!(jd = t_station, body = %track.body, station = station_type.as_str(), "station refined");
    Ok(StationaryEvent {
        jd: t_station,
        body: track.body,
        longitude_deg: pos.lon_deg,
        latitude_deg: pos.lat_deg,
        station_type,
    })
}

/// Find a single stationary event by coarse scan for a speed sign change, then bisect.
fn find_stationary_event<E>(
    eph: &E,
    track: &Track,
    jd_start: f64,
    direction: SearchDirection,
    config: &StationaryConfig,
) -> Result<Option<StationaryEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    config.validate().map_err(SearchError::InvalidConfig)?;
    validate_track(track)?;

    let step = direction.sign() * config.step_days;
    check_scan(jd_start, jd_start + direction.sign() * config.max_scan_days, config.step_days)?;
    let max_steps = (config.max_scan_days / config.step_days).ceil() as usize;
    let speed_at = speed_fn(eph, track);

    let mut t_prev = jd_start;
    let mut v_prev = speed_at(t_prev)?;

    for _ in 0..max_steps {
        let t_curr = t_prev + step;
        let v_curr = speed_at(t_curr)?;

        if side(v_prev) != side(v_curr) {
            // Ensure t_a < t_b for bisection
            let (t_a, v_a, t_b) = if t_prev < t_curr {
                (t_prev, v_prev, t_curr)
            } else {
                (t_curr, v_curr, t_prev)
            };
            return refine(eph, track, t_a, v_a, t_b, config).map(Some);
        }

        t_prev = t_curr;
        v_prev = v_curr;
    }

    Ok(None)
}

/// Find the next stationary point after `jd`.
pub fn next_stationary<E>(
    eph: &E,
    track: &Track,
    jd: f64,
    config: &StationaryConfig,
) -> Result<Option<StationaryEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_stationary_event(eph, track, jd, SearchDirection::Forward, config)
}

/// Find the previous stationary point before `jd`.
pub fn prev_stationary<E>(
    eph: &E,
    track: &Track,
    jd: f64,
    config: &StationaryConfig,
) -> Result<Option<StationaryEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_stationary_event(eph, track, jd, SearchDirection::Backward, config)
}

/// Search for all stationary points in a time range.
pub fn search_stationary<E>(
    eph: &E,
    track: &Track,
    jd_start: f64,
    jd_end: f64,
    config: &StationaryConfig,
) -> Result<Vec<StationaryEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    config.validate().map_err(SearchError::InvalidConfig)?;
    validate_track(track)?;

    if jd_end <= jd_start {
        return Err(SearchError::InvalidConfig("jd_end must be after jd_start"));
    }
    check_scan(jd_start, jd_end, config.step_days)?;

    let speed_at = speed_fn(eph, track);
    let mut events = Vec::new();

    let mut t_prev = jd_start;
    let mut v_prev = speed_at(t_prev)?;

    loop {
        let t_curr = (t_prev + config.step_days).min(jd_end);
        let v_curr = speed_at(t_curr)?;

        if side(v_prev) != side(v_curr) {
            events.push(refine(eph, track, t_prev, v_prev, t_curr, config)?);
        }

        if t_curr >= jd_end {
            break;
        }

        t_prev = t_curr;
        v_prev = v_curr;
    }

    Ok(events)
}
