//! Longitude crossings of a single body, sampled from an [`Ephemeris`].

use pct_ephem::Ephemeris;

use crate::crossing::{apply_speed, find_crossings, find_next_crossing};
use crate::crossing_types::{
    CrossingConfig, CrossingEvent, CrossingFilter, SearchDirection, Track,
};
use crate::error::SearchError;

fn longitude_fn<'a, E>(eph: &'a E, track: &'a Track) -> impl Fn(f64) -> Result<f64, SearchError> + 'a
where
    E: Ephemeris + ?Sized,
{
    move |t: f64| -> Result<f64, SearchError> { Ok(eph.longitude(&track.query(t))?) }
}

fn classify<E>(
    eph: &E,
    track: &Track,
    event: &mut CrossingEvent,
) -> Result<(), SearchError>
where
    E: Ephemeris + ?Sized,
{
    let state = eph.longitude_state(&track.query(event.jd))?;
    apply_speed(event, state.speed_deg_per_day);
    Ok(())
}

/// All instants in `[jd_start, jd_end]` at which the body's longitude equals `target_deg`.
///
/// Direction comes from the ephemeris speed; `filter` keeps only direct or
/// only retrograde passes when asked.
pub fn body_crossings<E>(
    eph: &E,
    track: &Track,
    target_deg: f64,
    jd_start: f64,
    jd_end: f64,
    filter: CrossingFilter,
    config: &CrossingConfig,
) -> Result<Vec<CrossingEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    let lon_at = longitude_fn(eph, track);
    let mut events = Vec::new();
    for mut event in find_crossings(lon_at, jd_start, jd_end, target_deg, config)? {
        classify(eph, track, &mut event)?;
        if filter.accepts(event.direction) {
            events.push(event);
        }
    }
    Ok(events)
}

/// Next instant after `jd` at which the body reaches `target_deg`.
pub fn next_body_crossing<E>(
    eph: &E,
    track: &Track,
    target_deg: f64,
    jd: f64,
    config: &CrossingConfig,
) -> Result<Option<CrossingEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_body_crossing(eph, track, target_deg, jd, SearchDirection::Forward, config)
}

/// Last instant before `jd` at which the body was at `target_deg`.
pub fn prev_body_crossing<E>(
    eph: &E,
    track: &Track,
    target_deg: f64,
    jd: f64,
    config: &CrossingConfig,
) -> Result<Option<CrossingEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    find_body_crossing(eph, track, target_deg, jd, SearchDirection::Backward, config)
}

fn find_body_crossing<E>(
    eph: &E,
    track: &Track,
    target_deg: f64,
    jd: f64,
    direction: SearchDirection,
    config: &CrossingConfig,
) -> Result<Option<CrossingEvent>, SearchError>
where
    E: Ephemeris + ?Sized,
{
    let lon_at = longitude_fn(eph, track);
    match find_next_crossing(lon_at, jd, target_deg, direction, config)? {
        Some(mut event) => {
            classify(eph, track, &mut event)?;
            Ok(Some(event))
        }
        None => Ok(None),
    }
}
