//! Angle-crossing refiner.
//!
//! Finds when a sampled longitude reaches a target angle. Coarse scan at a
//! fixed step, then bisection on the wrapped deviation
//! g(t) = normalize(lon(t) - target), which lives in (-180, +180]. Working on
//! g instead of the raw difference makes 359.9° → 0.1° and a continuous
//! 359.9° → 360.1° indistinguishable.
//!
//! Samples are classified as below, on (within `touch_tolerance_deg`) or above
//! the target:
//! - a change of side between samples is one crossing, so a retrograde loop
//!   over the target yields three events (forward, back, forward again);
//! - a local minimum of |g| between same-side samples is searched with
//!   golden-section; ending on the target it is one touch, ending past it it
//!   is the two crossings the scan stepped over;
//! - an on-target sample between same-side neighbours is the same touch, an
//!   on-target sample at either end of the window is a crossing at that end.
//!
//! Passes that begin and end inside the first or last sampling step are not
//! seen.

use pct_ephem::{normalize_360, normalize_pm180};
use tracing::debug;

use crate::crossing_types::{
    CrossingConfig, CrossingDirection, CrossingEvent, CrossingFilter, SearchDirection,
};
use crate::error::SearchError;
use crate::search_util::{bisect_zero, check_scan, golden_min, side};

/// Largest jump of g between two samples that still counts as a crossing.
/// Larger jumps are g wrapping from +180 to -180 on the far side of the circle.
const MAX_GENUINE_JUMP_DEG: f64 = 180.0;

/// Wrapped deviation of a longitude from the target.
pub(crate) fn deviation(lon_deg: f64, target_deg: f64) -> f64 {
    normalize_pm180(lon_deg - target_deg)
}

/// Whether g changes side between two samples through zero, not through ±180.
pub(crate) fn is_genuine_crossing(g_a: f64, g_b: f64) -> bool {
    side(g_a) != side(g_b) && (g_a - g_b).abs() < MAX_GENUINE_JUMP_DEG
}

fn validate_target(target_deg: f64) -> Result<(), SearchError> {
    if !target_deg.is_finite() || !(0.0..360.0).contains(&target_deg) {
        return Err(SearchError::InvalidConfig("target angle must be in [0, 360)"));
    }
    Ok(())
}

/// Refine a bracketed crossing. `t_a < t_b` is not required.
fn refine<F>(
    lon_at: &F,
    target_deg: f64,
    t_a: f64,
    g_a: f64,
    t_b: f64,
    g_b: f64,
    config: &CrossingConfig,
) -> Result<CrossingEvent, SearchError>
where
    F: Fn(f64) -> Result<f64, SearchError>,
{
    let g_at = |t: f64| -> Result<f64, SearchError> { Ok(deviation(lon_at(t)?, target_deg)) };
    let jd = bisect_zero(
        t_a,
        g_a,
        t_b,
        config.max_iterations,
        config.max_time_error_days,
        &g_at,
    )?;

    // g rising in time means the longitude is increasing.
    let rising = if t_a < t_b { g_b > g_a } else { g_a > g_b };
    let direction = if rising {
        CrossingDirection::Direct
    } else {
        CrossingDirection::Retrograde
    };

    Ok(CrossingEvent {
        jd,
        longitude_deg: normalize_360(lon_at(jd)?),
        direction,
    })
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    t: f64,
    g: f64,
}

/// First on-target sample of a run, and the off-target sample scanned just before it.
#[derive(Debug, Clone, Copy)]
struct OnTargetRun {
    before: Option<Sample>,
    first: Sample,
}

/// Streaming classifier over coarse samples, in scan order.
struct Scan<'a, F> {
    lon_at: &'a F,
    target_deg: f64,
    config: &'a CrossingConfig,
    forward: bool,
    /// Report a crossing when the very first sample is on the target.
    include_start: bool,
    /// The last two consecutive off-target samples, oldest first.
    recent: [Option<Sample>; 2],
    run: Option<OnTargetRun>,
    /// Events in scan order.
    events: Vec<CrossingEvent>,
}

impl<'a, F> Scan<'a, F>
where
    F: Fn(f64) -> Result<f64, SearchError>,
{
    fn new(
        lon_at: &'a F,
        target_deg: f64,
        config: &'a CrossingConfig,
        forward: bool,
        include_start: bool,
    ) -> Self {
        Self {
            lon_at,
            target_deg,
            config,
            forward,
            include_start,
            recent: [None, None],
            run: None,
            events: Vec::new(),
        }
    }

    fn on_target(&self, g: f64) -> bool {
        g.abs() <= self.config.touch_tolerance_deg
    }

    fn sample(&mut self, t: f64) -> Result<(), SearchError> {
        let s = Sample {
            t,
            g: deviation((self.lon_at)(t)?, self.target_deg),
        };

        if self.on_target(s.g) {
            if self.run.is_none() {
                self.run = Some(OnTargetRun {
                    before: self.recent[1],
                    first: s,
                });
            }
            self.recent = [None, None];
            return Ok(());
        }

        if let Some(run) = self.run.take() {
            self.close_run(run, Some(s))?;
            self.recent = [None, Some(s)];
            return Ok(());
        }

        if let Some(prev) = self.recent[1] {
            if is_genuine_crossing(prev.g, s.g) {
                debug!(t_prev = prev.t, t_curr = s.t, target_deg = self.target_deg, "crossing bracketed");
                let event = refine(
                    self.lon_at,
                    self.target_deg,
                    prev.t,
                    prev.g,
                    s.t,
                    s.g,
                    self.config,
                )?;
                self.events.push(event);
            } else if let Some(before) = self.recent[0] {
                let same_side = side(before.g) == side(prev.g) && side(prev.g) == side(s.g);
                if same_side && prev.g.abs() < before.g.abs() && prev.g.abs() <= s.g.abs() {
                    self.turn(before, s)?;
                }
            }
        }
        self.recent = [self.recent[1], Some(s)];
        Ok(())
    }

    /// Close a pending on-target run at the end of the scan.
    fn finish(mut self) -> Result<Vec<CrossingEvent>, SearchError> {
        if let Some(run) = self.run.take() {
            self.close_run(run, None)?;
        }
        Ok(self.events)
    }

    fn close_run(&mut self, run: OnTargetRun, after: Option<Sample>) -> Result<(), SearchError> {
        match (run.before, after) {
            (Some(before), Some(after)) if side(before.g) != side(after.g) => {
                let event = refine(
                    self.lon_at,
                    self.target_deg,
                    before.t,
                    before.g,
                    after.t,
                    after.g,
                    self.config,
                )?;
                self.events.push(event);
            }
            (Some(before), Some(after)) => {
                if !self.turn(before, after)? {
                    self.push_at(run.first, CrossingDirection::Touch)?;
                }
            }
            (None, Some(after)) => {
                if self.include_start {
                    // Leaving the target toward `after`.
                    let direction = self.motion(side(after.g) == self.forward);
                    self.push_at(run.first, direction)?;
                }
            }
            (Some(before), None) => {
                // Arriving at the target from `before`.
                let direction = self.motion(side(before.g) != self.forward);
                self.push_at(run.first, direction)?;
            }
            (None, None) => {
                if self.include_start {
                    self.push_at(run.first, CrossingDirection::Touch)?;
                }
            }
        }
        Ok(())
    }

    fn motion(&self, increasing: bool) -> CrossingDirection {
        if increasing {
            CrossingDirection::Direct
        } else {
            CrossingDirection::Retrograde
        }
    }

    fn push_at(&mut self, s: Sample, direction: CrossingDirection) -> Result<(), SearchError> {
        self.events.push(CrossingEvent {
            jd: s.t,
            longitude_deg: normalize_360((self.lon_at)(s.t)?),
            direction,
        });
        Ok(())
    }

    /// Examine the turn of |g| between two same-side samples. Returns whether
    /// it produced any event.
    fn turn(&mut self, a: Sample, b: Sample) -> Result<bool, SearchError> {
        // h > 0 on the samples' side of the target, h < 0 past it.
        let sign = if side(a.g) { 1.0 } else { -1.0 };
        let (lon_at, target_deg) = (self.lon_at, self.target_deg);
        let h_at = |t: f64| -> Result<f64, SearchError> {
            Ok(sign * deviation(lon_at(t)?, target_deg))
        };
        let (t_min, h_min) = golden_min(
            a.t,
            b.t,
            self.config.max_iterations,
            self.config.max_time_error_days,
            &h_at,
        )?;
        let tolerance = self.config.touch_tolerance_deg;

        if h_min < -tolerance {
            debug!(t_min, h_min, target_deg, "double crossing inside one step");
            let g_min = sign * h_min;
            let first = refine(lon_at, target_deg, a.t, a.g, t_min, g_min, self.config)?;
            let second = refine(lon_at, target_deg, t_min, g_min, b.t, b.g, self.config)?;
            self.events.push(first);
            self.events.push(second);
            Ok(true)
        } else if h_min <= tolerance {
            debug!(t_min, h_min, target_deg, "touch");
            self.push_at(Sample { t: t_min, g: sign * h_min }, CrossingDirection::Touch)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Find every crossing of `target_deg` in `[jd_start, jd_end]`.
///
/// `lon_at` maps a Julian Date to a longitude in degrees; any real value is
/// accepted (it is normalized internally). Events are returned in time order.
pub fn find_crossings<F>(
    lon_at: F,
    jd_start: f64,
    jd_end: f64,
    target_deg: f64,
    config: &CrossingConfig,
) -> Result<Vec<CrossingEvent>, SearchError>
where
    F: Fn(f64) -> Result<f64, SearchError>,
{
    config.validate().map_err(SearchError::InvalidConfig)?;
    validate_target(target_deg)?;
    if !jd_start.is_finite() || !jd_end.is_finite() || jd_end <= jd_start {
        return Err(SearchError::InvalidConfig("jd_end must be after jd_start"));
    }
    check_scan(jd_start, jd_end, config.step_days)?;

    let mut scan = Scan::new(&lon_at, target_deg, config, true, true);
    let mut t = jd_start;
    scan.sample(t)?;
    while t < jd_end {
        t = (t + config.step_days).min(jd_end);
        scan.sample(t)?;
    }

    let mut events = scan.finish()?;
    events.retain(|e| e.jd >= jd_start && e.jd <= jd_end);
    events.sort_by(|a, b| a.jd.total_cmp(&b.jd));
    Ok(events)
}

/// Direction-aware crossings: `state_at` returns `(longitude, speed)`.
///
/// Direction is taken from the sign of the speed at the refined instant
/// (falling back to the bracket's slope when the speed is exactly zero),
/// then `filter` drops unwanted passes. Touches keep their direction and
/// only pass [`CrossingFilter::Any`].
pub fn find_crossings_with_speed<F>(
    state_at: F,
    jd_start: f64,
    jd_end: f64,
    target_deg: f64,
    filter: CrossingFilter,
    config: &CrossingConfig,
) -> Result<Vec<CrossingEvent>, SearchError>
where
    F: Fn(f64) -> Result<(f64, f64), SearchError>,
{
    let lon_at = |t: f64| -> Result<f64, SearchError> { Ok(state_at(t)?.0) };
    let mut events = Vec::new();
    for mut event in find_crossings(lon_at, jd_start, jd_end, target_deg, config)? {
        let (_, speed) = state_at(event.jd)?;
        apply_speed(&mut event, speed);
        if filter.accepts(event.direction) {
            events.push(event);
        }
    }
    Ok(events)
}

/// Overwrite the bracket-slope direction with the sign of the speed.
pub(crate) fn apply_speed(event: &mut CrossingEvent, speed_deg_per_day: f64) {
    if event.direction == CrossingDirection::Touch {
        return;
    }
    if speed_deg_per_day > 0.0 {
        event.direction = CrossingDirection::Direct;
    } else if speed_deg_per_day < 0.0 {
        event.direction = CrossingDirection::Retrograde;
    }
}

/// Find the first crossing after (or before) `jd_start`.
///
/// `jd_start` itself is never reported, so repeated calls walk through
/// successive events. Gives up after `config.max_scan_days` and returns `None`.
pub fn find_next_crossing<F>(
    lon_at: F,
    jd_start: f64,
    target_deg: f64,
    direction: SearchDirection,
    config: &CrossingConfig,
) -> Result<Option<CrossingEvent>, SearchError>
where
    F: Fn(f64) -> Result<f64, SearchError>,
{
    config.validate().map_err(SearchError::InvalidConfig)?;
    validate_target(target_deg)?;
    if !jd_start.is_finite() {
        return Err(SearchError::InvalidConfig("jd_start must be finite"));
    }

    let step = direction.sign() * config.step_days;
    check_scan(jd_start, jd_start + direction.sign() * config.max_scan_days, config.step_days)?;
    let max_steps = (config.max_scan_days / config.step_days).ceil() as usize;
    let forward = direction == SearchDirection::Forward;

    let mut scan = Scan::new(&lon_at, target_deg, config, forward, false);
    let mut t = jd_start;
    scan.sample(t)?;

    for _ in 0..max_steps {
        t += step;
        scan.sample(t)?;
        if let Some(first) = scan.events.first() {
            return Ok(Some(*first));
        }
    }

    Ok(scan.finish()?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(v: f64) -> Result<f64, SearchError> {
        Ok(v)
    }

    #[test]
    fn genuine_crossing_positive() {
        assert!(is_genuine_crossing(-3.0, 5.0));
        assert!(is_genuine_crossing(10.0, -10.0));
    }

    #[test]
    fn wraparound_rejected() {
        // +170 to -170 is a 340° jump: the far side of the circle, not the target
        assert!(!is_genuine_crossing(170.0, -170.0));
        assert!(!is_genuine_crossing(-170.0, 170.0));
    }

    #[test]
    fn zero_counts_as_positive_side() {
        assert!(is_genuine_crossing(-1.0, 0.0));
        assert!(!is_genuine_crossing(0.0, 1.0));
    }

    #[test]
    fn deviation_wraps() {
        assert!((deviation(359.0, 1.0) - (-2.0)).abs() < 1e-12);
        assert!((deviation(1.0, 359.0) - 2.0).abs() < 1e-12);
        assert!((deviation(721.0, 0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_linear_crossing() {
        let events =
            find_crossings(|t| ok(100.0 + 2.0 * t), 0.0, 30.0, 130.0, &CrossingConfig::new(1.0, 1e-7))
                .unwrap();
        assert_eq!(events.len(), 1);
        assert!((events[0].jd - 15.0).abs() < 1e-7);
        assert_eq!(events[0].direction, CrossingDirection::Direct);
        assert!((events[0].longitude_deg - 130.0).abs() < 1e-5);
    }

    #[test]
    fn decreasing_crossing_is_retrograde() {
        let events =
            find_crossings(|t| ok(200.0 - t), 0.0, 50.0, 170.5, &CrossingConfig::new(1.0, 1e-6))
                .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, CrossingDirection::Retrograde);
        assert!((events[0].jd - 29.5).abs() < 1e-6);
    }

    #[test]
    fn step_not_dividing_window() {
        // last sample is clamped to jd_end
        let events =
            find_crossings(|t| ok(t), 0.0, 10.3, 10.2, &CrossingConfig::new(3.0, 1e-8)).unwrap();
        assert_eq!(events.len(), 1);
        assert!((events[0].jd - 10.2).abs() < 1e-8);
    }

    #[test]
    fn antipode_is_not_a_crossing() {
        // Passes through 190°, the far side of a 10° target.
        let events =
            find_crossings(|t| ok(180.0 + t), 0.0, 20.0, 10.0, &CrossingConfig::planet()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn multiple_revolutions() {
        // 36°/day for 25 days = 2.5 revolutions; 0° is crossed at t=10 and t=20.
        let events =
            find_crossings(|t| ok(36.0 * t), 0.5, 25.0, 0.0, &CrossingConfig::new(0.5, 1e-8))
                .unwrap();
        assert_eq!(events.len(), 2);
        assert!((events[0].jd - 10.0).abs() < 1e-8);
        assert!((events[1].jd - 20.0).abs() < 1e-8);
    }

    #[test]
    fn coarse_step_misses_loop_silently() {
        // Out to 11 and back to 9 between samples at t=0 and t=4: no side change seen.
        let lon = |t: f64| ok(if t <= 2.0 { 9.0 + t } else { 13.0 - t });
        let events = find_crossings(lon, 0.0, 4.0, 10.0, &CrossingConfig::new(4.0, 1e-6)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn rejects_bad_arguments() {
        let c = CrossingConfig::planet();
        assert!(find_crossings(|t| ok(t), 0.0, 10.0, 360.0, &c).is_err());
        assert!(find_crossings(|t| ok(t), 0.0, 10.0, -1.0, &c).is_err());
        assert!(find_crossings(|t| ok(t), 10.0, 10.0, 5.0, &c).is_err());
    }

    #[test]
    fn speed_decides_direction_and_filter() {
        let state = |t: f64| -> Result<(f64, f64), SearchError> {
            Ok(if t <= 10.0 { (100.0 + t, 1.0) } else { (120.0 - t, -1.0) })
        };
        let c = CrossingConfig::new(1.0, 1e-7);
        let all = find_crossings_with_speed(state, 0.0, 20.0, 105.5, CrossingFilter::Any, &c)
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].direction, CrossingDirection::Direct);
        assert_eq!(all[1].direction, CrossingDirection::Retrograde);

        let retro =
            find_crossings_with_speed(state, 0.0, 20.0, 105.5, CrossingFilter::RetrogradeOnly, &c)
                .unwrap();
        assert_eq!(retro.len(), 1);
        assert!((retro[0].jd - 14.5).abs() < 1e-7);
    }

    #[test]
    fn next_and_previous() {
        let c = CrossingConfig::new(1.0, 1e-8);
        let next = find_next_crossing(|t| ok(10.0 * t), 0.5, 90.0, SearchDirection::Forward, &c)
            .unwrap()
            .unwrap();
        assert!((next.jd - 9.0).abs() < 1e-8);

        let prev = find_next_crossing(|t| ok(10.0 * t), 0.5, 90.0, SearchDirection::Backward, &c)
            .unwrap()
            .unwrap();
        assert!((prev.jd - (-27.0)).abs() < 1e-8);
        assert_eq!(prev.direction, CrossingDirection::Direct);
    }

    #[test]
    fn next_gives_up_after_scan_limit() {
        let mut c = CrossingConfig::new(1.0, 1e-8);
        c.max_scan_days = 5.0;
        let none = find_next_crossing(|_| ok(42.0), 0.0, 90.0, SearchDirection::Forward, &c).unwrap();
        assert!(none.is_none());
    }

    // Rises to exactly 100° at t = 5 and falls back.
    fn tangent(t: f64) -> Result<f64, SearchError> {
        ok(100.0 - 0.1 * (t - 5.0) * (t - 5.0))
    }

    #[test]
    fn touch_between_samples_is_one_event() {
        let events = find_crossings(tangent, 0.0, 10.0, 100.0, &CrossingConfig::new(0.3, 1e-7))
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, CrossingDirection::Touch);
        assert!((events[0].jd - 5.0).abs() < 1e-6);
    }

    #[test]
    fn touch_on_a_sample_is_one_event() {
        // t = 5 is a sample; g is exactly zero there.
        let events = find_crossings(tangent, 0.0, 10.0, 100.0, &CrossingConfig::new(1.0, 1e-7))
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, CrossingDirection::Touch);
        assert!((events[0].jd - 5.0).abs() < 1e-6);
    }

    #[test]
    fn dip_past_target_inside_one_step_gives_both_crossings() {
        // Peaks at 100.5° at t = 5; the roots are 5 ± √5, both between the samples 2.5 and 7.5.
        let lon = |t: f64| ok(100.5 - 0.1 * (t - 5.0) * (t - 5.0));
        let events =
            find_crossings(lon, -2.5, 12.5, 100.0, &CrossingConfig::new(5.0, 1e-8)).unwrap();
        assert_eq!(events.len(), 2);
        let r = 5.0_f64.sqrt();
        assert!((events[0].jd - (5.0 - r)).abs() < 1e-7);
        assert!((events[1].jd - (5.0 + r)).abs() < 1e-7);
        assert_eq!(events[0].direction, CrossingDirection::Direct);
        assert_eq!(events[1].direction, CrossingDirection::Retrograde);
    }

    #[test]
    fn turn_short_of_target_is_silent() {
        let lon = |t: f64| ok(99.0 - 0.1 * (t - 5.0) * (t - 5.0));
        let events =
            find_crossings(lon, 0.0, 10.0, 100.0, &CrossingConfig::new(0.3, 1e-7)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn crossing_on_window_edges() {
        let c = CrossingConfig::new(1.0, 1e-8);
        let start = find_crossings(|t| ok(50.0 + t), 0.0, 10.0, 50.0, &c).unwrap();
        assert_eq!(start.len(), 1);
        assert_eq!(start[0].jd, 0.0);
        assert_eq!(start[0].direction, CrossingDirection::Direct);

        let start = find_crossings(|t| ok(50.0 - t), 0.0, 10.0, 50.0, &c).unwrap();
        assert_eq!(start.len(), 1);
        assert_eq!(start[0].direction, CrossingDirection::Retrograde);

        let end = find_crossings(|t| ok(40.0 + t), 0.0, 10.0, 50.0, &c).unwrap();
        assert_eq!(end.len(), 1);
        assert_eq!(end[0].jd, 10.0);
        assert_eq!(end[0].direction, CrossingDirection::Direct);

        let end = find_crossings(|t| ok(60.0 - t), 0.0, 10.0, 50.0, &c).unwrap();
        assert_eq!(end.len(), 1);
        assert_eq!(end[0].direction, CrossingDirection::Retrograde);
    }

    #[test]
    fn next_skips_a_start_on_target() {
        let c = CrossingConfig::new(1.0, 1e-8);
        let next = find_next_crossing(|t| ok(36.0 * t), 0.0, 0.0, SearchDirection::Forward, &c)
            .unwrap()
            .unwrap();
        assert!((next.jd - 10.0).abs() < 1e-8);
    }

    #[test]
    fn next_finds_touch_and_speed_keeps_it() {
        let c = CrossingConfig::new(0.3, 1e-7);
        let next = find_next_crossing(tangent, 0.0, 100.0, SearchDirection::Forward, &c)
            .unwrap()
            .unwrap();
        assert_eq!(next.direction, CrossingDirection::Touch);

        let mut event = next;
        apply_speed(&mut event, -0.5);
        assert_eq!(event.direction, CrossingDirection::Touch);
    }

    #[test]
    fn unresolvable_step_is_rejected() {
        let c = CrossingConfig::new(1e-12, 1e-13);
        let r = find_crossings(|t| ok(t), 2_451_545.0, 2_451_546.0, 10.0, &c);
        assert!(matches!(r, Err(SearchError::InvalidConfig(_))));
        let r = find_next_crossing(|t| ok(t), 2_451_545.0, 10.0, SearchDirection::Forward, &c);
        assert!(matches!(r, Err(SearchError::InvalidConfig(_))));
    }

    #[test]
    fn tolerance_out_of_reach_is_error() {
        // Bisection from a one-day bracket cannot get under 1e-9 days in 5 halvings.
        let mut c = CrossingConfig::new(1.0, 1e-9);
        c.max_iterations = 5;
        let r = find_crossings(|t| ok(t), 0.0, 20.0, 10.5, &c);
        assert!(matches!(r, Err(SearchError::NoConvergence { .. })));
    }
}
