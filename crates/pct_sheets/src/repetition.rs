//! Cycle repetition: when does a body come back to where it was at a swing?
//!
//! For each reference and track, the body's longitude at the reference is the
//! anchor. Every crossing of `anchor + k × increment_deg` within the horizon is
//! a projected instant, and each is matched against the nearest reference of
//! any kind to show whether the cycle lined up with another turn.

use std::io::Write;
use std::path::PathBuf;

use csv::Writer;
use pct_ephem::{Ephemeris, normalize_360};
use pct_search::{CrossingConfig, CrossingDirection, CrossingFilter, Track, body_crossings};
use pct_time::{Tz, parse_timezone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ephemeris_sheet::default_timezone;
use crate::error::SheetError;
use crate::input::{Reference, ReferenceSource, load_references};
use crate::output::{angle, create_csv, days, finish, reference_cells, time_cell};

/// Crossings this close to their own anchor are the anchor itself.
const SELF_MATCH_DAYS: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepetitionConfig {
    pub references: ReferenceSource,
    pub tracks: Vec<Track>,
    /// Degree step between projected levels; 360 means full returns only.
    #[serde(default = "default_increment")]
    pub increment_deg: f64,
    /// How far past each reference to project, in days.
    #[serde(default = "default_horizon")]
    pub horizon_days: f64,
    #[serde(default)]
    pub filter: CrossingFilter,
    /// Sampling override; by default chosen per body.
    #[serde(default)]
    pub crossing: Option<CrossingConfig>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub output: PathBuf,
}

fn default_increment() -> f64 {
    360.0
}

fn default_horizon() -> f64 {
    365.25
}

/// Settings for [`compute_repetition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepetitionParams {
    pub increment_deg: f64,
    pub horizon_days: f64,
    pub filter: CrossingFilter,
    pub crossing: Option<CrossingConfig>,
}

impl RepetitionParams {
    fn validate(&self) -> Result<(), &'static str> {
        if !self.increment_deg.is_finite() || self.increment_deg <= 0.0 || self.increment_deg > 360.0
        {
            return Err("increment_deg must be in (0, 360]");
        }
        if !self.horizon_days.is_finite() || self.horizon_days <= 0.0 {
            return Err("horizon_days must be positive");
        }
        Ok(())
    }

    /// Offsets `k × increment` below 360.
    fn offsets(&self) -> Vec<f64> {
        let n = (360.0 / self.increment_deg - 1e-9).ceil().max(1.0) as usize;
        (0..n).map(|k| k as f64 * self.increment_deg).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepetitionRow {
    pub anchor: Reference,
    pub track: Track,
    pub anchor_longitude_deg: f64,
    pub offset_deg: f64,
    pub target_deg: f64,
    pub jd: f64,
    pub direction: CrossingDirection,
    /// Reference closest in time to the projected instant.
    pub nearest: Option<Reference>,
    /// Projected instant minus the nearest reference, days.
    pub days_from_nearest: Option<f64>,
}

/// Index of the reference closest to `jd`. `references` must be time-ordered.
fn nearest_reference(references: &[Reference], jd: f64) -> Option<&Reference> {
    let idx = references.partition_point(|r| r.jd() < jd);
    let after = references.get(idx);
    let before = idx.checked_sub(1).and_then(|i| references.get(i));
    match (before, after) {
        (Some(b), Some(a)) => Some(if jd - b.jd() <= a.jd() - jd { b } else { a }),
        (b, a) => b.or(a),
    }
}

pub fn compute_repetition<E>(
    eph: &E,
    references: &[Reference],
    tracks: &[Track],
    params: &RepetitionParams,
) -> Result<Vec<RepetitionRow>, SheetError>
where
    E: Ephemeris + ?Sized,
{
    params.validate().map_err(SheetError::InvalidConfig)?;
    let offsets = params.offsets();

    let mut rows = Vec::new();
    for anchor in references {
        let jd0 = anchor.jd();
        for track in tracks {
            let crossing = params
                .crossing
                .unwrap_or_else(|| CrossingConfig::for_body(track.body));
            let lon0 = eph.longitude(&track.query(jd0))?;

            let mut found = Vec::new();
            for &offset in &offsets {
                let target = normalize_360(lon0 + offset);
                for event in body_crossings(
                    eph,
                    track,
                    target,
                    jd0,
                    jd0 + params.horizon_days,
                    params.filter,
                    &crossing,
                )? {
                    if event.jd - jd0 < SELF_MATCH_DAYS {
                        continue;
                    }
                    let nearest = nearest_reference(references, event.jd).copied();
                    found.push(RepetitionRow {
                        anchor: *anchor,
                        track: *track,
                        anchor_longitude_deg: lon0,
                        offset_deg: offset,
                        target_deg: target,
                        jd: event.jd,
                        direction: event.direction,
                        days_from_nearest: nearest.map(|n| event.jd - n.jd()),
                        nearest,
                    });
                }
            }
            found.sort_by(|a, b| a.jd.total_cmp(&b.jd));
            debug!(track = %track.label(), anchor = jd0, hits = found.len(), "projected");
            rows.extend(found);
        }
    }
    Ok(rows)
}

const HEADER: [&str; 14] = [
    "anchor_timestamp",
    "anchor_kind",
    "anchor_price",
    "track",
    "anchor_lon",
    "offset",
    "target_lon",
    "timestamp",
    "direction",
    "days_after_anchor",
    "nearest_timestamp",
    "nearest_kind",
    "nearest_price",
    "days_from_nearest",
];

pub fn write_repetition<W: Write>(
    wtr: &mut Writer<W>,
    rows: &[RepetitionRow],
    tz: Tz,
) -> Result<(), SheetError> {
    wtr.write_record(HEADER)?;
    for row in rows {
        let mut record = reference_cells(&row.anchor, tz).to_vec();
        record.extend([
            row.track.label(),
            angle(row.anchor_longitude_deg),
            angle(row.offset_deg),
            angle(row.target_deg),
            time_cell(row.jd, tz)?,
            row.direction.as_str().to_string(),
            days(row.jd - row.anchor.jd()),
        ]);
        match &row.nearest {
            Some(n) => record.extend(reference_cells(n, tz)),
            None => record.extend([String::new(), String::new(), String::new()]),
        }
        record.push(row.days_from_nearest.map(days).unwrap_or_default());
        wtr.write_record(&record)?;
    }
    Ok(())
}

pub fn run_repetition<E>(eph: &E, config: &RepetitionConfig) -> Result<usize, SheetError>
where
    E: Ephemeris + ?Sized,
{
    let tz = parse_timezone(&config.timezone)?;
    let references = load_references(&config.references, tz)?;
    let params = RepetitionParams {
        increment_deg: config.increment_deg,
        horizon_days: config.horizon_days,
        filter: config.filter,
        crossing: config.crossing,
    };
    let rows = compute_repetition(eph, &references, &config.tracks, &params)?;

    let mut wtr = create_csv(&config.output)?;
    write_repetition(&mut wtr, &rows, tz)?;
    finish(wtr)?;
    info!(output = %config.output.display(), rows = rows.len(), "repetition written");
    Ok(rows.len())
}
