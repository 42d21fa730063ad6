//! Fixed-step ephemeris table: one row per instant, three columns per track.

use std::io::Write;
use std::path::PathBuf;

use csv::Writer;
use pct_ephem::Ephemeris;
use pct_search::Track;
use pct_time::{Tz, parse_timezone};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SheetError;
use crate::input::TimeWindow;
use crate::output::{angle, create_csv, finish, jd_cell, time_cell};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSheetConfig {
    pub window: TimeWindow,
    /// Row spacing in days.
    #[serde(default = "default_interval")]
    pub interval_days: f64,
    pub tracks: Vec<Track>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub output: PathBuf,
}

pub(crate) fn default_interval() -> f64 {
    1.0
}

pub(crate) fn default_timezone() -> String {
    "UTC".to_string()
}

/// Longitude, speed and retrograde flag of one track at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackCell {
    pub longitude_deg: f64,
    pub speed_deg_per_day: f64,
    pub retrograde: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRow {
    pub jd: f64,
    pub cells: Vec<TrackCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSheet {
    pub tracks: Vec<Track>,
    pub rows: Vec<EphemerisRow>,
}

/// Sample every track from `jd_start` to `jd_end` inclusive, `interval_days` apart.
pub fn compute_ephemeris_sheet<E>(
    eph: &E,
    tracks: &[Track],
    jd_start: f64,
    jd_end: f64,
    interval_days: f64,
) -> Result<EphemerisSheet, SheetError>
where
    E: Ephemeris + ?Sized,
{
    if !interval_days.is_finite() || interval_days <= 0.0 {
        return Err(SheetError::InvalidConfig("interval_days must be positive"));
    }
    if tracks.is_empty() {
        return Err(SheetError::InvalidConfig("at least one track is required"));
    }
    if jd_end < jd_start {
        return Err(SheetError::InvalidConfig("window end must not precede start"));
    }

    let count = ((jd_end - jd_start) / interval_days).floor() as usize + 1;
    let mut rows = Vec::with_capacity(count);
    for i in 0..count {
        // Multiply rather than accumulate so long tables do not drift.
        let jd = jd_start + i as f64 * interval_days;
        let cells = tracks
            .iter()
            .map(|t| {
                let state = eph.longitude_state(&t.query(jd))?;
                Ok(TrackCell {
                    longitude_deg: state.lon_deg,
                    speed_deg_per_day: state.speed_deg_per_day,
                    retrograde: state.is_retrograde(),
                })
            })
            .collect::<Result<Vec<_>, SheetError>>()?;
        rows.push(EphemerisRow { jd, cells });
    }
    Ok(EphemerisSheet {
        tracks: tracks.to_vec(),
        rows,
    })
}

/// Columns: `timestamp, jd`, then `<label>_lon, <label>_speed, <label>_retro` per track.
pub fn write_ephemeris_sheet<W: Write>(
    wtr: &mut Writer<W>,
    sheet: &EphemerisSheet,
    tz: Tz,
) -> Result<(), SheetError> {
    let mut header = vec!["timestamp".to_string(), "jd".to_string()];
    for t in &sheet.tracks {
        let label = t.label();
        header.push(format!("{label}_lon"));
        header.push(format!("{label}_speed"));
        header.push(format!("{label}_retro"));
    }
    wtr.write_record(&header)?;

    for row in &sheet.rows {
        let mut record = vec![time_cell(row.jd, tz)?, jd_cell(row.jd)];
        for c in &row.cells {
            record.push(angle(c.longitude_deg));
            record.push(angle(c.speed_deg_per_day));
            record.push(if c.retrograde { "R" } else { "" }.to_string());
        }
        wtr.write_record(&record)?;
    }
    Ok(())
}

/// Resolve the config, compute the sheet and write it. Returns the row count.
pub fn run_ephemeris_sheet<E>(eph: &E, config: &EphemerisSheetConfig) -> Result<usize, SheetError>
where
    E: Ephemeris + ?Sized,
{
    let tz = parse_timezone(&config.timezone)?;
    let (jd_start, jd_end) = config.window.resolve(tz)?;
    let sheet = compute_ephemeris_sheet(eph, &config.tracks, jd_start, jd_end, config.interval_days)?;

    let mut wtr = create_csv(&config.output)?;
    write_ephemeris_sheet(&mut wtr, &sheet, tz)?;
    finish(wtr)?;
    info!(output = %config.output.display(), rows = sheet.rows.len(), "ephemeris sheet written");
    Ok(sheet.rows.len())
}
