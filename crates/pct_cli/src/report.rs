//! Event tables printed by the search subcommands.

use std::io::Write;
use std::path::Path;

use csv::Writer;
use pct_ephem::{EclipticPosition, LongitudeState};
use pct_search::{CrossingEvent, SeparationEvent, StationaryEvent, Track};
use pct_sheets::create_csv;
use pct_time::{Tz, format_timestamp, jd_to_datetime};
use tracing::info;

use crate::error::CliError;

pub const POSITION_HEADER: [&str; 7] = [
    "track",
    "longitude",
    "latitude",
    "distance_au",
    "speed",
    "retrograde",
    "frame",
];
pub const CROSSING_HEADER: [&str; 5] = ["timestamp", "jd", "track", "longitude", "direction"];
pub const SEPARATION_HEADER: [&str; 7] = [
    "timestamp",
    "jd",
    "track1",
    "track2",
    "longitude1",
    "longitude2",
    "separation",
];
pub const STATION_HEADER: [&str; 6] = ["timestamp", "jd", "body", "station", "longitude", "latitude"];

fn time(jd: f64, tz: Tz) -> Result<String, CliError> {
    Ok(format_timestamp(&jd_to_datetime(jd)?, tz))
}

pub fn position_row(track: &Track, pos: &EclipticPosition, state: &LongitudeState) -> Vec<String> {
    vec![
        track.label(),
        format!("{:.6}", pos.lon_deg),
        format!("{:.6}", pos.lat_deg),
        format!("{:.8}", pos.distance_au),
        format!("{:.6}", state.speed_deg_per_day),
        if state.is_retrograde() { "R" } else { "" }.to_string(),
        format!("{:?}", track.frame),
    ]
}

pub fn crossing_row(track: &Track, e: &CrossingEvent, tz: Tz) -> Result<Vec<String>, CliError> {
    Ok(vec![
        time(e.jd, tz)?,
        format!("{:.6}", e.jd),
        track.label(),
        format!("{:.6}", e.longitude_deg),
        e.direction.as_str().to_string(),
    ])
}

pub fn separation_row(
    t1: &Track,
    t2: &Track,
    e: &SeparationEvent,
    tz: Tz,
) -> Result<Vec<String>, CliError> {
    Ok(vec![
        time(e.jd, tz)?,
        format!("{:.6}", e.jd),
        t1.label(),
        t2.label(),
        format!("{:.6}", e.body1_longitude_deg),
        format!("{:.6}", e.body2_longitude_deg),
        format!("{:.6}", e.actual_separation_deg),
    ])
}

pub fn station_row(e: &StationaryEvent, tz: Tz) -> Result<Vec<String>, CliError> {
    Ok(vec![
        time(e.jd, tz)?,
        format!("{:.6}", e.jd),
        e.body.name().to_string(),
        e.station_type.as_str().to_string(),
        format!("{:.6}", e.longitude_deg),
        format!("{:.6}", e.latitude_deg),
    ])
}

fn write_all<W: Write>(
    mut wtr: Writer<W>,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<(), CliError> {
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table as CSV to `output`, or to stdout when no file is given.
pub fn emit(output: Option<&Path>, header: &[&str], rows: Vec<Vec<String>>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            write_all(create_csv(path)?, header, &rows)?;
            info!(output = %path.display(), rows = rows.len(), "table written");
        }
        None => write_all(Writer::from_writer(std::io::stdout().lock()), header, &rows)?,
    }
    Ok(())
}
