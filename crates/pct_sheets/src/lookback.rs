//! Lookback multiples: the instant a body was N cycles of travel ago.

use std::io::Write;
use std::path::PathBuf;

use csv::Writer;
use pct_ephem::Ephemeris;
use pct_search::{SearchDirection, Track, TravelConfig, TravelEvent, find_travel};
use pct_time::{Tz, parse_timezone};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ephemeris_sheet::default_timezone;
use crate::error::SheetError;
use crate::input::{Reference, ReferenceSource, load_references};
use crate::output::{angle, create_csv, days, finish, reference_cells, time_cell};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookbackConfig {
    pub references: ReferenceSource,
    pub tracks: Vec<Track>,
    /// Cycle counts; each becomes `multiple × 360°` of travel.
    #[serde(default = "default_multiples")]
    pub multiples: Vec<f64>,
    /// `backward` looks back from each reference, `forward` projects ahead.
    #[serde(default = "default_direction")]
    pub direction: SearchDirection,
    #[serde(default)]
    pub travel: TravelConfig,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub output: PathBuf,
}

fn default_multiples() -> Vec<f64> {
    vec![1.0]
}

fn default_direction() -> SearchDirection {
    SearchDirection::Backward
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookbackRow {
    pub reference: Reference,
    pub track: Track,
    pub multiple: f64,
    pub reference_longitude_deg: f64,
    /// `None` when the scan limit ran out first.
    pub event: Option<TravelEvent>,
}

pub fn compute_lookback<E>(
    eph: &E,
    references: &[Reference],
    tracks: &[Track],
    multiples: &[f64],
    direction: SearchDirection,
    config: &TravelConfig,
) -> Result<Vec<LookbackRow>, SheetError>
where
    E: Ephemeris + ?Sized,
{
    if multiples.is_empty() {
        return Err(SheetError::InvalidConfig("at least one multiple is required"));
    }

    let mut rows = Vec::new();
    for r in references {
        let jd = r.jd();
        for track in tracks {
            let reference_longitude_deg = eph.longitude(&track.query(jd))?;
            for &multiple in multiples {
                let event = find_travel(eph, track, jd, multiple * 360.0, direction, config)?;
                if event.is_none() {
                    warn!(track = %track.label(), reference = jd, multiple, "travel not reached within scan limit");
                }
                rows.push(LookbackRow {
                    reference: *r,
                    track: *track,
                    multiple,
                    reference_longitude_deg,
                    event,
                });
            }
        }
    }
    Ok(rows)
}

const HEADER: [&str; 10] = [
    "timestamp",
    "kind",
    "price",
    "track",
    "multiple",
    "reference_lon",
    "event_timestamp",
    "event_lon",
    "travelled",
    "days",
];

pub fn write_lookback<W: Write>(
    wtr: &mut Writer<W>,
    rows: &[LookbackRow],
    tz: Tz,
) -> Result<(), SheetError> {
    wtr.write_record(HEADER)?;
    for row in rows {
        let mut record = reference_cells(&row.reference, tz).to_vec();
        record.push(row.track.label());
        record.push(row.multiple.to_string());
        record.push(angle(row.reference_longitude_deg));
        match &row.event {
            Some(e) => record.extend([
                time_cell(e.jd, tz)?,
                angle(e.longitude_deg),
                angle(e.travelled_deg),
                days(e.jd - row.reference.jd()),
            ]),
            None => record.extend(std::iter::repeat_n(String::new(), 4)),
        }
        wtr.write_record(&record)?;
    }
    Ok(())
}

pub fn run_lookback<E>(eph: &E, config: &LookbackConfig) -> Result<usize, SheetError>
where
    E: Ephemeris + ?Sized,
{
    let tz = parse_timezone(&config.timezone)?;
    let references = load_references(&config.references, tz)?;
    let rows = compute_lookback(
        eph,
        &references,
        &config.tracks,
        &config.multiples,
        config.direction,
        &config.travel,
    )?;

    let mut wtr = create_csv(&config.output)?;
    write_lookback(&mut wtr, &rows, tz)?;
    finish(wtr)?;
    info!(output = %config.output.display(), rows = rows.len(), "lookback written");
    Ok(rows.len())
}
