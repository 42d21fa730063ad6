//! Longitudes and pairwise longitude differences at each reference instant.

use std::io::Write;
use std::path::PathBuf;

use csv::Writer;
use pct_ephem::{Ephemeris, normalize_360};
use pct_search::Track;
use pct_time::{Tz, parse_timezone};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ephemeris_sheet::default_timezone;
use crate::error::SheetError;
use crate::input::{Reference, ReferenceSource, load_references};
use crate::output::{angle, create_csv, finish, reference_cells};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferencesConfig {
    pub references: ReferenceSource,
    pub tracks: Vec<Track>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceRow {
    pub reference: Reference,
    /// One longitude per track.
    pub longitudes: Vec<f64>,
    /// `(lon_a - lon_b) mod 360` for every pair `a < b`, in [`track_pairs`] order.
    pub differences: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Differences {
    pub tracks: Vec<Track>,
    pub rows: Vec<DifferenceRow>,
}

/// Index pairs `(a, b)` with `a < b`, row-major.
pub fn track_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |a| (a + 1..n).map(move |b| (a, b)))
}

pub fn compute_differences<E>(
    eph: &E,
    references: &[Reference],
    tracks: &[Track],
) -> Result<Differences, SheetError>
where
    E: Ephemeris + ?Sized,
{
    if tracks.len() < 2 {
        return Err(SheetError::InvalidConfig("differences need at least two tracks"));
    }

    let mut rows = Vec::with_capacity(references.len());
    for r in references {
        let jd = r.jd();
        let longitudes = tracks
            .iter()
            .map(|t| eph.longitude(&t.query(jd)))
            .collect::<Result<Vec<_>, _>>()?;
        let differences = track_pairs(tracks.len())
            .map(|(a, b)| normalize_360(longitudes[a] - longitudes[b]))
            .collect();
        rows.push(DifferenceRow {
            reference: *r,
            longitudes,
            differences,
        });
    }
    Ok(Differences {
        tracks: tracks.to_vec(),
        rows,
    })
}

/// Columns: `timestamp, kind, price`, one `<label>` per track, one `<a>-<b>` per pair.
pub fn write_differences<W: Write>(
    wtr: &mut Writer<W>,
    table: &Differences,
    tz: Tz,
) -> Result<(), SheetError> {
    let labels: Vec<String> = table.tracks.iter().map(Track::label).collect();
    let mut header: Vec<String> = ["timestamp", "kind", "price"].map(String::from).to_vec();
    header.extend(labels.iter().cloned());
    header.extend(track_pairs(labels.len()).map(|(a, b)| format!("{}-{}", labels[a], labels[b])));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = reference_cells(&row.reference, tz).to_vec();
        record.extend(row.longitudes.iter().map(|&v| angle(v)));
        record.extend(row.differences.iter().map(|&v| angle(v)));
        wtr.write_record(&record)?;
    }
    Ok(())
}

pub fn run_differences<E>(eph: &E, config: &DifferencesConfig) -> Result<usize, SheetError>
where
    E: Ephemeris + ?Sized,
{
    let tz = parse_timezone(&config.timezone)?;
    let references = load_references(&config.references, tz)?;
    let table = compute_differences(eph, &references, &config.tracks)?;

    let mut wtr = create_csv(&config.output)?;
    write_differences(&mut wtr, &table, tz)?;
    finish(wtr)?;
    info!(output = %config.output.display(), rows = table.rows.len(), "differences written");
    Ok(table.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pct_ephem::{Body, KeplerEphemeris};

    #[test]
    fn pairs_are_upper_triangle() {
        let pairs: Vec<_> = track_pairs(3).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(track_pairs(1).count(), 0);
    }

    #[test]
    fn south_node_difference_is_180() {
        let eph = KeplerEphemeris::new();
        let r = Reference {
            timestamp: Utc.with_ymd_and_hms(2010, 6, 1, 0, 0, 0).unwrap(),
            kind: None,
            price: None,
        };
        let table = compute_differences(
            &eph,
            &[r],
            &[
                Track::geocentric(Body::MeanNorthNode),
                Track::geocentric(Body::MeanSouthNode),
            ],
        )
        .unwrap();
        assert!((table.rows[0].differences[0] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn one_track_rejected() {
        let eph = KeplerEphemeris::new();
        assert!(compute_differences(&eph, &[], &[Track::geocentric(Body::Sun)]).is_err());
    }
}
