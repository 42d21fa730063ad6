//! Ephemeris backed by a table of pre-computed positions.
//!
//! Lets positions exported from an external astronomical library drive the
//! searches. The CSV layout is
//! `jd_ut,body,perspective,longitude_deg[,latitude_deg][,distance_au]`
//! with a header row; rows may appear in any order.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::angle::{normalize_360, normalize_pm180};
use crate::body::{Body, Frame, Perspective, Query};
use crate::ephemeris::Ephemeris;
use crate::error::EphemError;
use crate::spherical::{EclipticPosition, LongitudeState};

#[derive(Debug, Deserialize)]
struct TableRow {
    jd_ut: f64,
    body: String,
    perspective: String,
    longitude_deg: f64,
    #[serde(default)]
    latitude_deg: Option<f64>,
    #[serde(default)]
    distance_au: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    jd_ut: f64,
    pos: EclipticPosition,
}

/// Linear interpolation over tabulated samples, one series per body/perspective.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEphemeris {
    frame: Frame,
    series: BTreeMap<(Body, Perspective), Vec<Sample>>,
}

impl TableEphemeris {
    /// Load a table from a CSV file. `frame` states what the longitudes are.
    pub fn load(path: &Path, frame: Frame) -> Result<Self, EphemError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, frame)
    }

    /// Parse a table from any CSV reader.
    pub fn from_reader<R: Read>(reader: R, frame: Frame) -> Result<Self, EphemError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut series: BTreeMap<(Body, Perspective), Vec<Sample>> = BTreeMap::new();

        for (line, row) in rdr.deserialize::<TableRow>().enumerate() {
            let row = row?;
            if !row.jd_ut.is_finite() || !row.longitude_deg.is_finite() {
                return Err(EphemError::Table(format!(
                    "row {}: non-finite value",
                    line + 2
                )));
            }
            let body: Body = row.body.parse()?;
            let perspective: Perspective = row.perspective.parse()?;
            series.entry((body, perspective)).or_default().push(Sample {
                jd_ut: row.jd_ut,
                pos: EclipticPosition {
                    lon_deg: normalize_360(row.longitude_deg),
                    lat_deg: row.latitude_deg.unwrap_or(0.0),
                    distance_au: row.distance_au.unwrap_or(0.0),
                },
            });
        }

        for samples in series.values_mut() {
            samples.sort_by(|a, b| a.jd_ut.total_cmp(&b.jd_ut));
            samples.dedup_by(|a, b| a.jd_ut == b.jd_ut);
        }

        Ok(Self { frame, series })
    }

    /// Frame the tabulated longitudes are expressed in.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Covered span `(first_jd, last_jd)` of one series.
    pub fn coverage(&self, body: Body, perspective: Perspective) -> Option<(f64, f64)> {
        let samples = self.series.get(&(body, perspective))?;
        Some((samples.first()?.jd_ut, samples.last()?.jd_ut))
    }
}

impl TableEphemeris {
    /// Samples answering `query`, after checking frame, series and coverage.
    fn series_for(&self, query: &Query) -> Result<&[Sample], EphemError> {
        if query.frame != self.frame {
            return Err(EphemError::FrameMismatch {
                table: self.frame,
                query: query.frame,
            });
        }
        let samples = self
            .series
            .get(&(query.body, query.perspective))
            .ok_or(EphemError::UnsupportedQuery {
                body: query.body,
                perspective: query.perspective,
            })?;

        let jd = query.jd_ut;
        match (samples.first(), samples.last()) {
            (Some(first), Some(last)) if (first.jd_ut..=last.jd_ut).contains(&jd) => Ok(samples),
            _ => Err(EphemError::EpochOutOfRange { jd }),
        }
    }
}

/// Linear segment used for `jd`: its end samples and `jd`'s fraction along it.
///
/// An exact sample starts the segment after it; the last sample closes the
/// final segment. A single-sample series pairs the sample with itself.
fn segment(samples: &[Sample], jd: f64) -> (&Sample, &Sample, f64) {
    if samples.len() < 2 {
        return (&samples[0], &samples[0], 0.0);
    }
    let idx = samples
        .partition_point(|s| s.jd_ut <= jd)
        .clamp(1, samples.len() - 1);
    let (a, b) = (&samples[idx - 1], &samples[idx]);
    (a, b, (jd - a.jd_ut) / (b.jd_ut - a.jd_ut))
}

impl Ephemeris for TableEphemeris {
    fn position(&self, query: &Query) -> Result<EclipticPosition, EphemError> {
        let samples = self.series_for(query)?;
        let (a, b, frac) = segment(samples, query.jd_ut);

        // Interpolate the shorter way around the circle.
        let dlon = normalize_pm180(b.pos.lon_deg - a.pos.lon_deg);
        Ok(EclipticPosition {
            lon_deg: normalize_360(a.pos.lon_deg + frac * dlon),
            lat_deg: a.pos.lat_deg + frac * (b.pos.lat_deg - a.pos.lat_deg),
            distance_au: a.pos.distance_au + frac * (b.pos.distance_au - a.pos.distance_au),
        })
    }

    /// Speed is the slope of the interpolating segment, so it is defined up to
    /// both ends of the coverage.
    fn longitude_state(&self, query: &Query) -> Result<LongitudeState, EphemError> {
        let pos = self.position(query)?;
        let samples = self.series_for(query)?;
        let (a, b, _) = segment(samples, query.jd_ut);
        let span = b.jd_ut - a.jd_ut;
        let speed_deg_per_day = if span > 0.0 {
            normalize_pm180(b.pos.lon_deg - a.pos.lon_deg) / span
        } else {
            0.0
        };
        Ok(LongitudeState {
            lon_deg: pos.lon_deg,
            lat_deg: pos.lat_deg,
            speed_deg_per_day,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
jd_ut,body,perspective,longitude_deg,latitude_deg
2451546.0,mars,geo,359.0,1.0
2451545.0,mars,geo,358.0,0.0
2451547.0,mars,geo,1.0,2.0
2451545.0,jupiter,helio,25.0,
";

    fn table() -> TableEphemeris {
        TableEphemeris::from_reader(TABLE.as_bytes(), Frame::EclipticOfDate).unwrap()
    }

    #[test]
    fn interpolates_across_zero() {
        let t = table();
        let lon = t
            .longitude(&Query::geocentric(Body::Mars, 2_451_546.5))
            .unwrap();
        assert!((lon - 0.0).abs() < 1e-9, "lon = {lon}");
    }

    #[test]
    fn exact_sample_returned() {
        let t = table();
        let pos = t.position(&Query::geocentric(Body::Mars, 2_451_545.0)).unwrap();
        assert!((pos.lon_deg - 358.0).abs() < 1e-12);
        let last = t.position(&Query::geocentric(Body::Mars, 2_451_547.0)).unwrap();
        assert!((last.lon_deg - 1.0).abs() < 1e-12);
    }

    #[test]
    fn outside_coverage_is_error() {
        let t = table();
        let err = t
            .position(&Query::geocentric(Body::Mars, 2_451_548.0))
            .unwrap_err();
        assert!(matches!(err, EphemError::EpochOutOfRange { .. }));
    }

    #[test]
    fn frame_mismatch_is_error() {
        let t = table();
        let q = Query::new(Body::Mars, Perspective::Geocentric, Frame::EclipticJ2000, 2_451_545.5);
        assert!(matches!(t.position(&q), Err(EphemError::FrameMismatch { .. })));
    }

    #[test]
    fn missing_series_is_unsupported() {
        let t = table();
        let q = Query::geocentric(Body::Venus, 2_451_545.5);
        assert!(matches!(t.position(&q), Err(EphemError::UnsupportedQuery { .. })));
    }

    #[test]
    fn coverage_reported() {
        let t = table();
        assert_eq!(
            t.coverage(Body::Mars, Perspective::Geocentric),
            Some((2_451_545.0, 2_451_547.0))
        );
    }

    #[test]
    fn bad_body_rejected() {
        let bad = "jd_ut,body,perspective,longitude_deg\n2451545.0,vulcan,geo,1.0\n";
        assert!(TableEphemeris::from_reader(bad.as_bytes(), Frame::EclipticOfDate).is_err());
    }

    #[test]
    fn speed_defined_at_both_coverage_edges() {
        let t = table();
        let first = t
            .longitude_state(&Query::geocentric(Body::Mars, 2_451_545.0))
            .unwrap();
        assert!((first.lon_deg - 358.0).abs() < 1e-12);
        assert!((first.speed_deg_per_day - 1.0).abs() < 1e-12);

        let last = t
            .longitude_state(&Query::geocentric(Body::Mars, 2_451_547.0))
            .unwrap();
        assert!((last.lon_deg - 1.0).abs() < 1e-12);
        assert!((last.speed_deg_per_day - 2.0).abs() < 1e-12);

        // Just outside is still out of range.
        assert!(matches!(
            t.longitude_state(&Query::geocentric(Body::Mars, 2_451_544.99)),
            Err(EphemError::EpochOutOfRange { .. })
        ));
    }

    #[test]
    fn speed_follows_segment_across_zero() {
        let t = table();
        let mid = t
            .longitude_state(&Query::geocentric(Body::Mars, 2_451_546.5))
            .unwrap();
        assert!((mid.speed_deg_per_day - 2.0).abs() < 1e-12);
        assert!(!mid.is_retrograde());
    }

    #[test]
    fn single_sample_series_has_zero_speed() {
        let t = table();
        let q = Query::heliocentric(Body::Jupiter, 2_451_545.0);
        let state = t.longitude_state(&q).unwrap();
        assert!((state.lon_deg - 25.0).abs() < 1e-12);
        assert_eq!(state.speed_deg_per_day, 0.0);
    }
}
