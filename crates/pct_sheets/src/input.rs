//! Pipeline inputs: time windows and reference instants.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use pct_market::{CsvLayout, SwingConfig, SwingFile, SwingKind, detect_swings, read_price_bars};
use pct_time::{Tz, datetime_to_jd, parse_timestamp};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SheetError;

/// A `[start, end]` span given as timestamp text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse both ends in `tz` and return them as Julian Dates (UT).
    pub fn resolve(&self, tz: Tz) -> Result<(f64, f64), SheetError> {
        let start = datetime_to_jd(&parse_timestamp(&self.start, tz)?);
        let end = datetime_to_jd(&parse_timestamp(&self.end, tz)?);
        if end <= start {
            return Err(SheetError::InvalidConfig("window end must be after start"));
        }
        Ok((start, end))
    }
}

/// An instant a pipeline row is anchored to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub timestamp: DateTime<Utc>,
    /// Set when the reference is a swing.
    pub kind: Option<SwingKind>,
    pub price: Option<f64>,
}

impl Reference {
    pub fn jd(&self) -> f64 {
        datetime_to_jd(&self.timestamp)
    }
}

/// Where reference instants come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReferenceSource {
    /// Swings detected in a price CSV, or every bar when `every_bar` is set.
    Prices {
        path: PathBuf,
        #[serde(default)]
        layout: CsvLayout,
        #[serde(default)]
        swings: SwingConfig,
        #[serde(default)]
        every_bar: bool,
    },
    /// A previously saved swing file.
    SwingFile { path: PathBuf },
    /// Explicit timestamps, local to the pipeline's time zone.
    Timestamps { values: Vec<String> },
}

/// Load references in time order.
pub fn load_references(source: &ReferenceSource, tz: Tz) -> Result<Vec<Reference>, SheetError> {
    let mut refs: Vec<Reference> = match source {
        ReferenceSource::Prices {
            path,
            layout,
            swings,
            every_bar,
        } => {
            let bars = read_price_bars(path, layout)?;
            if *every_bar {
                bars.iter()
                    .map(|b| Reference {
                        timestamp: b.timestamp,
                        kind: None,
                        price: Some(b.close),
                    })
                    .collect()
            } else {
                detect_swings(&bars, swings)?
                    .iter()
                    .map(|s| Reference {
                        timestamp: s.timestamp,
                        kind: Some(s.kind),
                        price: Some(s.price),
                    })
                    .collect()
            }
        }
        ReferenceSource::SwingFile { path } => SwingFile::load(path)?
            .swings
            .iter()
            .map(|s| Reference {
                timestamp: s.timestamp,
                kind: Some(s.kind),
                price: Some(s.price),
            })
            .collect(),
        ReferenceSource::Timestamps { values } => values
            .iter()
            .map(|v| {
                Ok(Reference {
                    timestamp: parse_timestamp(v, tz)?,
                    kind: None,
                    price: None,
                })
            })
            .collect::<Result<_, SheetError>>()?,
    };
    refs.sort_by_key(|r| r.timestamp);
    info!(count = refs.len(), "references loaded");
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_resolves_in_zone() {
        let w = TimeWindow::new("2000-01-01 12:00", "2000-01-02 12:00");
        let (a, b) = w.resolve(Tz::UTC).unwrap();
        assert!((a - 2_451_545.0).abs() < 1e-9);
        assert!((b - a - 1.0).abs() < 1e-9);
    }

    #[test]
    fn window_must_move_forward() {
        let w = TimeWindow::new("2000-01-02", "2000-01-01");
        assert!(matches!(w.resolve(Tz::UTC), Err(SheetError::InvalidConfig(_))));
    }

    #[test]
    fn explicit_timestamps_sorted() {
        let src = ReferenceSource::Timestamps {
            values: vec!["2020-05-01".into(), "2019-05-01".into()],
        };
        let refs = load_references(&src, Tz::UTC).unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs[0].timestamp < refs[1].timestamp);
        assert!(refs[0].kind.is_none());
    }

    #[test]
    fn source_json_is_tagged() {
        let src: ReferenceSource =
            serde_json::from_str(r#"{"kind": "swing-file", "path": "s.json"}"#).unwrap();
        assert_eq!(
            src,
            ReferenceSource::SwingFile {
                path: PathBuf::from("s.json")
            }
        );
    }
}
