//! Job files: a JSON list of pipeline runs executed in order.
//!
//! ```json
//! {
//!   "ephemeris": { "source": "kepler" },
//!   "jobs": [
//!     { "pipeline": "ephemeris", "window": { "start": "2024-01-01", "end": "2024-12-31" },
//!       "tracks": [{ "body": "mercury" }], "output": "out/mercury.csv" }
//!   ]
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use pct_ephem::{Ephemeris, Frame, KeplerEphemeris, TableEphemeris};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::differences::{DifferencesConfig, run_differences};
use crate::ephemeris_sheet::{EphemerisSheetConfig, run_ephemeris_sheet};
use crate::error::SheetError;
use crate::lookback::{LookbackConfig, run_lookback};
use crate::repetition::{RepetitionConfig, run_repetition};

/// Where longitudes come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum EphemerisSource {
    /// Built-in analytic ephemeris.
    Kepler {
        #[serde(default)]
        strict_range: bool,
    },
    /// Pre-computed longitudes from a CSV table.
    Table {
        path: PathBuf,
        #[serde(default)]
        frame: Frame,
    },
}

impl Default for EphemerisSource {
    fn default() -> Self {
        Self::Kepler {
            strict_range: false,
        }
    }
}

impl EphemerisSource {
    pub fn build(&self) -> Result<Box<dyn Ephemeris>, SheetError> {
        Ok(match self {
            Self::Kepler { strict_range } => Box::new(KeplerEphemeris {
                strict_range: *strict_range,
            }),
            Self::Table { path, frame } => Box::new(TableEphemeris::load(path, *frame)?),
        })
    }
}

/// One pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pipeline", rename_all = "kebab-case")]
pub enum Job {
    Ephemeris(EphemerisSheetConfig),
    Differences(DifferencesConfig),
    Repetition(RepetitionConfig),
    Lookback(LookbackConfig),
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ephemeris(_) => "ephemeris",
            Self::Differences(_) => "differences",
            Self::Repetition(_) => "repetition",
            Self::Lookback(_) => "lookback",
        }
    }

    /// Run the pipeline. Returns the number of rows written.
    pub fn run<E>(&self, eph: &E) -> Result<usize, SheetError>
    where
        E: Ephemeris + ?Sized,
    {
        match self {
            Self::Ephemeris(c) => run_ephemeris_sheet(eph, c),
            Self::Differences(c) => run_differences(eph, c),
            Self::Repetition(c) => run_repetition(eph, c),
            Self::Lookback(c) => run_lookback(eph, c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub ephemeris: EphemerisSource,
    pub jobs: Vec<Job>,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Run every job in order, stopping at the first failure.
    pub fn run_all(&self) -> Result<usize, SheetError> {
        let eph = self.ephemeris.build()?;
        let mut total = 0;
        for (i, job) in self.jobs.iter().enumerate() {
            info!(index = i, pipeline = job.name(), "running job");
            total += job.run(&eph)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_job_file() {
        let text = r#"{
            "jobs": [
                { "pipeline": "ephemeris",
                  "window": { "start": "2024-01-01", "end": "2024-01-10" },
                  "tracks": [{ "body": "mars" }, { "body": "mars", "perspective": "heliocentric" }],
                  "output": "out.csv" },
                { "pipeline": "lookback",
                  "references": { "kind": "timestamps", "values": ["2020-01-01"] },
                  "tracks": [{ "body": "saturn" }],
                  "multiples": [1, 2],
                  "output": "lb.csv" }
            ]
        }"#;
        let file: JobFile = serde_json::from_str(text).unwrap();
        assert_eq!(file.ephemeris, EphemerisSource::default());
        assert_eq!(file.jobs.len(), 2);
        assert_eq!(file.jobs[0].name(), "ephemeris");
        match &file.jobs[1] {
            Job::Lookback(c) => {
                assert_eq!(c.multiples, vec![1.0, 2.0]);
                assert_eq!(c.timezone, "UTC");
            }
            other => panic!("unexpected job {}", other.name()),
        }
    }

    #[test]
    fn unknown_pipeline_rejected() {
        let text = r#"{ "jobs": [{ "pipeline": "astrology" }] }"#;
        assert!(serde_json::from_str::<JobFile>(text).is_err());
    }

    #[test]
    fn table_source_needs_file() {
        let src = EphemerisSource::Table {
            path: PathBuf::from("/nonexistent/table.csv"),
            frame: Frame::EclipticOfDate,
        };
        assert!(src.build().is_err());
    }
}
