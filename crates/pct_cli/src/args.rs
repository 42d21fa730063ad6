//! Argument groups shared between subcommands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use pct_ephem::{Body, Frame, Perspective};
use pct_market::{CsvLayout, SwingConfig};
use pct_search::{CrossingFilter, Track};
use pct_sheets::{EphemerisSource, ReferenceSource, TimeWindow};

use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Window start, e.g. "2024-01-01" or "2024-01-01 09:30"
    #[arg(long)]
    pub start_timestamp: String,
    /// Window end
    #[arg(long)]
    pub end_timestamp: String,
}

impl WindowArgs {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(&self.start_timestamp, &self.end_timestamp)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum FrameArg {
    /// Mean equinox of date
    #[default]
    OfDate,
    /// Mean equinox of J2000.0
    J2000,
}

impl From<FrameArg> for Frame {
    fn from(f: FrameArg) -> Self {
        match f {
            FrameArg::OfDate => Frame::EclipticOfDate,
            FrameArg::J2000 => Frame::EclipticJ2000,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum FilterArg {
    #[default]
    Any,
    Direct,
    Retrograde,
}

impl From<FilterArg> for CrossingFilter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::Any => CrossingFilter::Any,
            FilterArg::Direct => CrossingFilter::DirectOnly,
            FilterArg::Retrograde => CrossingFilter::RetrogradeOnly,
        }
    }
}

/// Viewpoint and frame applied to every body of a command.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// geocentric (geo) or heliocentric (helio)
    #[arg(long, default_value = "geocentric")]
    pub perspective: Perspective,
    #[arg(long, value_enum, default_value_t)]
    pub frame: FrameArg,
}

impl ViewArgs {
    pub fn track(&self, body: Body) -> Track {
        Track::new(body, self.perspective, self.frame.into())
    }
}

#[derive(Args, Debug, Clone)]
pub struct TracksArgs {
    /// Body name, repeatable (sun, moon, mercury, ..., north-node, south-node)
    #[arg(long = "body", required = true)]
    pub bodies: Vec<Body>,
    #[command(flatten)]
    pub view: ViewArgs,
}

impl TracksArgs {
    pub fn tracks(&self) -> Vec<Track> {
        self.bodies.iter().map(|&b| self.view.track(b)).collect()
    }
}

/// Column layout of a price CSV.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Lines to skip before the first data row
    #[arg(long, default_value_t = 1)]
    pub header_lines: usize,
    /// Column holding the date (or full timestamp)
    #[arg(long, default_value_t = 0)]
    pub date_col: usize,
    /// Separate time-of-day column
    #[arg(long)]
    pub time_col: Option<usize>,
    #[arg(long, default_value_t = 1)]
    pub open_col: usize,
    #[arg(long, default_value_t = 2)]
    pub high_col: usize,
    #[arg(long, default_value_t = 3)]
    pub low_col: usize,
    #[arg(long, default_value_t = 4)]
    pub close_col: usize,
    #[arg(long)]
    pub volume_col: Option<usize>,
    /// strftime layout of the timestamp text, e.g. "%m/%d/%Y %H%M"
    #[arg(long)]
    pub timestamp_format: Option<String>,
}

impl LayoutArgs {
    pub fn layout(&self, timezone: &str) -> CsvLayout {
        CsvLayout {
            header_lines: self.header_lines,
            timestamp_col: self.date_col,
            time_col: self.time_col,
            open_col: self.open_col,
            high_col: self.high_col,
            low_col: self.low_col,
            close_col: self.close_col,
            volume_col: self.volume_col,
            timezone: timezone.to_string(),
            timestamp_format: self.timestamp_format.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SwingArgs {
    /// Bars before a pivot that it must beat
    #[arg(long, default_value_t = 2)]
    pub left_bars: usize,
    /// Bars after a pivot that it must beat
    #[arg(long, default_value_t = 2)]
    pub right_bars: usize,
}

impl SwingArgs {
    pub fn config(&self) -> SwingConfig {
        SwingConfig {
            left_bars: self.left_bars,
            right_bars: self.right_bars,
        }
    }
}

/// Where reference instants come from: exactly one of the three sources.
#[derive(Args, Debug, Clone)]
pub struct ReferenceArgs {
    /// Price CSV whose swings are the references
    #[arg(long, conflicts_with_all = ["swing_file", "timestamps"])]
    pub prices: Option<PathBuf>,
    /// Swing file written by `pct swings`
    #[arg(long, conflicts_with = "timestamps")]
    pub swing_file: Option<PathBuf>,
    /// Explicit reference timestamp, repeatable
    #[arg(long = "timestamp")]
    pub timestamps: Vec<String>,
    /// Use every price bar instead of the swings
    #[arg(long, requires = "prices")]
    pub every_bar: bool,
    #[command(flatten)]
    pub layout: LayoutArgs,
    #[command(flatten)]
    pub swings: SwingArgs,
}

impl ReferenceArgs {
    pub fn source(&self, timezone: &str) -> Result<ReferenceSource, CliError> {
        if let Some(path) = &self.prices {
            return Ok(ReferenceSource::Prices {
                path: path.clone(),
                layout: self.layout.layout(timezone),
                swings: self.swings.config(),
                every_bar: self.every_bar,
            });
        }
        if let Some(path) = &self.swing_file {
            return Ok(ReferenceSource::SwingFile { path: path.clone() });
        }
        if self.timestamps.is_empty() {
            return Err(CliError::Argument(
                "one of --prices, --swing-file or --timestamp is required".to_string(),
            ));
        }
        Ok(ReferenceSource::Timestamps {
            values: self.timestamps.clone(),
        })
    }
}

/// Ephemeris selection, global to every command.
#[derive(Args, Debug, Clone)]
pub struct EphemerisArgs {
    /// Longitude table CSV to use instead of the built-in ephemeris
    #[arg(long, global = true)]
    pub table: Option<PathBuf>,
    /// Frame of the longitudes in --table
    #[arg(long, value_enum, default_value_t, global = true)]
    pub table_frame: FrameArg,
    /// Reject epochs outside 1800-2050 with the built-in ephemeris
    #[arg(long, global = true)]
    pub strict: bool,
}

impl EphemerisArgs {
    pub fn source(&self) -> EphemerisSource {
        match &self.table {
            Some(path) => EphemerisSource::Table {
                path: path.clone(),
                frame: self.table_frame.into(),
            },
            None => EphemerisSource::Kepler {
                strict_range: self.strict,
            },
        }
    }
}
