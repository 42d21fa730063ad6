//! Swing high/low detection and the swing file format.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use pct_time::datetime_to_jd;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bar::PriceBar;
use crate::error::MarketError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwingKind {
    High,
    Low,
}

impl SwingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

/// A pivot bar: its high (or low) beats every neighbour in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    pub kind: SwingKind,
    /// Index of the pivot bar in the series it was detected in.
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Free-form annotations carried through to charting tools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Swing {
    pub fn jd(&self) -> f64 {
        datetime_to_jd(&self.timestamp)
    }
}

/// Pivot window widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingConfig {
    pub left_bars: usize,
    pub right_bars: usize,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            left_bars: 2,
            right_bars: 2,
        }
    }
}

impl SwingConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.left_bars == 0 && self.right_bars == 0 {
            return Err("left_bars and right_bars cannot both be zero");
        }
        Ok(())
    }
}

fn is_pivot(
    bars: &[PriceBar],
    i: usize,
    config: &SwingConfig,
    value: fn(&PriceBar) -> f64,
    beats: fn(f64, f64) -> bool,
) -> bool {
    let v = value(&bars[i]);
    let left = &bars[i - config.left_bars..i];
    let right = &bars[i + 1..=i + config.right_bars];
    left.iter().chain(right).all(|b| beats(v, value(b)))
}

/// Detect swing highs and lows.
///
/// A bar is a swing high when its high is strictly greater than the highs of
/// the `left_bars` bars before it and the `right_bars` bars after it; a tie
/// anywhere in the window disqualifies it. Lows are symmetric. Bars too close
/// to either end of the series for a full window are never pivots. An
/// outside bar can be both; the high is listed first.
pub fn detect_swings(bars: &[PriceBar], config: &SwingConfig) -> Result<Vec<Swing>, MarketError> {
    config.validate().map_err(MarketError::InvalidConfig)?;

    let mut swings = Vec::new();
    if bars.len() <= config.left_bars + config.right_bars {
        return Ok(swings);
    }

    for i in config.left_bars..bars.len() - config.right_bars {
        let bar = &bars[i];
        if is_pivot(bars, i, config, |b| b.high, |a, b| a > b) {
            swings.push(Swing {
                kind: SwingKind::High,
                index: i,
                timestamp: bar.timestamp,
                price: bar.high,
                tags: Vec::new(),
            });
        }
        if is_pivot(bars, i, config, |b| b.low, |a, b| a < b) {
            swings.push(Swing {
                kind: SwingKind::Low,
                index: i,
                timestamp: bar.timestamp,
                price: bar.low,
                tags: Vec::new(),
            });
        }
    }
    debug!(bars = bars.len(), swings = swings.len(), "swings detected");
    Ok(swings)
}

/// A named, self-describing collection of swings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwingFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Where the prices came from (file name, ticker, ...).
    #[serde(default)]
    pub source: Option<String>,
    pub swings: Vec<Swing>,
}

impl SwingFile {
    pub fn new(name: impl Into<String>, swings: Vec<Swing>) -> Self {
        Self {
            name: name.into(),
            swings,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, MarketError> {
        let file = File::open(path)?;
        let mut parsed: Self = serde_json::from_reader(BufReader::new(file))?;
        parsed.swings.sort_by_key(|s| s.timestamp);
        Ok(parsed)
    }

    pub fn save(&self, path: &Path) -> Result<(), MarketError> {
        let file = File::create(path)?;
        self.save_to(BufWriter::new(file))
    }

    /// Write pretty JSON and flush, so a failed write is never reported as saved.
    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<(), MarketError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn highs(&self) -> impl Iterator<Item = &Swing> {
        self.swings.iter().filter(|s| s.kind == SwingKind::High)
    }

    pub fn lows(&self) -> impl Iterator<Item = &Swing> {
        self.swings.iter().filter(|s| s.kind == SwingKind::Low)
    }
}
