//! Price bars and the CSV files that hold them.
//!
//! Price files come from many sources, so nothing about their shape is
//! hard-coded: [`CsvLayout`] names how many header lines to skip, which
//! column holds what, and how to read the timestamps.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use pct_time::{Tz, datetime_to_jd, parse_timestamp, parse_timestamp_with, parse_timezone};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MarketError;

/// One time-stamped OHLC(V) record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl PriceBar {
    /// Bar time as a Julian Date (UT).
    pub fn jd(&self) -> f64 {
        datetime_to_jd(&self.timestamp)
    }
}

/// Where each field lives in a price CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvLayout {
    /// Lines skipped before the first data row (blank lines are not counted).
    pub header_lines: usize,
    pub timestamp_col: usize,
    /// Separate time-of-day column, joined to the date with a space.
    pub time_col: Option<usize>,
    pub open_col: usize,
    pub high_col: usize,
    pub low_col: usize,
    pub close_col: usize,
    pub volume_col: Option<usize>,
    /// IANA zone that naive timestamps are local to.
    pub timezone: String,
    /// Explicit `strftime` layout; when absent every accepted layout is tried.
    pub timestamp_format: Option<String>,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            header_lines: 1,
            timestamp_col: 0,
            time_col: None,
            open_col: 1,
            high_col: 2,
            low_col: 3,
            close_col: 4,
            volume_col: Some(5),
            timezone: "UTC".to_string(),
            timestamp_format: None,
        }
    }
}

impl CsvLayout {
    pub fn validate(&self) -> Result<(), &'static str> {
        let prices = [self.open_col, self.high_col, self.low_col, self.close_col];
        if prices.contains(&self.timestamp_col) {
            return Err("timestamp column overlaps a price column");
        }
        if let Some(t) = self.time_col {
            if t == self.timestamp_col || prices.contains(&t) {
                return Err("time column overlaps another column");
            }
        }
        if let Some(v) = self.volume_col {
            if v == self.timestamp_col || prices.contains(&v) {
                return Err("volume column overlaps another column");
            }
        }
        Ok(())
    }

    fn tz(&self) -> Result<Tz, MarketError> {
        Ok(parse_timezone(&self.timezone)?)
    }
}

fn field<'r>(record: &'r StringRecord, col: usize, line: u64) -> Result<&'r str, MarketError> {
    record.get(col).ok_or_else(|| MarketError::MalformedRow {
        line,
        reason: format!("missing column {col}"),
    })
}

fn number(record: &StringRecord, col: usize, line: u64) -> Result<f64, MarketError> {
    let text = field(record, col, line)?;
    // Thousands separators show up in exported sheets.
    let cleaned = text.replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MarketError::MalformedRow {
            line,
            reason: format!("column {col}: '{text}' is not a number"),
        })
}

fn parse_row(
    record: &StringRecord,
    line: u64,
    layout: &CsvLayout,
    tz: Tz,
) -> Result<PriceBar, MarketError> {
    let mut stamp = field(record, layout.timestamp_col, line)?.to_string();
    if let Some(col) = layout.time_col {
        stamp.push(' ');
        stamp.push_str(field(record, col, line)?);
    }
    let timestamp = match &layout.timestamp_format {
        Some(fmt) => parse_timestamp_with(&stamp, fmt, tz),
        None => parse_timestamp(&stamp, tz),
    }
    .map_err(|e| MarketError::MalformedRow {
        line,
        reason: e.to_string(),
    })?;

    let volume = match layout.volume_col {
        Some(col) if record.get(col).is_some_and(|v| !v.is_empty()) => {
            Some(number(record, col, line)?)
        }
        _ => None,
    };

    let bar = PriceBar {
        timestamp,
        open: number(record, layout.open_col, line)?,
        high: number(record, layout.high_col, line)?,
        low: number(record, layout.low_col, line)?,
        close: number(record, layout.close_col, line)?,
        volume,
    };
    if bar.low > bar.high {
        return Err(MarketError::MalformedRow {
            line,
            reason: format!("low {} above high {}", bar.low, bar.high),
        });
    }
    Ok(bar)
}

/// Read price bars from any reader. Bars are returned in time order.
pub fn read_price_bars_from<R: Read>(
    reader: R,
    layout: &CsvLayout,
) -> Result<Vec<PriceBar>, MarketError> {
    layout.validate().map_err(MarketError::InvalidLayout)?;
    let tz = layout.tz()?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if i < layout.header_lines {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        if record.iter().all(str::is_empty) {
            continue;
        }
        match parse_row(&record, line, layout, tz) {
            Ok(bar) => bars.push(bar),
            Err(e) => {
                warn!(line, error = %e, "malformed price row");
                return Err(e);
            }
        }
    }

    if !bars.is_sorted_by_key(|b| b.timestamp) {
        debug!("price rows out of order, sorting");
        bars.sort_by_key(|b| b.timestamp);
    }
    Ok(bars)
}

/// Read price bars from a CSV file.
pub fn read_price_bars(path: &Path, layout: &CsvLayout) -> Result<Vec<PriceBar>, MarketError> {
    let bars = read_price_bars_from(File::open(path)?, layout)?;
    debug!(path = %path.display(), count = bars.len(), "read price bars");
    Ok(bars)
}

/// Write bars as `timestamp,open,high,low,close,volume` with RFC 3339 timestamps in `tz`.
pub fn write_price_bars_to<W: Write>(
    writer: W,
    bars: &[PriceBar],
    tz: Tz,
) -> Result<(), MarketError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        let volume = bar.volume.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([
            bar.timestamp.with_timezone(&tz).to_rfc3339(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            volume,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write bars to a CSV file readable back with the default [`CsvLayout`].
pub fn write_price_bars(path: &Path, bars: &[PriceBar], tz: Tz) -> Result<(), MarketError> {
    write_price_bars_to(File::create(path)?, bars, tz)
}
