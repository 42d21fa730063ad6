//! Cell formatting and CSV sinks shared by the pipelines.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use pct_market::SwingKind;
use pct_time::{Tz, format_timestamp, jd_to_datetime};

use crate::error::SheetError;
use crate::input::Reference;

pub(crate) fn angle(v: f64) -> String {
    format!("{v:.6}")
}

pub(crate) fn days(v: f64) -> String {
    format!("{v:.4}")
}

pub(crate) fn jd_cell(jd: f64) -> String {
    format!("{jd:.6}")
}

pub(crate) fn time_cell(jd: f64, tz: Tz) -> Result<String, SheetError> {
    Ok(format_timestamp(&jd_to_datetime(jd)?, tz))
}

pub(crate) fn kind_cell(kind: Option<SwingKind>) -> String {
    kind.map(|k| k.as_str().to_string()).unwrap_or_default()
}

pub(crate) fn price_cell(price: Option<f64>) -> String {
    price.map(|p| p.to_string()).unwrap_or_default()
}

/// `timestamp, kind, price` cells describing a reference.
pub(crate) fn reference_cells(r: &Reference, tz: Tz) -> [String; 3] {
    [
        format_timestamp(&r.timestamp, tz),
        kind_cell(r.kind),
        price_cell(r.price),
    ]
}

/// Open a CSV file for writing, creating parent directories.
pub fn create_csv(path: &Path) -> Result<Writer<File>, SheetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Writer::from_writer(File::create(path)?))
}

pub(crate) fn finish<W: Write>(mut wtr: Writer<W>) -> Result<(), SheetError> {
    wtr.flush()?;
    Ok(())
}
