//! Price data for cycle studies.
//!
//! This crate provides:
//! - [`PriceBar`] and layout-driven CSV reading/writing
//! - Swing high/low pivot detection
//! - [`SwingFile`], a JSON document of tagged swings

pub mod bar;
pub mod error;
pub mod swing;

pub use bar::{
    CsvLayout, PriceBar, read_price_bars, read_price_bars_from, write_price_bars,
    write_price_bars_to,
};
pub use error::MarketError;
pub use swing::{Swing, SwingConfig, SwingFile, SwingKind, detect_swings};
