//! File round trips through the filesystem.

use pct_market::{
    CsvLayout, SwingConfig, SwingFile, SwingKind, detect_swings, read_price_bars,
    write_price_bars,
};
use pct_time::Tz;

const PRICES: &str = "\
Date,Open,High,Low,Close,Volume
01/02/2020,10,11,9,10.5,100
01/03/2020,10.5,12,10,11.5,120
01/06/2020,11.5,14,11,13,150
01/07/2020,13,13.5,12,12.5,90
01/08/2020,12.5,12.8,10.5,11,80
01/09/2020,11,11.2,8,8.5,200
01/10/2020,8.5,10,8.2,9.5,110
01/13/2020,9.5,11,9,10.8,95
";

#[test]
fn price_file_round_trip_preserves_bars() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("prices.csv");
    std::fs::write(&src, PRICES).unwrap();

    let layout = CsvLayout {
        timezone: "America/Chicago".to_string(),
        ..CsvLayout::default()
    };
    let bars = read_price_bars(&src, &layout).unwrap();
    assert_eq!(bars.len(), 8);

    let out = dir.path().join("copy.csv");
    write_price_bars(&out, &bars, Tz::America__Chicago).unwrap();
    let again = read_price_bars(&out, &CsvLayout::default()).unwrap();
    assert_eq!(bars, again);
}

#[test]
fn swings_saved_and_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("prices.csv");
    std::fs::write(&src, PRICES).unwrap();
    let bars = read_price_bars(&src, &CsvLayout::default()).unwrap();

    let swings = detect_swings(&bars, &SwingConfig::default()).unwrap();
    assert_eq!(swings.len(), 2);
    assert_eq!(swings[0].kind, SwingKind::High);
    assert_eq!(swings[1].kind, SwingKind::Low);

    let mut file = SwingFile::new("test-series", swings);
    file.description = "two pivots".to_string();
    file.source = Some("prices.csv".to_string());
    let path = dir.path().join("swings.json");
    file.save(&path).unwrap();

    let loaded = SwingFile::load(&path).unwrap();
    assert_eq!(loaded, file);
    assert_eq!(loaded.highs().count(), 1);
    assert_eq!(loaded.lows().count(), 1);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_price_bars(&dir.path().join("absent.csv"), &CsvLayout::default()).unwrap_err();
    assert!(matches!(err, pct_market::MarketError::Io(_)));
}
