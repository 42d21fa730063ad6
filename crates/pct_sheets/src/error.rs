//! Error type for the spreadsheet pipelines.

use pct_ephem::EphemError;
use pct_market::MarketError;
use pct_search::SearchError;
use pct_time::TimeError;
use thiserror::Error;

/// Anything that can abort a pipeline run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SheetError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Ephem(#[from] EphemError),
    #[error(transparent)]
    Market(#[from] MarketError),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("job file error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
