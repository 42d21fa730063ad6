use pct_ephem::EphemError;
use pct_market::MarketError;
use pct_search::SearchError;
use pct_sheets::SheetError;
use pct_time::TimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Argument(String),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Ephem(#[from] EphemError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Market(#[from] MarketError),
    #[error(transparent)]
    Sheet(#[from] SheetError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
