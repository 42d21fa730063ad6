//! Spreadsheet pipelines that line planetary cycles up against price swings.
//!
//! Every pipeline follows the same shape: load references, run a pure
//! `compute_*` that returns typed rows, then write them with a `write_*` CSV
//! sink. The `run_*` functions chain the three for one config; [`JobFile`]
//! chains several configs.
//!
//! - [`ephemeris_sheet`]: fixed-step longitude table
//! - [`differences`]: longitudes and pairwise differences at each reference
//! - [`repetition`]: returns to a reference's longitude, matched to the nearest swing
//! - [`lookback`]: N-cycle travel back (or forward) from each reference

pub mod differences;
pub mod ephemeris_sheet;
pub mod error;
pub mod input;
pub mod jobs;
pub mod lookback;
pub mod output;
pub mod repetition;

pub use differences::{
    DifferenceRow, Differences, DifferencesConfig, compute_differences, run_differences,
    track_pairs, write_differences,
};
pub use ephemeris_sheet::{
    EphemerisRow, EphemerisSheet, EphemerisSheetConfig, TrackCell, compute_ephemeris_sheet,
    run_ephemeris_sheet, write_ephemeris_sheet,
};
pub use error::SheetError;
pub use input::{Reference, ReferenceSource, TimeWindow, load_references};
pub use jobs::{EphemerisSource, Job, JobFile};
pub use lookback::{LookbackConfig, LookbackRow, compute_lookback, run_lookback, write_lookback};
pub use output::create_csv;
pub use repetition::{
    RepetitionConfig, RepetitionParams, RepetitionRow, compute_repetition, run_repetition,
    write_repetition,
};
