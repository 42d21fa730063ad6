mod args;
mod error;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pct_ephem::{Body, Ephemeris};
use pct_market::{SwingFile, detect_swings, read_price_bars};
use pct_search::{
    CrossingConfig, SearchDirection, SeparationConfig, StationaryConfig, Track, body_crossings,
    search_separations, search_stationary,
};
use pct_sheets::{
    DifferencesConfig, EphemerisSheetConfig, JobFile, LookbackConfig, RepetitionConfig,
    run_differences, run_ephemeris_sheet, run_lookback, run_repetition,
};
use pct_time::{Tz, datetime_to_jd, parse_timestamp, parse_timezone};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::{
    EphemerisArgs, FilterArg, LayoutArgs, ReferenceArgs, SwingArgs, TracksArgs, ViewArgs,
    WindowArgs,
};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "pct", version, about = "Planetary cycles against price swings")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
    /// IANA time zone for timestamps read and written
    #[arg(long, global = true, default_value = "UTC")]
    timezone: String,
    #[command(flatten)]
    ephemeris: EphemerisArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Longitude, latitude, distance and speed at one instant
    Position {
        #[arg(long)]
        timestamp: String,
        #[command(flatten)]
        tracks: TracksArgs,
    },
    /// Fixed-step ephemeris table
    Ephemeris {
        #[command(flatten)]
        window: WindowArgs,
        #[command(flatten)]
        tracks: TracksArgs,
        /// Row spacing in days
        #[arg(long, default_value_t = 1.0)]
        interval: f64,
        #[arg(long)]
        output_file: PathBuf,
    },
    /// Instants a body's longitude reaches a target degree
    Crossings {
        #[arg(long)]
        body: Body,
        /// Target longitude in degrees [0, 360)
        #[arg(long)]
        target: f64,
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long, value_enum, default_value_t)]
        filter: FilterArg,
        /// Sampling step in days (default chosen per body)
        #[arg(long)]
        step: Option<f64>,
        /// Maximum time error in days
        #[arg(long, default_value_t = 1e-5)]
        tolerance: f64,
        /// CSV destination (stdout when absent)
        #[arg(long)]
        output_file: Option<PathBuf>,
    },
    /// Instants two bodies are a fixed angle apart (lon1 - lon2)
    Aspects {
        #[arg(long)]
        body1: Body,
        #[arg(long)]
        body2: Body,
        /// Separation in degrees [0, 360)
        #[arg(long, default_value_t = 0.0)]
        angle: f64,
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        window: WindowArgs,
        /// Sampling step in days (default chosen from the faster body)
        #[arg(long)]
        step: Option<f64>,
        #[arg(long)]
        output_file: Option<PathBuf>,
    },
    /// Retrograde and direct stations
    Stations {
        #[arg(long)]
        body: Body,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long)]
        output_file: Option<PathBuf>,
    },
    /// Instants N cycles of travel before (or after) each reference
    Lookback {
        #[command(flatten)]
        references: ReferenceArgs,
        #[command(flatten)]
        tracks: TracksArgs,
        /// Cycle count, repeatable
        #[arg(long = "multiple", default_values_t = [1.0])]
        multiples: Vec<f64>,
        /// Project forward instead of looking back
        #[arg(long)]
        forward: bool,
        #[arg(long)]
        output_file: PathBuf,
    },
    /// Detect swing highs and lows in a price CSV and save them as a swing file
    Swings {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
        #[command(flatten)]
        swings: SwingArgs,
        /// Name stored in the swing file (defaults to the input file stem)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        output_file: PathBuf,
    },
    /// Longitudes and pairwise differences at each reference
    Differences {
        #[command(flatten)]
        references: ReferenceArgs,
        #[command(flatten)]
        tracks: TracksArgs,
        #[arg(long)]
        output_file: PathBuf,
    },
    /// Returns to each reference's longitude, matched to the nearest swing
    Repetition {
        #[command(flatten)]
        references: ReferenceArgs,
        #[command(flatten)]
        tracks: TracksArgs,
        /// Degree step between projected levels
        #[arg(long, default_value_t = 360.0)]
        increment: f64,
        #[arg(long, default_value_t = 365.25)]
        horizon_days: f64,
        #[arg(long, value_enum, default_value_t)]
        filter: FilterArg,
        #[arg(long)]
        output_file: PathBuf,
    },
    /// Run every job in a JSON job file
    Run {
        #[arg(long)]
        config: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pct=debug" } else { "pct=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn resolve_jd(text: &str, tz: Tz) -> Result<f64, CliError> {
    Ok(datetime_to_jd(&parse_timestamp(text, tz)?))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let tz = parse_timezone(&cli.timezone)?;
    let eph = cli.ephemeris.source().build()?;

    match cli.command {
        Commands::Position { timestamp, tracks } => {
            let jd = resolve_jd(&timestamp, tz)?;
            let mut rows = Vec::new();
            for track in tracks.tracks() {
                let pos = eph.position(&track.query(jd))?;
                let state = eph.longitude_state(&track.query(jd))?;
                rows.push(report::position_row(&track, &pos, &state));
            }
            report::emit(None, &report::POSITION_HEADER, rows)?;
        }

        Commands::Ephemeris {
            window,
            tracks,
            interval,
            output_file,
        } => {
            let config = EphemerisSheetConfig {
                window: window.window(),
                interval_days: interval,
                tracks: tracks.tracks(),
                timezone: cli.timezone.clone(),
                output: output_file,
            };
            run_ephemeris_sheet(&eph, &config)?;
        }

        Commands::Crossings {
            body,
            target,
            view,
            window,
            filter,
            step,
            tolerance,
            output_file,
        } => {
            let (jd_start, jd_end) = window.window().resolve(tz)?;
            let mut config = CrossingConfig::for_body(body);
            config.max_time_error_days = tolerance;
            if let Some(step) = step {
                config.step_days = step;
            }
            let track = view.track(body);
            let events = body_crossings(
                &eph,
                &track,
                target,
                jd_start,
                jd_end,
                filter.into(),
                &config,
            )?;
            info!(count = events.len(), "crossings found");
            let rows = events
                .iter()
                .map(|e| report::crossing_row(&track, e, tz))
                .collect::<Result<Vec<_>, _>>()?;
            report::emit(output_file.as_deref(), &report::CROSSING_HEADER, rows)?;
        }

        Commands::Aspects {
            body1,
            body2,
            angle,
            view,
            window,
            step,
            output_file,
        } => {
            let (jd_start, jd_end) = window.window().resolve(tz)?;
            let default_step = CrossingConfig::for_body(body1)
                .step_days
                .min(CrossingConfig::for_body(body2).step_days);
            let config = SeparationConfig::aspect(angle, step.unwrap_or(default_step));
            let (t1, t2) = (view.track(body1), view.track(body2));
            let events = search_separations(&eph, &t1, &t2, jd_start, jd_end, &config)?;
            info!(count = events.len(), "separations found");
            let rows = events
                .iter()
                .map(|e| report::separation_row(&t1, &t2, e, tz))
                .collect::<Result<Vec<_>, _>>()?;
            report::emit(output_file.as_deref(), &report::SEPARATION_HEADER, rows)?;
        }

        Commands::Stations {
            body,
            window,
            output_file,
        } => {
            let (jd_start, jd_end) = window.window().resolve(tz)?;
            let track = Track::geocentric(body);
            let events = search_stationary(
                &eph,
                &track,
                jd_start,
                jd_end,
                &StationaryConfig::for_body(body),
            )?;
            info!(count = events.len(), "stations found");
            let rows = events
                .iter()
                .map(|e| report::station_row(e, tz))
                .collect::<Result<Vec<_>, _>>()?;
            report::emit(output_file.as_deref(), &report::STATION_HEADER, rows)?;
        }

        Commands::Lookback {
            references,
            tracks,
            multiples,
            forward,
            output_file,
        } => {
            let config = LookbackConfig {
                references: references.source(&cli.timezone)?,
                tracks: tracks.tracks(),
                multiples,
                direction: if forward {
                    SearchDirection::Forward
                } else {
                    SearchDirection::Backward
                },
                travel: Default::default(),
                timezone: cli.timezone.clone(),
                output: output_file,
            };
            run_lookback(&eph, &config)?;
        }

        Commands::Swings {
            input,
            layout,
            swings,
            name,
            description,
            output_file,
        } => {
            let bars = read_price_bars(&input, &layout.layout(&cli.timezone))?;
            let detected = detect_swings(&bars, &swings.config())?;
            let name = name.unwrap_or_else(|| {
                input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            let mut file = SwingFile::new(name, detected);
            file.description = description;
            file.source = Some(input.display().to_string());
            file.save(&output_file)?;
            info!(
                bars = bars.len(),
                swings = file.swings.len(),
                output = %output_file.display(),
                "swing file written"
            );
        }

        Commands::Differences {
            references,
            tracks,
            output_file,
        } => {
            let config = DifferencesConfig {
                references: references.source(&cli.timezone)?,
                tracks: tracks.tracks(),
                timezone: cli.timezone.clone(),
                output: output_file,
            };
            run_differences(&eph, &config)?;
        }

        Commands::Repetition {
            references,
            tracks,
            increment,
            horizon_days,
            filter,
            output_file,
        } => {
            let config = RepetitionConfig {
                references: references.source(&cli.timezone)?,
                tracks: tracks.tracks(),
                increment_deg: increment,
                horizon_days,
                filter: filter.into(),
                crossing: None,
                timezone: cli.timezone.clone(),
                output: output_file,
            };
            run_repetition(&eph, &config)?;
        }

        Commands::Run { config } => {
            let jobs = JobFile::load(&config)?;
            let rows = jobs.run_all()?;
            info!(jobs = jobs.jobs.len(), rows, "job file complete");
        }
    }
    Ok(())
}
