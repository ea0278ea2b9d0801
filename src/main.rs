//! CLI entry point for the mobility evaluation tool.
//!
//! `compare` summarizes an observed trip table next to taxi and transit
//! alternatives; `simulate` summarizes simulation output over time windows.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mobility_eval::evaluators::aggregate::EvalOptions;
use mobility_eval::evaluators::observed::ObservedTripEvaluator;
use mobility_eval::evaluators::simulation::{
    MeanDenominator, SimulationConfig, TrajectorySimulationEvaluator,
};
use mobility_eval::evaluators::types::ModeReport;
use mobility_eval::events::{SimEvent, VehicleTrip, load_json};
use mobility_eval::fetch::RetryPolicy;
use mobility_eval::infra::{GoogleTransitRouter, NaverRouter, ProvidersConfig, TmapRouter};
use mobility_eval::parser::{ColumnMapping, TimezonePolicy, parse_offset};
use mobility_eval::units::{DistanceUnit, TimeUnit};
use mobility_eval::window::TimeWindow;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "mobility_eval")]
#[command(about = "Compare observed and simulated trips across travel modes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// The trips as recorded
    Raw,
    /// Taxi routes from Naver
    Naver,
    /// Taxi route predictions from TMAP
    Tmap,
    /// Public transport directions from Google
    Transit,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an observed trip table against alternative modes
    Compare {
        /// CSV file of observed trips
        #[arg(long)]
        trips: String,

        /// Column rename, repeatable (e.g. pickup_time=boarded_at)
        #[arg(short = 'm', long = "map", value_name = "CANONICAL=COLUMN")]
        map: Vec<String>,

        /// JSON file mapping canonical column names to table columns
        #[arg(long)]
        columns: Option<String>,

        /// JSON file with provider credentials (falls back to environment)
        #[arg(long)]
        providers: Option<String>,

        /// Modes to evaluate, in order
        #[arg(long, value_delimiter = ',', default_value = "raw,naver,tmap,transit")]
        modes: Vec<Mode>,

        /// Distance unit for provider results
        #[arg(long, default_value = "km")]
        dist_unit: DistanceUnit,

        /// Time unit for provider results
        #[arg(long, default_value = "min")]
        time_unit: TimeUnit,

        /// Maximum number of provider queries in flight
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,

        /// Timezone policy: utc, require, or an offset such as +09:00
        #[arg(long, default_value = "utc")]
        timezone: TimezonePolicy,

        /// Offset the TMAP departure time is expressed in
        #[arg(long, default_value = "+09:00")]
        local_offset: String,

        /// Directions mode flag for the transit provider
        #[arg(long, default_value = "transit")]
        transit_mode: String,

        /// Attempts per provider query, including the first
        #[arg(long, default_value_t = 3)]
        attempts: u32,

        /// Directory for the result CSV
        #[arg(short, long, default_value = ".")]
        output_dir: String,
    },
    /// Summarize simulated waits, walks and vehicle trips
    Simulate {
        /// JSON array of vehicle trips
        #[arg(long)]
        vehicle_trips: String,

        /// JSON array of waiting events
        #[arg(long)]
        waits: String,

        /// JSON array of walking events
        #[arg(long)]
        moves: String,

        /// Time window start:end in minutes, repeatable; one row per window
        #[arg(short, long = "window")]
        windows: Vec<TimeWindow>,

        /// Distance unit for trajectory lengths
        #[arg(long, default_value = "km")]
        unit: DistanceUnit,

        /// Divide means by every event (source) or by events in the window (included)
        #[arg(long, default_value = "source")]
        mean_over: MeanDenominator,

        /// Directory for the result CSV
        #[arg(short, long, default_value = ".")]
        output_dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/mobility_eval.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("mobility_eval.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            trips,
            map,
            columns,
            providers,
            modes,
            dist_unit,
            time_unit,
            concurrency,
            timezone,
            local_offset,
            transit_mode,
            attempts,
            output_dir,
        } => {
            let mut mapping = match columns {
                Some(path) => ColumnMapping::load(&path)?,
                None => ColumnMapping::new(),
            };
            mapping.extend(
                ColumnMapping::from_pairs(map.iter().map(String::as_str))
                    .map_err(anyhow::Error::msg)?,
            );

            let providers = match providers {
                Some(path) => ProvidersConfig::load(&path)?.or(ProvidersConfig::from_env()),
                None => ProvidersConfig::from_env(),
            };
            let local_offset = parse_offset(&local_offset)
                .with_context(|| format!("invalid local offset '{local_offset}'"))?;
            let retry = RetryPolicy {
                max_attempts: attempts,
                ..Default::default()
            };
            let options = EvalOptions {
                distance_unit: dist_unit,
                time_unit,
                concurrency,
            };

            let mut evaluator = ObservedTripEvaluator::from_csv(&trips, mapping, timezone)?;
            info!(trips = evaluator.trips().len(), source = %trips, "Observed trips loaded");

            for mode in modes {
                match mode {
                    Mode::Raw => {
                        evaluator.evaluate_baseline()?;
                    }
                    Mode::Naver => {
                        let config = providers
                            .naver
                            .as_ref()
                            .context("naver credentials are not configured")?;
                        let router = Arc::new(NaverRouter::from_config(config, retry)?);
                        let report = evaluator.evaluate_taxi_mode(router, &options).await?;
                        log_report(&report);
                    }
                    Mode::Tmap => {
                        let config = providers
                            .tmap
                            .as_ref()
                            .context("tmap credentials are not configured")?;
                        let router =
                            Arc::new(TmapRouter::from_config(config, retry, local_offset)?);
                        let report = evaluator.evaluate_taxi_mode(router, &options).await?;
                        log_report(&report);
                    }
                    Mode::Transit => {
                        let config = providers
                            .google
                            .as_ref()
                            .context("google credentials are not configured")?;
                        let router = Arc::new(GoogleTransitRouter::from_config(
                            config,
                            retry,
                            &transit_mode,
                        )?);
                        let report = evaluator
                            .evaluate_public_transit_mode(router, &options)
                            .await?;
                        log_report(&report);
                    }
                }
            }

            evaluator.export(&output_dir)?;
        }
        Commands::Simulate {
            vehicle_trips,
            waits,
            moves,
            windows,
            unit,
            mean_over,
            output_dir,
        } => {
            let trips: Vec<VehicleTrip> = load_json(&vehicle_trips)
                .with_context(|| format!("loading vehicle trips from '{vehicle_trips}'"))?;
            let waits: Vec<SimEvent> =
                load_json(&waits).with_context(|| format!("loading waits from '{waits}'"))?;
            let moves: Vec<SimEvent> =
                load_json(&moves).with_context(|| format!("loading moves from '{moves}'"))?;
            info!(
                trips = trips.len(),
                waits = waits.len(),
                moves = moves.len(),
                "Simulation output loaded"
            );

            let config = SimulationConfig {
                unit,
                mean_over,
                ..Default::default()
            };
            let mut evaluator = TrajectorySimulationEvaluator::new(&trips, &waits, &moves, config);

            let windows = if windows.is_empty() {
                vec![TimeWindow::default()]
            } else {
                windows
            };
            for window in windows {
                evaluator.set_window(window);
                evaluator.evaluate(false);
            }

            evaluator.export(&output_dir)?;
        }
    }

    Ok(())
}

/// Logs how many trips a provider-backed mode could use.
fn log_report(report: &ModeReport) {
    if report.skipped.is_empty() {
        info!(mode = %report.mode, routed = report.routed(), "All trips routed");
    } else {
        warn!(
            mode = %report.mode,
            routed = report.routed(),
            skipped = report.skipped.len(),
            "Some trips could not be routed"
        );
    }
}
