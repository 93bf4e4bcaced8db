//! CLI entry point for the station zones tool.
//!
//! Loads base stations from a spreadsheet, optionally fetches measured
//! handover averages, and reports per-zone station metrics.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use station_zones::config::Config;
use station_zones::fetch::BasicClient;
use station_zones::handover::{ApiHandoverProvider, enrich};
use station_zones::output::{append_record, print_pretty, to_json};
use station_zones::parser::{ParseOptions, RowPolicy, SheetSelector, StationParser};
use station_zones::summary::ZoneSummary;
use station_zones::{BuildType, StationRecord, Zone};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "station_zones")]
#[command(about = "Group base stations into zones and compute per-zone metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Spreadsheet with one base station per row (xlsx, xls, ods, csv, tsv)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Field delimiter for csv files
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Skip malformed rows instead of aborting
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,

    /// Fetch measured handover averages from the handover API
    #[arg(long, default_value_t = false)]
    with_handover: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stations parsed from a spreadsheet
    Stations {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Build a zone from every station in the spreadsheet and report its metrics
    Count {
        #[command(flatten)]
        input: InputArgs,

        /// Zone name
        #[arg(short, long)]
        zone: String,

        /// Zone area in km²
        #[arg(short, long)]
        area: f64,

        /// Build type: hard, medium or light (or плотная, средняя, сельская)
        #[arg(short, long, default_value = "hard", value_parser = parse_build_type)]
        build_type: BuildType,

        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append the summary to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_build_type(s: &str) -> std::result::Result<BuildType, String> {
    s.parse().map_err(|e: station_zones::Error| e.to_string())
}

fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let config = Config::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = Path::new(&config.log_file_path);
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("station_zones.log"));

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
        Commands::Stations { input } => {
            let stations = load_stations(&input, &config).await?;

            for station in &stations {
                info!(
                    station_id = station.id(),
                    name = station.name().unwrap_or(""),
                    latitude = station.latitude(),
                    longitude = station.longitude(),
                    radius_km = ?station.radius_km(),
                    handover_ok = ?station.is_handover_ok(),
                    "Station"
                );
            }
            info!(total = stations.len(), "Station list loaded");
        }
        Commands::Count {
            input,
            zone,
            area,
            build_type,
            json,
            output,
        } => {
            let stations = load_stations(&input, &config).await?;
            let zone = Zone::new(zone, area, build_type, stations)?;

            println!("n = {}", zone.n_stations());

            let summary = ZoneSummary::from_zone(&zone);
            print_pretty(&summary);
            info!(
                zone = %summary.zone,
                build_type = %summary.build_type,
                n_stations = summary.n_stations,
                station_density = summary.station_density,
                cluster_c = ?summary.cluster_c,
                cell_estimate = ?summary.cell_estimate,
                handover_ok_pct = summary.handover_ok_pct(),
                "Zone summary"
            );

            if json {
                println!("{}", to_json(&summary)?);
            }
            if let Some(path) = output {
                append_record(&path, &summary)
                    .with_context(|| format!("Failed to append summary to {}", path.display()))?;
                info!(path = %path.display(), "Summary appended");
            }
        }
    }

    Ok(())
}

/// Parses the spreadsheet and, when asked, fills in handover averages.
#[tracing::instrument(skip_all, fields(file = %input.file.display()))]
async fn load_stations(input: &InputArgs, config: &Config) -> Result<Vec<StationRecord>> {
    let parser = StationParser::new(ParseOptions {
        row_policy: if input.skip_invalid {
            RowPolicy::Skip
        } else {
            RowPolicy::Strict
        },
        sheet: input
            .sheet
            .clone()
            .map_or(SheetSelector::First, SheetSelector::Named),
        delimiter: input.delimiter,
    });

    let report = parser
        .parse(&input.file)
        .with_context(|| format!("Failed to parse {}", input.file.display()))?;

    for skipped in &report.skipped {
        warn!(row = skipped.row, error = %skipped.message, "Row skipped");
    }

    if !input.with_handover {
        return Ok(report.stations);
    }

    let client = BasicClient::new(config.handover_timeout)?;
    let provider = ApiHandoverProvider::new(client, config.handover_api_url.clone());
    info!(base_url = provider.base_url(), "Fetching handover averages");

    Ok(enrich(&provider, report.stations, config.handover_fallback).await?)
}
