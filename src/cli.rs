//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_store::CsvStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{resolve_settings, Overrides};
use crate::domain::error::TvlError;
use crate::domain::settings::{Settings, DEFAULT_CONFIG_PATH};
use crate::domain::summary::Summary;
use crate::ports::dataset_port::DatasetPort;

#[derive(Parser, Debug)]
#[command(
    name = "tvltracker",
    about = "Daily TVL dataset refresher",
    long_about = "Keeps a CSV of daily TVL per asset category up to date. \
                  Without a subcommand, runs `update` with default settings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and append today's TVL rows if they are missing
    Update {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Dataset CSV path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Analytics API endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Print derived figures for the stored dataset
    Summary {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Number of most recent daily totals to list
        #[arg(long, default_value_t = 7)]
        days: usize,
        /// Emit the full summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file and show the resolved settings
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        None => run_update(None, Overrides::default()),
        Some(Command::Update {
            config,
            data,
            endpoint,
        }) => run_update(
            config.as_deref(),
            Overrides {
                endpoint,
                data_path: data,
            },
        ),
        Some(Command::Summary {
            config,
            data,
            days,
            json,
        }) => run_summary(
            config.as_deref(),
            Overrides {
                endpoint: None,
                data_path: data,
            },
            days,
            json,
        ),
        Some(Command::CheckConfig { config }) => run_check_config(&config),
    }
}

/// Loads `path` if given. Otherwise reads `tvltracker.ini` from the working
/// directory when present, falling back to an empty config.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, TvlError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    if !required && !path.exists() {
        return Ok(FileConfigAdapter::empty());
    }
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(&path).map_err(|e| TvlError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_settings(path: Option<&Path>, overrides: &Overrides) -> Result<Settings, TvlError> {
    let config = load_config(path)?;
    resolve_settings(&config, overrides)
}

fn run_update(config_path: Option<&Path>, overrides: Overrides) -> ExitCode {
    let settings = match load_settings(config_path, &overrides) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    #[cfg(feature = "http")]
    {
        use crate::adapters::http_fetcher::HttpFetcher;
        use crate::domain::upsert::run_daily_upsert;
        use chrono::Utc;

        let store = CsvStore::new(&settings.data_path);
        let fetcher = match HttpFetcher::new(settings.timeout) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let today = Utc::now().date_naive();
        info!(
            data = %settings.data_path.display(),
            endpoint = %settings.endpoint,
            %today,
            "running daily update"
        );

        match run_daily_upsert(&store, &fetcher, settings.request_url().as_str(), today) {
            Ok(outcome) => {
                println!("{outcome}");
                outcome.exit_code()
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        }
    }

    #[cfg(not(feature = "http"))]
    {
        let _ = settings;
        eprintln!("error: http feature is required for update");
        ExitCode::from(1)
    }
}

fn run_summary(config_path: Option<&Path>, overrides: Overrides, days: usize, json: bool) -> ExitCode {
    let settings = match load_settings(config_path, &overrides) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let dataset = match CsvStore::new(&settings.data_path).load() {
        Ok(ds) => ds,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let summary = Summary::compute(&dataset);

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("error: failed to encode summary: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        print!("{}", render_summary(&summary, days));
    }
    ExitCode::SUCCESS
}

/// Plain-text rendering of a [`Summary`], listing the last `days` daily totals.
pub fn render_summary(summary: &Summary, days: usize) -> String {
    let mut out = String::new();

    let Some(latest) = &summary.latest else {
        out.push_str("No TVL data recorded.\n");
        return out;
    };

    let _ = writeln!(out, "=== Latest Day ({}) ===", latest.date);
    for asset in &latest.by_asset {
        let _ = writeln!(out, "  {:<12} ${:>18.0}", asset.asset_type, asset.tvl);
    }
    let _ = writeln!(out, "  {:<12} ${:>18.0}", "Total", latest.total);
    match (latest.previous_date, latest.pct_change) {
        (Some(prev), Some(pct)) => {
            let sign = if pct >= 0.0 { "+" } else { "" };
            let _ = writeln!(out, "  Change vs {}: {}{:.2}%", prev, sign, pct);
        }
        (Some(prev), None) => {
            let _ = writeln!(out, "  Change vs {}: n/a", prev);
        }
        _ => {}
    }

    let _ = writeln!(out, "\n=== Daily Totals ===");
    let skip = summary.daily_totals.len().saturating_sub(days);
    for total in summary.daily_totals.iter().skip(skip) {
        let _ = writeln!(out, "  {}  ${:>18.0}", total.date, total.tvl);
    }

    let _ = writeln!(out, "\n=== Monthly Stats ===");
    let _ = writeln!(
        out,
        "  {:<8} {:<12} {:>18} {:>18} {:>18}",
        "month", "asset_type", "max", "mean", "min"
    );
    for stat in &summary.monthly_stats {
        let _ = writeln!(
            out,
            "  {:<8} {:<12} {:>18.0} {:>18.0} {:>18.0}",
            stat.month.format("%Y-%m").to_string(),
            stat.asset_type,
            stat.max,
            stat.mean,
            stat.min
        );
    }

    if let Some(first) = summary.first_date {
        let _ = writeln!(
            out,
            "\n{} rows from {} to {}",
            summary.rows, first, latest.date
        );
    }
    out
}

/// Loads and validates the config at `path`, resolving it as an update run
/// without overrides would.
pub fn check_config(path: &Path) -> Result<Settings, TvlError> {
    let config = load_config(Some(path))?;
    resolve_settings(&config, &Overrides::default())
}

fn run_check_config(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let settings = match check_config(config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!("endpoint:     {}", settings.endpoint);
    println!(
        "api_key:      {}",
        if settings.api_key.is_some() { "set" } else { "not set" }
    );
    println!("timeout_secs: {}", settings.timeout.as_secs());
    println!("data path:    {}", settings.data_path.display());
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
