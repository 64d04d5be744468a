//! HVE Scan CLI: screening, validation and single-file detection commands.
//!
//! Commands:
//! - `screen`: run the multi-timeframe screener over a data directory
//! - `validate`: check one price file for screening eligibility
//! - `detect`: print record/window/top-volume detection for one price file
//! - `synth`: write deterministic synthetic price files for a ticker list

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use hvescan_core::data::{read_series_csv, synthetic_series, write_series_csv, Universe};
use hvescan_core::detect::{EventDetector, HvdSource};
use hvescan_core::domain::Timeframe;
use hvescan_core::validation::SeriesValidator;
use hvescan_runner::config::MAX_WINDOW_DAYS;
use hvescan_runner::{run_pipeline, save_artifacts, ScreenConfig, TimeframeReport};

#[derive(Parser)]
#[command(
    name = "hvescan",
    about = "HVE Scan: highest-volume-ever screener for daily, weekly and monthly bars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen every ticker in a universe and save the artifact set.
    Screen {
        /// Path to a TOML run config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory laid out as {data_dir}/{timeframe}/{TICKER}.csv.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Ticker universe file (.toml or .csv).
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Tickers given directly (e.g., AAPL MSFT). Combined with --universe.
        #[arg(long, num_args = 1..)]
        tickers: Vec<String>,

        /// Output directory for the artifact set.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Number of rows to print per timeframe.
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Check whether a price file is eligible for screening.
    Validate {
        /// Price file (CSV).
        csv: PathBuf,

        /// Timeframe of the file: daily, weekly, monthly.
        #[arg(long, default_value = "daily")]
        timeframe: String,

        /// Override the timeframe's minimum bar count.
        #[arg(long)]
        min_bars: Option<usize>,
    },
    /// Print detection output for one price file as JSON.
    Detect {
        /// Price file (CSV).
        csv: PathBuf,

        /// Trailing window in calendar days; 0 disables the window scan.
        #[arg(
            long,
            default_value_t = 365,
            value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_WINDOW_DAYS))
        )]
        window_days: u32,

        /// Number of top-volume days.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Rank top-volume days over record events only.
        #[arg(long, default_value_t = false)]
        records_only: bool,
    },
    /// Write synthetic daily price files for testing.
    Synth {
        /// Tickers to generate.
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long, default_value = "2020-01-01")]
        start: String,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Data directory; files land in {data_dir}/daily/.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            config,
            data_dir,
            universe,
            tickers,
            output_dir,
            top,
        } => run_screen(config, &data_dir, universe, tickers, &output_dir, top),
        Commands::Validate {
            csv,
            timeframe,
            min_bars,
        } => run_validate(&csv, &timeframe, min_bars),
        Commands::Detect {
            csv,
            window_days,
            top,
            records_only,
        } => run_detect(&csv, window_days, top, records_only),
        Commands::Synth {
            tickers,
            start,
            end,
            data_dir,
        } => run_synth(&tickers, &start, end.as_deref(), &data_dir),
    }
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn ticker_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .with_context(|| format!("cannot derive a ticker from {}", path.display()))
}

fn run_screen(
    config_path: Option<PathBuf>,
    data_dir: &Path,
    universe_path: Option<PathBuf>,
    tickers: Vec<String>,
    output_dir: &Path,
    top: usize,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ScreenConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScreenConfig::default(),
    };

    let mut universe = match universe_path {
        Some(path) => Universe::from_file(&path)
            .with_context(|| format!("failed to load universe {}", path.display()))?,
        None => Universe::default(),
    };
    universe.tickers.extend(tickers);
    if universe.is_empty() {
        bail!("no tickers: pass --universe or --tickers");
    }

    let config_hash = config.config_hash();
    let export = config.export.clone();
    tracing::info!(
        tickers = universe.all_tickers().len(),
        config_hash = %&config_hash[..12.min(config_hash.len())],
        "starting screen"
    );

    let reports = run_pipeline(config, data_dir, &universe)?;
    for report in &reports {
        print_report(report, top);
    }

    let run_dir = save_artifacts(&reports, &export, &config_hash, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn print_report(report: &TimeframeReport, top: usize) {
    let s = report.summary;
    println!();
    println!("=== {} ===", report.timeframe.as_str().to_uppercase());
    println!(
        "Attempted: {}  Loaded: {}  Valid: {}  Detected: {}  Skipped: {}",
        s.attempted, s.loaded, s.valid, s.detected, s.skipped
    );
    if report.ranked.is_empty() {
        println!("No results.");
        return;
    }
    println!(
        "{:<10} {:>7} {:>12} {:>10} {:>7} {:>7} {:>7}",
        "Ticker", "Score", "HVE Date", "Days Ago", "Count", "Occ1Y", "Ratio"
    );
    for r in report.ranked.iter().take(top) {
        println!(
            "{:<10} {:>7.2} {:>12} {:>10} {:>7} {:>7} {:>7.3}",
            r.ticker,
            r.score.unwrap_or(0.0),
            r.hve_date.to_string(),
            r.days_since_hve,
            r.total_hve_count,
            r.hve_occ_1y,
            r.volume_ratio
        );
    }
    for rejection in &report.rejections {
        tracing::debug!(
            ticker = %rejection.ticker,
            stage = ?rejection.stage,
            reason = %rejection.reason,
            "rejected"
        );
    }
}

fn run_validate(csv: &Path, timeframe: &str, min_bars: Option<usize>) -> Result<()> {
    let ticker = ticker_from_path(csv)?;
    let series = read_series_csv(csv, &ticker)?;
    let timeframe = Timeframe::from(timeframe.to_string());

    let mut validator = SeriesValidator::new();
    if let Some(n) = min_bars {
        validator = validator.with_min_bars(n);
    }
    let validation = validator.validate(&series, &timeframe);

    println!(
        "{ticker} ({timeframe}, {} bars): {}",
        series.len(),
        validation.reason
    );
    if !validation.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn run_detect(csv: &Path, window_days: u32, top: usize, records_only: bool) -> Result<()> {
    let ticker = ticker_from_path(csv)?;
    let series = read_series_csv(csv, &ticker)?;
    if series.is_empty() {
        bail!("{} has no usable rows", csv.display());
    }

    let detector = EventDetector {
        window_days: (window_days > 0).then_some(window_days),
        top_k: top,
        hvd_source: if records_only {
            HvdSource::Records
        } else {
            HvdSource::AllDays
        },
    };
    let detection = detector.detect(&series);
    let json = serde_json::to_string_pretty(&detection).context("failed to serialize detection")?;
    println!("{json}");
    Ok(())
}

fn run_synth(tickers: &[String], start: &str, end: Option<&str>, data_dir: &Path) -> Result<()> {
    let start = parse_day(start)?;
    let end = match end {
        Some(s) => parse_day(s)?,
        None => chrono::Local::now().date_naive(),
    };
    if start > end {
        bail!("start {start} is after end {end}");
    }

    for ticker in tickers {
        let ticker = ticker.to_uppercase();
        let series = synthetic_series(&ticker, start, end);
        let path = data_dir.join("daily").join(format!("{ticker}.csv"));
        write_series_csv(&path, &series)?;
        println!("{ticker}: {} bars -> {}", series.len(), path.display());
    }
    Ok(())
}
