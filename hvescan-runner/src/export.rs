//! Reporting and export: CSV, JSON, wide historical CSV and ticker cards.
//!
//! Provides the artifact formats for a screening run:
//! - **CSV**: one flat row per ticker
//! - **JSON**: full per-timeframe report with schema versioning
//! - **Wide historical CSV**: `Symbol,timeframe,HVE_date_1,HVE_vol_1,...` for
//!   record events (HVE) or top volume days (HVD), padded with empty cells
//! - **Ticker cards**: plain-text summary per ticker across timeframes
//!
//! JSON artifacts include a `schema_version` field. Newer versions are
//! rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hvescan_core::detect::VolumeDay;

use crate::config::ExportConfig;
use crate::pipeline::TimeframeReport;
use crate::result::ScreeningResult;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

const DATE_FMT: &str = "%Y-%m-%d";

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

// ─── JSON export ────────────────────────────────────────────────────

/// A timeframe report as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_hash: String,
    pub report: TimeframeReport,
}

pub fn export_json(report: &TimeframeReport, config_hash: &str) -> Result<String> {
    let doc = ReportDocument {
        schema_version: SCHEMA_VERSION,
        config_hash: config_hash.to_string(),
        report: report.clone(),
    };
    serde_json::to_string_pretty(&doc).context("failed to serialize report to JSON")
}

/// Deserialize a report, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<ReportDocument> {
    let doc: ReportDocument =
        serde_json::from_str(json).context("failed to deserialize report from JSON")?;
    if doc.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            doc.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(doc)
}

// ─── Flat CSV export ────────────────────────────────────────────────

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One row per result.
///
/// Columns: ticker, timeframe, hve_date, hve_volume, days_since_hve,
/// hve_occ_1y, total_hve_count, hv1y_date, hv1y_volume, days_since_hv1y,
/// total_hv1y_count, is_hv1y_also_hve, hv1y_to_hve_ratio, latest_date,
/// latest_volume, latest_close, volume_ratio, data_points, score
pub fn export_results_csv(results: &[ScreeningResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ticker",
        "timeframe",
        "hve_date",
        "hve_volume",
        "days_since_hve",
        "hve_occ_1y",
        "total_hve_count",
        "hv1y_date",
        "hv1y_volume",
        "days_since_hv1y",
        "total_hv1y_count",
        "is_hv1y_also_hve",
        "hv1y_to_hve_ratio",
        "latest_date",
        "latest_volume",
        "latest_close",
        "volume_ratio",
        "data_points",
        "score",
    ])?;

    for r in results {
        let hv1y = r.hv1y.as_ref();
        wtr.write_record([
            r.ticker.clone(),
            r.timeframe.to_string(),
            r.hve_date.format(DATE_FMT).to_string(),
            r.hve_volume.to_string(),
            r.days_since_hve.to_string(),
            r.hve_occ_1y.to_string(),
            r.total_hve_count.to_string(),
            opt(hv1y.map(|h| h.hv1y_date.format(DATE_FMT))),
            opt(hv1y.map(|h| h.hv1y_volume)),
            opt(hv1y.map(|h| h.days_since_hv1y)),
            opt(hv1y.map(|h| h.total_hv1y_count)),
            opt(hv1y.map(|h| h.is_hv1y_also_hve)),
            opt(hv1y.map(|h| format!("{:.4}", h.hv1y_to_hve_ratio))),
            r.latest_date.format(DATE_FMT).to_string(),
            r.latest_volume.to_string(),
            opt(r.latest_close.map(|c| format!("{c:.4}"))),
            format!("{:.4}", r.volume_ratio),
            r.data_points.to_string(),
            opt(r.score.map(|s| format!("{s:.2}"))),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Wide historical export ─────────────────────────────────────────

/// Which list a wide historical file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoricalKind {
    /// Record events, most recent first.
    Hve,
    /// Top volume days, largest first.
    Hvd,
}

impl HistoricalKind {
    pub fn prefix(self) -> &'static str {
        match self {
            HistoricalKind::Hve => "HVE",
            HistoricalKind::Hvd => "HVD",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "HVE" => Some(HistoricalKind::Hve),
            "HVD" => Some(HistoricalKind::Hvd),
            _ => None,
        }
    }

    fn entries(self, result: &ScreeningResult) -> Vec<VolumeDay> {
        match self {
            HistoricalKind::Hve => result.all_hve_details.iter().map(VolumeDay::from).collect(),
            HistoricalKind::Hvd => result.top_volume_days.iter().flatten().copied().collect(),
        }
    }
}

/// One row of a wide historical file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRow {
    pub symbol: String,
    pub timeframe: String,
    /// Exactly as many slots as the file has column pairs.
    pub entries: Vec<Option<VolumeDay>>,
}

pub fn wide_header(kind: HistoricalKind, width: usize) -> Vec<String> {
    let prefix = kind.prefix();
    let mut header = vec!["Symbol".to_string(), "timeframe".to_string()];
    for i in 1..=width {
        header.push(format!("{prefix}_date_{i}"));
        header.push(format!("{prefix}_vol_{i}"));
    }
    header
}

/// Wide export truncated or padded to `width` slots. Tickers with an empty
/// list are left out.
pub fn export_historical(
    kind: HistoricalKind,
    results: &[ScreeningResult],
    width: usize,
) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(wide_header(kind, width))?;

    let mut written = 0usize;
    for r in results {
        let entries = kind.entries(r);
        if entries.is_empty() {
            tracing::warn!(ticker = %r.ticker, kind = kind.prefix(), "no entries, row skipped");
            continue;
        }
        let mut record = vec![r.ticker.clone(), r.timeframe.to_string()];
        for slot in 0..width {
            match entries.get(slot) {
                Some(day) => {
                    record.push(day.date.format(DATE_FMT).to_string());
                    record.push(day.volume.to_string());
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }
        wtr.write_record(&record)?;
        written += 1;
    }
    tracing::debug!(kind = kind.prefix(), rows = written, width, "wide export");

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_hve_historical(results: &[ScreeningResult], max_events: usize) -> Result<String> {
    export_historical(HistoricalKind::Hve, results, max_events)
}

pub fn export_hvd_historical(results: &[ScreeningResult], max_days: usize) -> Result<String> {
    export_historical(HistoricalKind::Hvd, results, max_days)
}

/// Read a wide historical file back. The kind is taken from the header.
pub fn import_historical(text: &str) -> Result<(HistoricalKind, Vec<HistoricalRow>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let header = rdr.headers().context("wide file has no header")?.clone();

    let kind = header
        .get(2)
        .and_then(|h| h.split('_').next())
        .and_then(HistoricalKind::from_prefix)
        .context("wide file header does not start an HVE or HVD column pair")?;
    if header.len() % 2 != 0 {
        bail!("wide file has an odd number of columns: {}", header.len());
    }
    let width = (header.len() - 2) / 2;

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("bad record at row {}", line + 1))?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim();

        let mut entries = Vec::with_capacity(width);
        for slot in 0..width {
            let (date, volume) = (cell(2 + slot * 2), cell(3 + slot * 2));
            if date.is_empty() && volume.is_empty() {
                entries.push(None);
                continue;
            }
            let date = NaiveDate::parse_from_str(date, DATE_FMT)
                .with_context(|| format!("bad date {date:?} at row {}", line + 1))?;
            let volume: u64 = volume
                .parse()
                .with_context(|| format!("bad volume {volume:?} at row {}", line + 1))?;
            entries.push(Some(VolumeDay { date, volume }));
        }
        rows.push(HistoricalRow {
            symbol: cell(0).to_string(),
            timeframe: cell(1).to_string(),
            entries,
        });
    }
    Ok((kind, rows))
}

// ─── Ticker cards ───────────────────────────────────────────────────

const RULE_WIDTH: usize = 80;

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn event_line(idx: usize, date: NaiveDate, volume: u64, latest: NaiveDate) -> String {
    format!(
        "  {idx}. {}  Volume: {}  ({} days ago)",
        date.format(DATE_FMT),
        group_thousands(volume),
        (latest - date).num_days()
    )
}

/// Text card for one ticker. `rows` holds that ticker's result on each
/// timeframe, in display order.
pub fn ticker_card(ticker: &str, rows: &[&ScreeningResult], generated: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let dash = "-".repeat(40);
    let mut lines = vec![
        rule.clone(),
        format!("TICKER CARD: {ticker}"),
        rule.clone(),
        format!("Generated: {generated}"),
        String::new(),
    ];

    for r in rows {
        let title = format!("{} TIMEFRAME", r.timeframe.as_str().to_uppercase());
        lines.push(String::new());
        lines.push(title.clone());
        lines.push("=".repeat(title.len()));

        lines.push(String::new());
        lines.push("HVE Events (Highest Volume Ever):".to_string());
        lines.push(dash.clone());
        if r.all_hve_details.is_empty() {
            lines.push("  No HVE events found".to_string());
        }
        for (i, e) in r.all_hve_details.iter().enumerate() {
            lines.push(event_line(i + 1, e.date, e.volume, r.latest_date));
        }

        if let Some(hv1y) = &r.hv1y {
            lines.push(String::new());
            lines.push("HV1Y Events (Highest Volume in 1 Year):".to_string());
            lines.push(dash.clone());
            if hv1y.events.is_empty() {
                lines.push("  No HV1Y events found".to_string());
            }
            for (i, e) in hv1y.events.iter().enumerate() {
                let mut line = event_line(i + 1, e.date, e.volume, r.latest_date);
                if e.date == r.hve_date {
                    line.push_str("  [Also HVE]");
                }
                lines.push(line);
            }
        }
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.push(dash);
    let total_hve: usize = rows.iter().map(|r| r.all_hve_details.len()).sum();
    lines.push(format!("Total HVE events across all timeframes: {total_hve}"));
    if rows.iter().any(|r| r.hv1y.is_some()) {
        let total_hv1y: usize = rows
            .iter()
            .filter_map(|r| r.hv1y.as_ref())
            .map(|h| h.events.len())
            .sum();
        lines.push(format!("Total HV1Y events across all timeframes: {total_hv1y}"));
    }
    // First timeframe wins ties.
    let mut most_recent: Option<&ScreeningResult> = None;
    for r in rows {
        if most_recent.map_or(true, |m| r.days_since_hve < m.days_since_hve) {
            most_recent = Some(r);
        }
    }
    if let Some(r) = most_recent {
        lines.push(format!(
            "Latest volume activity: {} ({} days ago)",
            capitalize(r.timeframe.as_str()),
            r.days_since_hve
        ));
    }
    lines.push(String::new());
    lines.push(rule);

    lines.join("\n")
}

/// Cards for every ticker appearing in any report, keyed by ticker.
pub fn ticker_cards(reports: &[TimeframeReport], generated: &str) -> BTreeMap<String, String> {
    let mut by_ticker: BTreeMap<&str, Vec<&ScreeningResult>> = BTreeMap::new();
    for report in reports {
        for r in &report.results {
            by_ticker.entry(r.ticker.as_str()).or_default().push(r);
        }
    }
    by_ticker
        .into_iter()
        .map(|(ticker, rows)| (ticker.to_string(), ticker_card(ticker, &rows, generated)))
        .collect()
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a screening run.
///
/// Creates a directory named `hvescan_{timestamp}/` under `output_dir`
/// containing, per timeframe `{tf}`:
/// - `hve_results_{tf}.csv`: flat results, ascending by days since the high
/// - `hve_ranked_{tf}.csv`: scored results, descending by score
/// - `hve_report_{tf}.json`: the full report
/// - `HVE_historical_{tf}.csv` / `HVD_historical_{tf}.csv`, when enabled
///
/// plus `ticker_cards/{TICKER}.txt` when enabled.
///
/// Returns the path to the created directory.
pub fn save_artifacts(
    reports: &[TimeframeReport],
    export: &ExportConfig,
    config_hash: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let now = chrono::Local::now();
    let run_dir = output_dir.join(format!("hvescan_{}", now.format("%Y%m%d_%H%M%S")));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: String, content: &str| -> Result<()> {
        let path = run_dir.join(&name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))
    };

    for report in reports {
        let tf = report.timeframe.as_str();
        write(format!("hve_results_{tf}.csv"), &export_results_csv(&report.results)?)?;
        write(format!("hve_ranked_{tf}.csv"), &export_results_csv(&report.ranked)?)?;
        write(format!("hve_report_{tf}.json"), &export_json(report, config_hash)?)?;

        if export.hve_historical && !report.results.is_empty() {
            let text = export_hve_historical(&report.results, export.max_events)?;
            write(format!("HVE_historical_{tf}.csv"), &text)?;
        }
        if export.hvd_historical && !report.results.is_empty() {
            let text = export_hvd_historical(&report.results, export.max_days)?;
            write(format!("HVD_historical_{tf}.csv"), &text)?;
        }
    }

    if export.ticker_cards {
        let cards_dir = run_dir.join("ticker_cards");
        std::fs::create_dir_all(&cards_dir)
            .with_context(|| format!("failed to create {}", cards_dir.display()))?;
        let generated = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let cards = ticker_cards(reports, &generated);
        for (ticker, card) in &cards {
            std::fs::write(cards_dir.join(format!("{ticker}.txt")), card)
                .with_context(|| format!("failed to write ticker card for {ticker}"))?;
        }
        tracing::info!(cards = cards.len(), dir = %cards_dir.display(), "ticker cards written");
    }

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load every JSON report from an artifact directory, sorted by file name.
pub fn load_reports(dir: &Path) -> Result<Vec<ReportDocument>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("hve_report_") && n.ends_with(".json"))
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|p| {
            let json = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read {}", p.display()))?;
            import_json(&json)
        })
        .collect()
}
