//! Multi-timeframe screening over a directory of price files.
//!
//! Layout on disk is `{data_dir}/{timeframe}/{TICKER}.csv`. Each timeframe is
//! processed in batches of `batch_size` tickers: load, validate, screen. Batch
//! results are concatenated and re-sorted, then a scored copy is ranked.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use hvescan_core::data::{read_series_csv, Universe};
use hvescan_core::domain::{TimeSeries, Timeframe};
use hvescan_core::validation::SeriesValidator;

use crate::config::{ConfigError, ScreenConfig};
use crate::result::ScreeningResult;
use crate::scoring::enrich_with_scores;
use crate::screener::Screener;

/// Pipeline step at which a ticker dropped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Validation,
    Screen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub ticker: String,
    pub stage: Stage,
    pub reason: String,
}

/// Per-timeframe counters, summed over batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub loaded: usize,
    pub valid: usize,
    pub skipped: usize,
    pub detected: usize,
}

impl BatchSummary {
    fn absorb(&mut self, other: BatchSummary) {
        self.attempted += other.attempted;
        self.loaded += other.loaded;
        self.valid += other.valid;
        self.skipped += other.skipped;
        self.detected += other.detected;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeReport {
    pub timeframe: Timeframe,
    /// Ascending by `days_since_hve`.
    pub results: Vec<ScreeningResult>,
    /// Same rows, scored, descending by score.
    pub ranked: Vec<ScreeningResult>,
    pub rejections: Vec<Rejection>,
    pub summary: BatchSummary,
}

pub struct Pipeline {
    screener: Screener,
    validator: SeriesValidator,
    data_dir: PathBuf,
}

impl Pipeline {
    pub fn new(config: ScreenConfig, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self::with_screener(Screener::new(config)?, data_dir))
    }

    pub fn with_screener(screener: Screener, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            screener,
            validator: SeriesValidator::new(),
            data_dir: data_dir.into(),
        }
    }

    pub fn with_validator(mut self, validator: SeriesValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn screener(&self) -> &Screener {
        &self.screener
    }

    pub fn ticker_path(&self, timeframe: &Timeframe, ticker: &str) -> PathBuf {
        self.data_dir
            .join(timeframe.as_str())
            .join(format!("{ticker}.csv"))
    }

    fn load(&self, timeframe: &Timeframe, ticker: &str) -> Result<TimeSeries, Rejection> {
        read_series_csv(&self.ticker_path(timeframe, ticker), ticker).map_err(|e| Rejection {
            ticker: ticker.to_string(),
            stage: Stage::Load,
            reason: e.to_string(),
        })
    }

    fn run_batch(
        &self,
        timeframe: &Timeframe,
        tickers: &[String],
    ) -> (Vec<ScreeningResult>, Vec<Rejection>, BatchSummary) {
        let loaded: Vec<Result<TimeSeries, Rejection>> = if self.screener.config().parallel {
            tickers.par_iter().map(|t| self.load(timeframe, t)).collect()
        } else {
            tickers.iter().map(|t| self.load(timeframe, t)).collect()
        };

        let mut summary = BatchSummary {
            attempted: tickers.len(),
            ..BatchSummary::default()
        };
        let mut rejections = Vec::new();
        let mut valid = Vec::new();
        for outcome in loaded {
            match outcome {
                Err(rejection) => {
                    tracing::debug!(
                        ticker = %rejection.ticker,
                        reason = %rejection.reason,
                        "load failed"
                    );
                    rejections.push(rejection);
                }
                Ok(series) => {
                    summary.loaded += 1;
                    let validation = self.validator.validate(&series, timeframe);
                    if validation.is_valid {
                        valid.push(series);
                    } else {
                        tracing::debug!(
                            ticker = series.symbol(),
                            reason = %validation.reason,
                            "invalid data"
                        );
                        rejections.push(Rejection {
                            ticker: series.symbol().to_string(),
                            stage: Stage::Validation,
                            reason: validation.reason,
                        });
                    }
                }
            }
        }
        summary.valid = valid.len();

        let outcome = self.screener.screen(&valid, timeframe);
        summary.skipped = outcome.summary.skipped;
        summary.detected = outcome.summary.detected;
        rejections.extend(outcome.skipped.into_iter().map(|s| Rejection {
            ticker: s.ticker,
            stage: Stage::Screen,
            reason: s.error.to_string(),
        }));

        (outcome.results, rejections, summary)
    }

    pub fn run_timeframe(&self, timeframe: &Timeframe, tickers: &[String]) -> TimeframeReport {
        let batch_size = self.screener.config().batch_size.max(1);
        let total_batches = tickers.len().div_ceil(batch_size);

        let mut results = Vec::new();
        let mut rejections = Vec::new();
        let mut summary = BatchSummary::default();
        for (i, batch) in tickers.chunks(batch_size).enumerate() {
            tracing::info!(
                %timeframe,
                batch = i + 1,
                total_batches,
                size = batch.len(),
                "processing batch"
            );
            let (batch_results, batch_rejections, batch_summary) =
                self.run_batch(timeframe, batch);
            results.extend(batch_results);
            rejections.extend(batch_rejections);
            summary.absorb(batch_summary);
        }

        results.sort_by_key(|r| r.days_since_hve);
        let mut ranked = results.clone();
        enrich_with_scores(&mut ranked);

        tracing::info!(
            %timeframe,
            attempted = summary.attempted,
            loaded = summary.loaded,
            valid = summary.valid,
            detected = summary.detected,
            "timeframe complete"
        );

        TimeframeReport {
            timeframe: timeframe.clone(),
            results,
            ranked,
            rejections,
            summary,
        }
    }

    /// Every configured timeframe over the universe's tickers.
    pub fn run(&self, universe: &Universe) -> Vec<TimeframeReport> {
        let tickers = universe.all_tickers();
        self.screener
            .config()
            .timeframes
            .iter()
            .map(|tf| self.run_timeframe(tf, &tickers))
            .collect()
    }
}

/// Build a pipeline for `config` and run it over `universe`.
pub fn run_pipeline(
    config: ScreenConfig,
    data_dir: &Path,
    universe: &Universe,
) -> Result<Vec<TimeframeReport>> {
    if !data_dir.is_dir() {
        bail!("data directory not found: {}", data_dir.display());
    }
    if universe.is_empty() {
        tracing::warn!("ticker universe is empty");
    }
    let pipeline = Pipeline::new(config, data_dir)?;
    Ok(pipeline.run(universe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_path_layout() {
        let p = Pipeline::new(ScreenConfig::default(), "/data").unwrap();
        assert_eq!(
            p.ticker_path(&Timeframe::Weekly, "AAPL"),
            PathBuf::from("/data/weekly/AAPL.csv")
        );
    }

    #[test]
    fn summaries_add_up() {
        let mut a = BatchSummary {
            attempted: 3,
            loaded: 2,
            valid: 2,
            skipped: 1,
            detected: 1,
        };
        a.absorb(a);
        assert_eq!(a.attempted, 6);
        assert_eq!(a.detected, 2);
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let universe = Universe::from_tickers(["SPY"]);
        let err = run_pipeline(
            ScreenConfig::default(),
            Path::new("/nonexistent/hvescan-data"),
            &universe,
        )
        .unwrap_err();
        assert!(err.to_string().contains("data directory not found"));
    }
}
