//! Per-ticker screening pipeline and batch orchestration.
//!
//! Each ticker goes through the same steps:
//! 1. volume column present
//! 2. latest close >= `min_price` (when set)
//! 3. latest volume >= `min_volume` (when set)
//! 4. date restriction (fixed range, rolling years, or none)
//! 5. at least two bars left
//! 6. whole-history record scan, then the optional trailing-window scan and
//!    top-K volume days
//!
//! A failing step yields a `ScreenError` for that ticker only. Batches collect
//! failures next to the successes and never abort.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hvescan_core::detect::EventDetector;
use hvescan_core::domain::{TimeSeries, Timeframe};

use crate::config::{ConfigError, ScreenConfig};
use crate::result::ScreeningResult;

/// Why a ticker produced no result.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ScreenError {
    #[error("no data")]
    Empty,

    #[error("no Volume column")]
    NoVolumeColumn,

    #[error("latest close {close} below minimum price {min}")]
    BelowMinPrice { close: f64, min: f64 },

    #[error("latest volume {volume} below minimum volume {min}")]
    BelowMinVolume { volume: u64, min: u64 },

    #[error("insufficient data after date filter: {0} bars")]
    InsufficientBars(usize),

    #[error("no volume records found")]
    NoRecords,
}

/// A ticker that was screened but produced no result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub error: ScreenError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSummary {
    pub attempted: usize,
    pub detected: usize,
    pub skipped: usize,
}

/// Batch output: results sorted ascending by `days_since_hve`, plus skips in
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenOutcome {
    pub results: Vec<ScreeningResult>,
    pub skipped: Vec<SkippedTicker>,
    pub summary: ScreenSummary,
}

#[derive(Debug, Clone)]
pub struct Screener {
    config: ScreenConfig,
    as_of: NaiveDate,
    detector: EventDetector,
}

impl Screener {
    /// Validates the configuration. Rolling date windows are anchored at
    /// today's local date unless `with_as_of` overrides it.
    pub fn new(config: ScreenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let detector = EventDetector {
            window_days: config.hv1y.enabled.then_some(config.hv1y.window_days),
            top_k: config.export.max_days,
            hvd_source: config.export.hvd_source,
        };
        Ok(Self {
            config,
            as_of: chrono::Local::now().date_naive(),
            detector,
        })
    }

    /// Anchor date for rolling history limits.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn screen_ticker(
        &self,
        series: &TimeSeries,
        timeframe: &Timeframe,
    ) -> Result<ScreeningResult, ScreenError> {
        let filters = &self.config.filters;
        let Some(latest) = series.latest() else {
            return Err(ScreenError::Empty);
        };
        if !series.columns().volume {
            return Err(ScreenError::NoVolumeColumn);
        }
        // A missing close compares false and is not filtered.
        if filters.min_price > 0.0 && latest.close < filters.min_price {
            return Err(ScreenError::BelowMinPrice {
                close: latest.close,
                min: filters.min_price,
            });
        }
        if filters.min_volume > 0 && latest.volume < filters.min_volume {
            return Err(ScreenError::BelowMinVolume {
                volume: latest.volume,
                min: filters.min_volume,
            });
        }

        let (start, end) = filters.date_bounds(self.as_of);
        let restricted = series.restrict(start, end);
        if restricted.len() < 2 {
            return Err(ScreenError::InsufficientBars(restricted.len()));
        }

        let detection = self.detector.detect(&restricted);
        let records = detection.records;
        let (Some(hve_date), Some(hve_volume), Some(days_since_hve)) =
            (records.hve_date, records.hve_volume, records.days_since_hve)
        else {
            return Err(ScreenError::NoRecords);
        };
        let Some(latest) = restricted.latest() else {
            return Err(ScreenError::InsufficientBars(0));
        };

        let volume_ratio = if hve_volume > 0 {
            latest.volume as f64 / hve_volume as f64
        } else {
            0.0
        };

        tracing::debug!(
            ticker = series.symbol(),
            %timeframe,
            %hve_date,
            records = records.total_hve_count,
            "screened"
        );

        Ok(ScreeningResult {
            ticker: series.symbol().to_string(),
            timeframe: timeframe.clone(),
            hve_date,
            hve_volume,
            days_since_hve,
            hve_occ_1y: records.hve_occ_1y,
            total_hve_count: records.total_hve_count,
            all_hve_details: records.events,
            hv1y: detection.window,
            top_volume_days: detection.top_volume_days,
            latest_date: latest.date,
            latest_volume: latest.volume,
            latest_close: (!latest.close.is_nan()).then_some(latest.close),
            volume_ratio,
            data_points: records.data_points,
            score: None,
        })
    }

    /// Screen a batch. Input order is kept until the final stable sort by
    /// `days_since_hve`, so ties stay in input order.
    pub fn screen(&self, series: &[TimeSeries], timeframe: &Timeframe) -> ScreenOutcome {
        let screen_one = |s: &TimeSeries| (s.symbol().to_string(), self.screen_ticker(s, timeframe));

        let outcomes: Vec<(String, Result<ScreeningResult, ScreenError>)> = if self.config.parallel
        {
            series.par_iter().map(screen_one).collect()
        } else {
            series.iter().map(screen_one).collect()
        };

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for (ticker, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(error) => {
                    tracing::warn!(%ticker, %timeframe, %error, "ticker skipped");
                    skipped.push(SkippedTicker { ticker, error });
                }
            }
        }
        results.sort_by_key(|r| r.days_since_hve);

        let summary = ScreenSummary {
            attempted: series.len(),
            detected: results.len(),
            skipped: skipped.len(),
        };
        tracing::info!(
            %timeframe,
            attempted = summary.attempted,
            detected = summary.detected,
            skipped = summary.skipped,
            "batch screened"
        );

        ScreenOutcome {
            results,
            skipped,
            summary,
        }
    }
}
