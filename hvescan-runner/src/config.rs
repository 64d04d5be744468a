//! Screening configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! `validate()` runs on load and again in `Screener::new`, so an invalid
//! configuration never reaches a batch.

use std::path::{Path, PathBuf};

use chrono::{Months, NaiveDate};
use hvescan_core::detect::{HvdSource, DEFAULT_WINDOW_DAYS};
use hvescan_core::domain::Timeframe;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("fixed date range requires both start_date and end_date")]
    MissingFixedDates,

    #[error("start_date {start} is after end_date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("hv1y.window_days must be positive")]
    ZeroWindow,

    #[error("hv1y.window_days must be at most {max}, got {days}")]
    WindowTooLong { days: u32, max: u32 },

    #[error("filters.limit_hist_years must be at most {max}, got {years}")]
    HistoryTooLong { years: u32, max: u32 },

    #[error("batch_size must be positive")]
    ZeroBatchSize,

    #[error("export.{0} must be positive")]
    ZeroExportWidth(&'static str),

    #[error("filters.min_price must be finite and non-negative, got {0}")]
    InvalidMinPrice(f64),

    #[error("at least one timeframe must be configured")]
    NoTimeframes,
}

/// Upper bound for `filters.limit_hist_years`.
pub const MAX_HIST_YEARS: u32 = 200;

/// Upper bound for `hv1y.window_days` (200 years of calendar days).
pub const MAX_WINDOW_DAYS: u32 = 73_050;

/// How the history is restricted before detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeMode {
    /// Last `limit_hist_years` years up to the run date (0 = full history).
    #[default]
    Rolling,
    /// Inclusive `[start_date, end_date]`.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub limit_hist_years: u32,
    /// Skip tickers whose latest close is below this (0 = off).
    pub min_price: f64,
    /// Skip tickers whose latest volume is below this (0 = off).
    pub min_volume: u64,
    pub date_range_mode: DateRangeMode,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            limit_hist_years: 0,
            min_price: 0.0,
            min_volume: 0,
            date_range_mode: DateRangeMode::Rolling,
            start_date: None,
            end_date: None,
        }
    }
}

impl FilterConfig {
    /// Inclusive date bounds to apply to a series, relative to `as_of`.
    ///
    /// Fixed mode with both dates wins; otherwise a positive
    /// `limit_hist_years` gives a rolling lower bound; otherwise no bounds.
    pub fn date_bounds(&self, as_of: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        if self.date_range_mode == DateRangeMode::Fixed {
            if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
                return (Some(start), Some(end));
            }
        }
        if self.limit_hist_years > 0 {
            let cutoff = self
                .limit_hist_years
                .checked_mul(12)
                .and_then(|months| as_of.checked_sub_months(Months::new(months)));
            return (cutoff, None);
        }
        (None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hv1yConfig {
    pub enabled: bool,
    pub window_days: u32,
}

impl Default for Hv1yConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// HVE slots per row in the wide historical export.
    pub max_events: usize,
    /// HVD slots per row, also the K of the top-K ranking.
    pub max_days: usize,
    pub hve_historical: bool,
    pub hvd_historical: bool,
    pub ticker_cards: bool,
    pub hvd_source: HvdSource,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_events: 10,
            max_days: 10,
            hve_historical: true,
            hvd_historical: true,
            ticker_cards: true,
            hvd_source: HvdSource::AllDays,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub timeframes: Vec<Timeframe>,
    pub batch_size: usize,
    pub parallel: bool,
    pub filters: FilterConfig,
    pub hv1y: Hv1yConfig,
    pub export: ExportConfig,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            timeframes: vec![Timeframe::Daily],
            batch_size: 100,
            parallel: true,
            filters: FilterConfig::default(),
            hv1y: Hv1yConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl ScreenConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeframes.is_empty() {
            return Err(ConfigError::NoTimeframes);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        let filters = &self.filters;
        if !filters.min_price.is_finite() || filters.min_price < 0.0 {
            return Err(ConfigError::InvalidMinPrice(filters.min_price));
        }
        if filters.date_range_mode == DateRangeMode::Fixed {
            let (Some(start), Some(end)) = (filters.start_date, filters.end_date) else {
                return Err(ConfigError::MissingFixedDates);
            };
            if start > end {
                return Err(ConfigError::InvertedRange { start, end });
            }
        }

        if filters.limit_hist_years > MAX_HIST_YEARS {
            return Err(ConfigError::HistoryTooLong {
                years: filters.limit_hist_years,
                max: MAX_HIST_YEARS,
            });
        }

        if self.hv1y.enabled {
            if self.hv1y.window_days == 0 {
                return Err(ConfigError::ZeroWindow);
            }
            if self.hv1y.window_days > MAX_WINDOW_DAYS {
                return Err(ConfigError::WindowTooLong {
                    days: self.hv1y.window_days,
                    max: MAX_WINDOW_DAYS,
                });
            }
        }
        if self.export.max_events == 0 {
            return Err(ConfigError::ZeroExportWidth("max_events"));
        }
        if self.export.max_days == 0 {
            return Err(ConfigError::ZeroExportWidth("max_days"));
        }
        Ok(())
    }

    /// Content hash of the configuration, recorded in exported artifacts.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
