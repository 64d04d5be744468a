//! Series sufficiency and sanity checks run before screening.
//!
//! Rules are evaluated in a fixed order and the first failure wins:
//! 1. empty series
//! 2. too few bars for the timeframe
//! 3. close column absent
//! 4. more than 10% of closes missing
//! 5. any close <= 0
//! 6. more than 1% of day-over-day close changes beyond +/-50%

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{TimeSeries, Timeframe};

/// Share of missing closes above which a series is rejected.
pub const MAX_MISSING_CLOSE_RATIO: f64 = 0.10;

/// Absolute fractional day-over-day move regarded as a bad tick.
pub const EXTREME_MOVE_THRESHOLD: f64 = 0.5;

/// Share of extreme moves above which a series is rejected.
pub const MAX_EXTREME_MOVE_RATIO: f64 = 0.01;

/// Why a series is not eligible for screening.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataQualityError {
    #[error("No data available")]
    Empty,

    #[error("Insufficient data: {actual} < {required} ({timeframe})")]
    InsufficientBars {
        actual: usize,
        required: usize,
        timeframe: Timeframe,
    },

    #[error("Missing Close price column")]
    MissingClose,

    #[error("Too many missing Close prices: {0}")]
    TooManyMissingCloses(usize),

    #[error("Invalid price values (≤ 0)")]
    NonPositivePrice,

    #[error("Too many extreme price movements: {0}")]
    TooManyExtremeMoves(usize),
}

/// Outcome of validation in `(is_valid, reason)` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub is_valid: bool,
    pub reason: String,
}

impl From<Result<(), DataQualityError>> for Validation {
    fn from(result: Result<(), DataQualityError>) -> Self {
        match result {
            Ok(()) => Self {
                is_valid: true,
                reason: "Valid data".to_string(),
            },
            Err(e) => Self {
                is_valid: false,
                reason: e.to_string(),
            },
        }
    }
}

/// Validator with an optional caller-supplied minimum bar count.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesValidator {
    min_bars: Option<usize>,
}

impl SeriesValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the timeframe-derived minimum bar count.
    pub fn with_min_bars(mut self, min_bars: usize) -> Self {
        self.min_bars = Some(min_bars);
        self
    }

    pub fn validate(&self, series: &TimeSeries, timeframe: &Timeframe) -> Validation {
        self.check(series, timeframe).into()
    }

    pub fn check(&self, series: &TimeSeries, timeframe: &Timeframe) -> Result<(), DataQualityError> {
        if series.is_empty() {
            return Err(DataQualityError::Empty);
        }

        let required = self.min_bars.unwrap_or_else(|| timeframe.min_bars());
        if series.len() < required {
            return Err(DataQualityError::InsufficientBars {
                actual: series.len(),
                required,
                timeframe: timeframe.clone(),
            });
        }

        if !series.columns().close {
            return Err(DataQualityError::MissingClose);
        }

        let closes: Vec<f64> = series
            .bars()
            .iter()
            .filter(|b| !b.close_missing())
            .map(|b| b.close)
            .collect();

        let missing = series.len() - closes.len();
        if missing as f64 > series.len() as f64 * MAX_MISSING_CLOSE_RATIO {
            return Err(DataQualityError::TooManyMissingCloses(missing));
        }

        if closes.iter().any(|&c| c <= 0.0) {
            return Err(DataQualityError::NonPositivePrice);
        }

        let changes = closes.len().saturating_sub(1);
        let extreme = closes
            .windows(2)
            .filter(|w| ((w[1] - w[0]) / w[0]).abs() > EXTREME_MOVE_THRESHOLD)
            .count();
        if extreme as f64 > changes as f64 * MAX_EXTREME_MOVE_RATIO {
            return Err(DataQualityError::TooManyExtremeMoves(extreme));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::make_series;
    use crate::domain::{Bar, ColumnSet};

    fn flat_series(n: usize) -> TimeSeries {
        make_series(&vec![1000; n])
    }

    fn with_closes(closes: &[f64]) -> TimeSeries {
        let base = flat_series(closes.len());
        let bars: Vec<Bar> = base
            .bars()
            .iter()
            .zip(closes)
            .map(|(b, &close)| Bar { close, ..b.clone() })
            .collect();
        TimeSeries::from_bars("TEST", bars)
    }

    #[test]
    fn empty_series_has_no_data() {
        let v = SeriesValidator::new().validate(&make_series(&[]), &Timeframe::Daily);
        assert!(!v.is_valid);
        assert_eq!(v.reason, "No data available");
    }

    #[test]
    fn short_daily_series_is_insufficient() {
        let v = SeriesValidator::new().validate(&flat_series(200), &Timeframe::Daily);
        assert!(!v.is_valid);
        assert!(v.reason.contains("Insufficient data"));
        assert_eq!(v.reason, "Insufficient data: 200 < 252 (daily)");
    }

    #[test]
    fn override_minimum() {
        let validator = SeriesValidator::new().with_min_bars(10);
        assert!(validator.validate(&flat_series(20), &Timeframe::Daily).is_valid);
    }

    #[test]
    fn weekly_minimum_is_52() {
        let validator = SeriesValidator::new();
        assert!(!validator.validate(&flat_series(51), &Timeframe::Weekly).is_valid);
        assert!(validator.validate(&flat_series(52), &Timeframe::Weekly).is_valid);
    }

    #[test]
    fn missing_close_column() {
        let base = flat_series(60);
        let columns = ColumnSet {
            close: false,
            ..ColumnSet::full()
        };
        let series = TimeSeries::new("TEST", base.bars().to_vec(), columns);
        let result = SeriesValidator::new().check(&series, &Timeframe::Monthly);
        assert_eq!(result, Err(DataQualityError::MissingClose));
    }

    #[test]
    fn too_many_missing_closes() {
        let mut closes = vec![100.0; 20];
        closes[0] = f64::NAN;
        closes[5] = f64::NAN;
        closes[10] = f64::NAN;
        let result = SeriesValidator::new().check(&with_closes(&closes), &Timeframe::Monthly);
        assert_eq!(result, Err(DataQualityError::TooManyMissingCloses(3)));
    }

    #[test]
    fn exactly_ten_percent_missing_is_allowed() {
        let mut closes = vec![100.0; 20];
        closes[3] = f64::NAN;
        closes[7] = f64::NAN;
        let result = SeriesValidator::new().check(&with_closes(&closes), &Timeframe::Monthly);
        assert!(result.is_ok());
    }

    #[test]
    fn non_positive_close_rejected() {
        let mut closes = vec![100.0; 20];
        closes[4] = 0.0;
        let v = SeriesValidator::new().validate(&with_closes(&closes), &Timeframe::Monthly);
        assert!(!v.is_valid);
        assert_eq!(v.reason, "Invalid price values (≤ 0)");
    }

    #[test]
    fn extreme_moves_rejected() {
        // Each spike to 300 produces two moves beyond 50%; 299 changes allow 2.99.
        let mut closes = vec![100.0; 300];
        closes[100] = 300.0;
        closes[200] = 300.0;
        let result = SeriesValidator::new().check(&with_closes(&closes), &Timeframe::Daily);
        assert_eq!(result, Err(DataQualityError::TooManyExtremeMoves(4)));
    }

    #[test]
    fn isolated_spike_within_tolerance() {
        let mut closes = vec![100.0; 300];
        closes[100] = 300.0;
        let result = SeriesValidator::new().check(&with_closes(&closes), &Timeframe::Daily);
        assert!(result.is_ok());
    }

    #[test]
    fn clean_series_is_valid() {
        let v = SeriesValidator::new().validate(&flat_series(260), &Timeframe::Daily);
        assert!(v.is_valid);
        assert_eq!(v.reason, "Valid data");
    }
}
