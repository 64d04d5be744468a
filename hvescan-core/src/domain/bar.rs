//! OHLCV bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single ticker on a single date.
///
/// Missing price cells are stored as NaN (no forward-fill). Volume is an
/// integer share count and is never missing once a bar exists; a series
/// without a volume column is flagged on its `ColumnSet` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// True if the close price is missing.
    pub fn close_missing(&self) -> bool {
        self.close.is_nan()
    }

    /// Intraday move from open to close in percent.
    ///
    /// `None` when open is missing or not positive, or close is missing.
    pub fn price_change_pct(&self) -> Option<f64> {
        if self.open.is_nan() || self.open <= 0.0 || self.close.is_nan() {
            return None;
        }
        Some((self.close - self.open) / self.open * 100.0)
    }
}
