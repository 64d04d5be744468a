//! Per-ticker time series with a canonical column set.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Which canonical columns were present when the series was ingested.
///
/// Column-name matching happens once at ingestion; downstream code only ever
/// asks these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet {
    pub open: bool,
    pub high: bool,
    pub low: bool,
    pub close: bool,
    pub volume: bool,
}

impl ColumnSet {
    /// All five OHLCV columns present.
    pub const fn full() -> Self {
        Self {
            open: true,
            high: true,
            low: true,
            close: true,
            volume: true,
        }
    }
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self::full()
    }
}

/// Ordered bars for one ticker.
///
/// Invariant: bars are sorted ascending by date with no duplicate dates.
/// Construction enforces this (stable sort, first occurrence of a date wins),
/// so callers handing in unsorted data never break detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeriesParts")]
pub struct TimeSeries {
    symbol: String,
    bars: Vec<Bar>,
    columns: ColumnSet,
}

/// Wire form of a series; deserialization goes through `TimeSeries::new`.
#[derive(Deserialize)]
struct SeriesParts {
    symbol: String,
    bars: Vec<Bar>,
    #[serde(default)]
    columns: ColumnSet,
}

impl From<SeriesParts> for TimeSeries {
    fn from(parts: SeriesParts) -> Self {
        TimeSeries::new(parts.symbol, parts.bars, parts.columns)
    }
}

impl TimeSeries {
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>, columns: ColumnSet) -> Self {
        let symbol = symbol.into();
        if !bars.windows(2).all(|w| w[0].date < w[1].date) {
            tracing::debug!(%symbol, "re-sorting bars into ascending date order");
            bars.sort_by_key(|b| b.date);
            bars.dedup_by_key(|b| b.date);
        }
        Self {
            symbol,
            bars,
            columns,
        }
    }

    /// Series with every OHLCV column present.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self::new(symbol, bars, ColumnSet::full())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn columns(&self) -> ColumnSet {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Most recent bar.
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Bars dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> &[Bar] {
        let idx = self.bars.partition_point(|b| b.date < start);
        &self.bars[idx..]
    }

    /// Copy of the series restricted to an inclusive date range.
    /// `None` bounds are open.
    pub fn restrict(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> TimeSeries {
        let lo = start.map_or(0, |s| self.bars.partition_point(|b| b.date < s));
        let hi = end.map_or(self.bars.len(), |e| self.bars.partition_point(|b| b.date <= e));
        let bars = if lo < hi {
            self.bars[lo..hi].to_vec()
        } else {
            Vec::new()
        };
        TimeSeries {
            symbol: self.symbol.clone(),
            bars,
            columns: self.columns,
        }
    }
}

/// Build a fully populated bar series from a list of volumes, one weekday
/// apart, starting 2024-01-01 (a Monday). Test helper.
#[cfg(test)]
pub fn make_series(volumes: &[u64]) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates = crate::domain::weekdays_from(start, volumes.len());
    let bars = dates
        .into_iter()
        .zip(volumes)
        .map(|(date, &volume)| Bar {
            date,
            open: 100.0,
            high: 102.0,
            low: 99.0,
            close: 101.0,
            volume,
        })
        .collect();
    TimeSeries::from_bars("TEST", bars)
}
