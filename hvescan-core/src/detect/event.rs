//! Detection output types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// A bar whose volume set a new running maximum.
///
/// Prices are `None` where the source cell was missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HveEvent {
    pub date: NaiveDate,
    pub volume: u64,
    pub close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub price_change_pct: Option<f64>,
}

fn present(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

impl From<&Bar> for HveEvent {
    fn from(bar: &Bar) -> Self {
        Self {
            date: bar.date,
            volume: bar.volume,
            close: present(bar.close),
            open: present(bar.open),
            high: present(bar.high),
            low: present(bar.low),
            price_change_pct: bar.price_change_pct(),
        }
    }
}

/// A (date, volume) pair used for magnitude ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDay {
    pub date: NaiveDate,
    pub volume: u64,
}

impl From<&Bar> for VolumeDay {
    fn from(bar: &Bar) -> Self {
        Self {
            date: bar.date,
            volume: bar.volume,
        }
    }
}

impl From<&HveEvent> for VolumeDay {
    fn from(event: &HveEvent) -> Self {
        Self {
            date: event.date,
            volume: event.volume,
        }
    }
}

/// Whole-history record scan of one series.
///
/// `RecordSummary::empty()` is the sentinel for series that could not be
/// scanned: all counts zero, all dates `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub total_hve_count: usize,
    /// Date of the all-time maximum (first occurrence).
    pub hve_date: Option<NaiveDate>,
    pub hve_volume: Option<u64>,
    /// Calendar days between `hve_date` and the last bar.
    pub days_since_hve: Option<i64>,
    /// Records dated within 365 calendar days of the last bar.
    pub hve_occ_1y: usize,
    /// Record events, most recent first.
    pub events: Vec<HveEvent>,
    pub data_start: Option<NaiveDate>,
    pub data_end: Option<NaiveDate>,
    pub data_points: usize,
}

impl RecordSummary {
    pub fn empty() -> Self {
        Self {
            total_hve_count: 0,
            hve_date: None,
            hve_volume: None,
            days_since_hve: None,
            hve_occ_1y: 0,
            events: Vec::new(),
            data_start: None,
            data_end: None,
            data_points: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_hve_count == 0
    }
}

/// Record scan restricted to a trailing calendar window (HV1Y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    /// Date of the in-window maximum (first occurrence).
    pub hv1y_date: NaiveDate,
    pub hv1y_volume: u64,
    pub days_since_hv1y: i64,
    pub hv1y_occ_1y: usize,
    pub total_hv1y_count: usize,
    pub is_hv1y_also_hve: bool,
    /// `hv1y_volume / hve_volume`, 0 when the reference volume is 0.
    pub hv1y_to_hve_ratio: f64,
    /// In-window record events, most recent first.
    pub events: Vec<HveEvent>,
}
