//! Per-ticker screening result.

use chrono::NaiveDate;
use hvescan_core::detect::{HveEvent, VolumeDay, WindowSummary};
use hvescan_core::domain::Timeframe;
use serde::{Deserialize, Serialize};

/// One row of screener output: a ticker on one timeframe.
///
/// Built once by the screener; only `score` is filled in afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub ticker: String,
    pub timeframe: Timeframe,
    pub hve_date: NaiveDate,
    pub hve_volume: u64,
    pub days_since_hve: i64,
    pub hve_occ_1y: usize,
    pub total_hve_count: usize,
    /// Record events, most recent first.
    pub all_hve_details: Vec<HveEvent>,
    /// Trailing-window (HV1Y) metrics, `None` when disabled or too short.
    pub hv1y: Option<WindowSummary>,
    /// Exactly `export.max_days` slots, `None` padded.
    pub top_volume_days: Vec<Option<VolumeDay>>,
    pub latest_date: NaiveDate,
    pub latest_volume: u64,
    pub latest_close: Option<f64>,
    /// `latest_volume / hve_volume`, 0 when the high is 0.
    pub volume_ratio: f64,
    pub data_points: usize,
    pub score: Option<f64>,
}
