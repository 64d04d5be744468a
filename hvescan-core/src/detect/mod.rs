//! Volume milestone detection.
//!
//! - [`records`]: strict new-high scans over the whole history (HVE) and over
//!   a trailing calendar window (HV1Y)
//! - [`top_volume`]: top-K highest-volume days (HVD)
//!
//! [`EventDetector`] bundles the three for callers that want them together.

pub mod event;
pub mod records;
pub mod top_volume;

pub use event::{HveEvent, RecordSummary, VolumeDay, WindowSummary};
pub use records::{
    find_all_time_records, find_records_in_window, record_indices, running_max,
    try_find_all_time_records, try_find_records_in_window, DetectionError, DEFAULT_WINDOW_DAYS,
};
pub use top_volume::{top_k_by_volume, HvdSource};

use serde::{Deserialize, Serialize};

use crate::domain::TimeSeries;

/// All detection outputs for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub records: RecordSummary,
    pub window: Option<WindowSummary>,
    pub top_volume_days: Vec<Option<VolumeDay>>,
}

/// Detector settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDetector {
    /// Trailing window for HV1Y; `None` disables the window scan.
    pub window_days: Option<u32>,
    pub top_k: usize,
    pub hvd_source: HvdSource,
}

impl Default for EventDetector {
    fn default() -> Self {
        Self {
            window_days: Some(DEFAULT_WINDOW_DAYS),
            top_k: 10,
            hvd_source: HvdSource::AllDays,
        }
    }
}

impl EventDetector {
    pub fn detect(&self, series: &TimeSeries) -> Detection {
        let records = find_all_time_records(series);
        let window = self.window_days.and_then(|days| {
            find_records_in_window(series, days, records.hve_date, records.hve_volume)
        });
        let top_volume_days = self
            .hvd_source
            .rank(series.bars(), &records.events, self.top_k);
        Detection {
            records,
            window,
            top_volume_days,
        }
    }
}
