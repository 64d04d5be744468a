//! HVEScan Core: domain types, ingestion, validation, volume milestone detection.
//!
//! This crate contains the screening primitives:
//! - Domain types (bars, time series, timeframes)
//! - CSV ingestion, ticker universes and synthetic series
//! - Series validation before screening
//! - Highest-volume-ever (HVE), trailing-window (HV1Y) and top-volume-day
//!   (HVD) detection
//! - The composite ranking score

pub mod data;
pub mod detect;
pub mod domain;
pub mod score;
pub mod validation;

pub use detect::{
    find_all_time_records, find_records_in_window, top_k_by_volume, EventDetector, HveEvent,
    HvdSource, RecordSummary, VolumeDay, WindowSummary,
};
pub use domain::{Bar, TimeSeries, Timeframe};
pub use validation::{DataQualityError, SeriesValidator, Validation};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared across rayon workers are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::TimeSeries>();
        require_sync::<domain::TimeSeries>();
        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();

        require_send::<detect::RecordSummary>();
        require_sync::<detect::RecordSummary>();
        require_send::<detect::WindowSummary>();
        require_sync::<detect::WindowSummary>();
        require_send::<detect::EventDetector>();
        require_sync::<detect::EventDetector>();

        require_send::<validation::SeriesValidator>();
        require_sync::<validation::SeriesValidator>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
    }
}
