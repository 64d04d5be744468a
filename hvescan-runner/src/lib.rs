//! HVE Scan Runner: screening orchestration, filters, scoring and export.
//!
//! This crate builds on `hvescan-core` to provide:
//! - TOML run configuration with validation and a content hash
//! - Per-ticker screening with price, volume and date filters
//! - Batched multi-timeframe pipeline over a directory of CSV files
//! - Composite scoring and ranking
//! - CSV, JSON, wide historical and ticker-card exports

pub mod config;
pub mod export;
pub mod pipeline;
pub mod result;
pub mod scoring;
pub mod screener;

pub use config::{
    ConfigError, DateRangeMode, ExportConfig, FilterConfig, Hv1yConfig, ScreenConfig,
};
pub use export::{
    export_hvd_historical, export_hve_historical, export_json, export_results_csv,
    import_historical, import_json, save_artifacts, ticker_card, ticker_cards, HistoricalKind,
    HistoricalRow, ReportDocument, SCHEMA_VERSION,
};
pub use pipeline::{run_pipeline, BatchSummary, Pipeline, Rejection, Stage, TimeframeReport};
pub use result::ScreeningResult;
pub use scoring::{calculate_score, enrich_with_scores};
pub use screener::{ScreenError, ScreenOutcome, ScreenSummary, Screener, SkippedTicker};


#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn screener_is_send_sync() {
        assert_send::<Screener>();
        assert_sync::<Screener>();
    }

    #[test]
    fn pipeline_is_send_sync() {
        assert_send::<Pipeline>();
        assert_sync::<Pipeline>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<ScreeningResult>();
        assert_sync::<ScreeningResult>();
        assert_send::<TimeframeReport>();
        assert_sync::<TimeframeReport>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<ScreenConfig>();
        assert_sync::<ScreenConfig>();
    }
}
