//! Running-maximum record scans (HVE and HV1Y).
//!
//! A bar is a record when its volume is strictly greater than every volume
//! before it in the scanned slice. The first bar of a slice is always a
//! record: it defines the initial high. Bars that only tie the current high
//! (plateaus) are not records, so a repeated maximum counts once, on its
//! first occurrence.
//!
//! The HV1Y variant runs the same scan on the trailing window only. The
//! running maximum starts fresh at the window boundary, so nothing outside
//! the window can suppress an in-window record.

use chrono::{Days, NaiveDate};
use thiserror::Error;

use super::event::{HveEvent, RecordSummary, WindowSummary};
use crate::domain::{Bar, TimeSeries};

/// Trailing span used for `hve_occ_1y`.
pub const OCCURRENCE_WINDOW_DAYS: u64 = 365;

/// Default HV1Y window length.
pub const DEFAULT_WINDOW_DAYS: u32 = 365;

/// Failure while scanning a single series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    #[error("date arithmetic out of range: {date} minus {days} days")]
    DateOutOfRange { date: NaiveDate, days: u64 },
}

/// Expanding maximum of volume: `out[i] = max(volume[0..=i])`.
pub fn running_max(bars: &[Bar]) -> Vec<u64> {
    bars.iter()
        .scan(0u64, |best, bar| {
            *best = (*best).max(bar.volume);
            Some(*best)
        })
        .collect()
}

/// Positions of record bars in chronological order: index 0, then every `i`
/// with `volume[i] > running_max[i - 1]`.
pub fn record_indices(bars: &[Bar]) -> Vec<usize> {
    let peaks = running_max(bars);
    (0..bars.len())
        .filter(|&i| i == 0 || bars[i].volume > peaks[i - 1])
        .collect()
}

fn days_before(date: NaiveDate, days: u64) -> Result<NaiveDate, DetectionError> {
    date.checked_sub_days(Days::new(days))
        .ok_or(DetectionError::DateOutOfRange { date, days })
}

/// Events for the given record positions, most recent first.
fn events_newest_first(bars: &[Bar], indices: &[usize]) -> Vec<HveEvent> {
    indices.iter().rev().map(|&i| HveEvent::from(&bars[i])).collect()
}

/// Whole-history scan. Fewer than two bars yields the empty sentinel.
pub fn try_find_all_time_records(series: &TimeSeries) -> Result<RecordSummary, DetectionError> {
    let bars = series.bars();
    if bars.len() < 2 {
        return Ok(RecordSummary::empty());
    }

    let indices = record_indices(bars);
    let Some(&peak) = indices.last() else {
        return Ok(RecordSummary::empty());
    };

    let first = &bars[0];
    let last = &bars[bars.len() - 1];
    let peak_bar = &bars[peak];
    let cutoff = days_before(last.date, OCCURRENCE_WINDOW_DAYS)?;
    let hve_occ_1y = indices.iter().filter(|&&i| bars[i].date >= cutoff).count();

    Ok(RecordSummary {
        total_hve_count: indices.len(),
        hve_date: Some(peak_bar.date),
        hve_volume: Some(peak_bar.volume),
        days_since_hve: Some((last.date - peak_bar.date).num_days()),
        hve_occ_1y,
        events: events_newest_first(bars, &indices),
        data_start: Some(first.date),
        data_end: Some(last.date),
        data_points: bars.len(),
    })
}

/// Whole-history scan that never fails: errors are logged and replaced by
/// the empty sentinel.
pub fn find_all_time_records(series: &TimeSeries) -> RecordSummary {
    try_find_all_time_records(series).unwrap_or_else(|e| {
        tracing::warn!(symbol = series.symbol(), error = %e, "record scan failed");
        RecordSummary::empty()
    })
}

/// Trailing-window scan. `None` when fewer than two bars fall inside the
/// window.
pub fn try_find_records_in_window(
    series: &TimeSeries,
    window_days: u32,
    reference_hve_date: Option<NaiveDate>,
    reference_hve_volume: Option<u64>,
) -> Result<Option<WindowSummary>, DetectionError> {
    let Some(end) = series.last_date() else {
        return Ok(None);
    };
    let start = days_before(end, u64::from(window_days))?;
    let window = series.since(start);
    if window.len() < 2 {
        return Ok(None);
    }

    let indices = record_indices(window);
    let Some(&peak) = indices.last() else {
        return Ok(None);
    };
    let peak_bar = &window[peak];

    let hv1y_to_hve_ratio = match reference_hve_volume {
        Some(reference) if reference > 0 => peak_bar.volume as f64 / reference as f64,
        _ => 0.0,
    };

    Ok(Some(WindowSummary {
        hv1y_date: peak_bar.date,
        hv1y_volume: peak_bar.volume,
        days_since_hv1y: (end - peak_bar.date).num_days(),
        hv1y_occ_1y: indices.len(),
        total_hv1y_count: indices.len(),
        is_hv1y_also_hve: reference_hve_date == Some(peak_bar.date),
        hv1y_to_hve_ratio,
        events: events_newest_first(window, &indices),
    }))
}

/// Trailing-window scan that never fails: errors are logged and yield `None`.
pub fn find_records_in_window(
    series: &TimeSeries,
    window_days: u32,
    reference_hve_date: Option<NaiveDate>,
    reference_hve_volume: Option<u64>,
) -> Option<WindowSummary> {
    try_find_records_in_window(series, window_days, reference_hve_date, reference_hve_volume)
        .unwrap_or_else(|e| {
            tracing::warn!(symbol = series.symbol(), error = %e, "window scan failed");
            None
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::make_series;

    fn volumes(events: &[HveEvent]) -> Vec<u64> {
        events.iter().map(|e| e.volume).collect()
    }

    #[test]
    fn running_max_is_expanding() {
        let series = make_series(&[3, 1, 4, 1, 5]);
        assert_eq!(running_max(series.bars()), vec![3, 3, 4, 4, 5]);
    }

    #[test]
    fn plateaus_are_not_records() {
        let series = make_series(&[100, 500, 500, 300, 500]);
        assert_eq!(record_indices(series.bars()), vec![0, 1]);

        let summary = find_all_time_records(&series);
        assert_eq!(summary.total_hve_count, 2);
        assert_eq!(volumes(&summary.events), vec![500, 100]);
        assert_eq!(summary.hve_date, Some(series.bars()[1].date));
    }

    #[test]
    fn scenario_three_records() {
        let series = make_series(&[1000, 5000, 4000, 8000, 7000]);
        let summary = find_all_time_records(&series);
        assert_eq!(summary.total_hve_count, 3);
        assert_eq!(summary.hve_volume, Some(8000));
        assert_eq!(volumes(&summary.events), vec![8000, 5000, 1000]);
        assert_eq!(summary.hve_date, Some(series.bars()[3].date));
        assert_eq!(summary.days_since_hve, Some(1));
        assert_eq!(summary.hve_occ_1y, 3);
        assert_eq!(summary.data_points, 5);
    }

    #[test]
    fn first_bar_is_record_even_at_zero_volume() {
        let series = make_series(&[0, 0, 0]);
        let summary = find_all_time_records(&series);
        assert_eq!(summary.total_hve_count, 1);
        assert_eq!(summary.hve_volume, Some(0));
        assert_eq!(summary.hve_date, series.first_date());
    }

    #[test]
    fn short_series_yield_sentinel() {
        assert!(find_all_time_records(&make_series(&[])).is_empty());
        assert!(find_all_time_records(&make_series(&[42])).is_empty());
        assert_eq!(find_all_time_records(&make_series(&[42])), RecordSummary::empty());
    }

    #[test]
    fn event_carries_price_detail() {
        let series = make_series(&[10, 20]);
        let summary = find_all_time_records(&series);
        let newest = &summary.events[0];
        assert_eq!(newest.open, Some(100.0));
        assert_eq!(newest.close, Some(101.0));
        assert!((newest.price_change_pct.unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn occurrences_count_only_last_year() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars: Vec<Bar> = [(0, 10), (100, 20), (700, 30), (800, 40)]
            .iter()
            .map(|&(offset, volume)| Bar {
                date: start + chrono::Duration::days(offset),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume,
            })
            .collect();
        let series = TimeSeries::from_bars("X", bars);
        let summary = find_all_time_records(&series);
        assert_eq!(summary.total_hve_count, 4);
        assert_eq!(summary.hve_occ_1y, 2);
    }

    #[test]
    fn window_resets_running_max() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        // Huge volume two years back, then a modest in-window series.
        let bars: Vec<Bar> = [(0, 1_000_000), (600, 100), (650, 300), (700, 200)]
            .iter()
            .map(|&(offset, volume)| Bar {
                date: start + chrono::Duration::days(offset),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume,
            })
            .collect();
        let series = TimeSeries::from_bars("X", bars);
        let records = find_all_time_records(&series);
        let window = find_records_in_window(&series, 365, records.hve_date, records.hve_volume)
            .expect("window has three bars");

        assert_eq!(window.hv1y_volume, 300);
        assert_eq!(window.total_hv1y_count, 2);
        assert_eq!(window.hv1y_occ_1y, 2);
        assert_eq!(volumes(&window.events), vec![300, 100]);
        assert_eq!(window.days_since_hv1y, 50);
        assert!(!window.is_hv1y_also_hve);
        assert!((window.hv1y_to_hve_ratio - 0.0003).abs() < 1e-12);
    }

    #[test]
    fn window_max_matching_hve_is_flagged() {
        let series = make_series(&[1000, 5000, 4000, 8000, 7000]);
        let records = find_all_time_records(&series);
        let window =
            find_records_in_window(&series, 365, records.hve_date, records.hve_volume).unwrap();
        assert!(window.is_hv1y_also_hve);
        assert_eq!(window.hv1y_to_hve_ratio, 1.0);
    }

    #[test]
    fn window_with_single_bar_is_none() {
        let series = make_series(&[1, 2, 3]);
        assert!(find_records_in_window(&series, 0, None, None).is_none());
    }

    #[test]
    fn zero_reference_volume_gives_zero_ratio() {
        let series = make_series(&[5, 6]);
        let window = find_records_in_window(&series, 365, None, Some(0)).unwrap();
        assert_eq!(window.hv1y_to_hve_ratio, 0.0);
    }

    #[test]
    fn out_of_range_dates_are_absorbed() {
        let bars: Vec<Bar> = (0..3)
            .map(|i| Bar {
                date: NaiveDate::MIN + chrono::Duration::days(i),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: i as u64,
            })
            .collect();
        let series = TimeSeries::from_bars("OLD", bars);
        assert!(try_find_all_time_records(&series).is_err());
        assert!(find_all_time_records(&series).is_empty());
        assert!(find_records_in_window(&series, 365, None, None).is_none());
    }
}
