//! Composite ranking score, 0 to 100.
//!
//! | component    | max | input                                   |
//! |--------------|-----|-----------------------------------------|
//! | recency      | 50  | calendar days since the all-time high   |
//! | frequency    | 30  | number of record events                 |
//! | volume ratio | 20  | latest volume as a percent of the high  |

use serde::{Deserialize, Serialize};

pub const RECENCY_MAX: f64 = 50.0;
pub const FREQUENCY_MAX: f64 = 30.0;
pub const VOLUME_RATIO_MAX: f64 = 20.0;

/// Per-component score, useful for explaining a rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub recency: f64,
    pub frequency: f64,
    pub volume_ratio: f64,
}

impl ScoreBreakdown {
    /// Sum of components rounded to two decimals.
    pub fn total(&self) -> f64 {
        round2(self.recency + self.frequency + self.volume_ratio)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Full marks up to 30 days, then piecewise linear: 25 at day 90, 5 at day
/// 365, 0 at day 730 and beyond. A missing date scores 0.
pub fn recency_score(days_since_hve: Option<i64>) -> f64 {
    let Some(days) = days_since_hve else {
        return 0.0;
    };
    let d = days as f64;
    if d <= 30.0 {
        RECENCY_MAX
    } else if d <= 90.0 {
        RECENCY_MAX * (1.0 - (d - 30.0) / 60.0 * 0.5)
    } else if d <= 365.0 {
        25.0 * (1.0 - (d - 90.0) / 275.0 * 0.8)
    } else {
        5.0 * (1.0 - (d - 365.0) / 365.0).max(0.0)
    }
}

/// Three points per record event, capped.
pub fn frequency_score(total_hve_count: usize) -> f64 {
    (total_hve_count as f64 * 3.0).min(FREQUENCY_MAX)
}

/// `volume_ratio` is latest volume over the all-time high (1.0 = at the high).
pub fn volume_ratio_score(volume_ratio: f64) -> f64 {
    if !volume_ratio.is_finite() || volume_ratio <= 0.0 {
        return 0.0;
    }
    (volume_ratio * 100.0 / 5.0).min(VOLUME_RATIO_MAX)
}

pub fn breakdown(
    days_since_hve: Option<i64>,
    total_hve_count: usize,
    volume_ratio: f64,
) -> ScoreBreakdown {
    ScoreBreakdown {
        recency: recency_score(days_since_hve),
        frequency: frequency_score(total_hve_count),
        volume_ratio: volume_ratio_score(volume_ratio),
    }
}

pub fn composite_score(
    days_since_hve: Option<i64>,
    total_hve_count: usize,
    volume_ratio: f64,
) -> f64 {
    breakdown(days_since_hve, total_hve_count, volume_ratio).total()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn recency_breakpoints() {
        assert_eq!(recency_score(Some(0)), 50.0);
        assert_eq!(recency_score(Some(30)), 50.0);
        assert!(approx(recency_score(Some(60)), 37.5));
        assert!(approx(recency_score(Some(90)), 25.0));
        assert!(approx(recency_score(Some(365)), 5.0));
        assert!(approx(recency_score(Some(547)), 5.0 * (1.0 - 182.0 / 365.0)));
        assert_eq!(recency_score(Some(730)), 0.0);
        assert_eq!(recency_score(Some(5000)), 0.0);
        assert_eq!(recency_score(None), 0.0);
    }

    #[test]
    fn frequency_caps_at_thirty() {
        assert_eq!(frequency_score(0), 0.0);
        assert_eq!(frequency_score(4), 12.0);
        assert_eq!(frequency_score(10), 30.0);
        assert_eq!(frequency_score(25), 30.0);
    }

    #[test]
    fn volume_ratio_caps_at_twenty() {
        assert_eq!(volume_ratio_score(0.5), 10.0);
        assert_eq!(volume_ratio_score(1.0), 20.0);
        assert_eq!(volume_ratio_score(3.0), 20.0);
        assert_eq!(volume_ratio_score(f64::NAN), 0.0);
    }

    #[test]
    fn total_is_rounded() {
        // 50 * (1 - 7/60 * 0.5) = 47.0833...
        let score = composite_score(Some(37), 2, 0.123);
        assert_eq!(score, 55.54);
        assert_eq!(composite_score(Some(10), 12, 1.0), 100.0);
    }
}
