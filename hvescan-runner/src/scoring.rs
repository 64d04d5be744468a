//! Ranking by composite score.

use hvescan_core::score::composite_score;

use crate::result::ScreeningResult;

/// Score one result: recency of the all-time high, number of records, and
/// latest volume relative to the high.
pub fn calculate_score(result: &ScreeningResult) -> f64 {
    composite_score(
        Some(result.days_since_hve),
        result.total_hve_count,
        result.volume_ratio,
    )
}

/// Set `score` on every result and stable-sort descending by it.
pub fn enrich_with_scores(results: &mut [ScreeningResult]) {
    for result in results.iter_mut() {
        result.score = Some(calculate_score(result));
    }
    results.sort_by(|a, b| {
        let a = a.score.unwrap_or(0.0);
        let b = b.score.unwrap_or(0.0);
        b.total_cmp(&a)
    });
}
