//! Property tests for batch screening and ranking.
//!
//! 1. Parallel and sequential screening produce identical output
//! 2. Results are ascending by days since the high
//! 3. Scores stay within 0..=100 and ranking is descending

use chrono::NaiveDate;
use hvescan_core::domain::{weekdays_from, Bar, TimeSeries, Timeframe};
use hvescan_runner::{enrich_with_scores, ScreenConfig, Screener};
use proptest::prelude::*;

fn arb_universe() -> impl Strategy<Value = Vec<Vec<u64>>> {
    prop::collection::vec(prop::collection::vec(0u64..1000, 0..60), 1..12)
}

fn build(universe: &[Vec<u64>]) -> Vec<TimeSeries> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    universe
        .iter()
        .enumerate()
        .map(|(i, volumes)| {
            let bars = weekdays_from(start, volumes.len())
                .into_iter()
                .zip(volumes)
                .map(|(date, &volume)| Bar {
                    date,
                    open: 5.0,
                    high: 5.5,
                    low: 4.5,
                    close: 5.0,
                    volume,
                })
                .collect();
            TimeSeries::from_bars(format!("T{i:02}"), bars)
        })
        .collect()
}

fn screener(parallel: bool) -> Screener {
    Screener::new(ScreenConfig::default())
        .unwrap()
        .with_as_of(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap())
        .with_parallelism(parallel)
}

proptest! {
    #[test]
    fn parallel_matches_sequential(universe in arb_universe()) {
        let series = build(&universe);
        let par = screener(true).screen(&series, &Timeframe::Daily);
        let seq = screener(false).screen(&series, &Timeframe::Daily);
        prop_assert_eq!(par.results, seq.results);
        prop_assert_eq!(par.skipped, seq.skipped);
        prop_assert_eq!(par.summary.attempted, universe.len());
    }

    #[test]
    fn results_sorted_and_scores_bounded(universe in arb_universe()) {
        let series = build(&universe);
        let outcome = screener(false).screen(&series, &Timeframe::Daily);
        prop_assert_eq!(
            outcome.results.len() + outcome.skipped.len(),
            universe.len()
        );
        for pair in outcome.results.windows(2) {
            prop_assert!(pair[0].days_since_hve <= pair[1].days_since_hve);
        }

        let mut ranked = outcome.results.clone();
        enrich_with_scores(&mut ranked);
        for r in &ranked {
            let score = r.score.unwrap_or(-1.0);
            prop_assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
