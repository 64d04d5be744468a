//! Deterministic synthetic price series for demos and benchmarks.
//!
//! The RNG seed is derived from the symbol with BLAKE3, so the same symbol
//! always yields the same series regardless of call order or thread.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{is_weekday, Bar, TimeSeries};

/// Seed for a symbol's generator.
pub fn seed_for(symbol: &str) -> u64 {
    let hash = blake3::hash(symbol.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Random-walk OHLCV bars on every weekday in `[start, end]`.
///
/// Volume follows a log-normal-ish walk with occasional bursts so the series
/// contains a realistic spread of record events.
pub fn synthetic_series(symbol: &str, start: NaiveDate, end: NaiveDate) -> TimeSeries {
    let mut rng = StdRng::seed_from_u64(seed_for(symbol));
    let mut close: f64 = 50.0 + rng.gen_range(0.0..150.0);
    let base_volume: f64 = rng.gen_range(100_000.0..5_000_000.0);

    let bars = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_weekday(*d))
        .map(|date| {
            let open = close;
            close = (open * (1.0 + rng.gen_range(-0.03..0.03))).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let burst = if rng.gen_bool(0.01) {
                rng.gen_range(2.0..6.0)
            } else {
                1.0
            };
            let volume = (base_volume * rng.gen_range(0.5..1.5) * burst) as u64;
            Bar {
                date,
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect();

    TimeSeries::from_bars(symbol, bars)
}
