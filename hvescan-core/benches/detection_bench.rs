//! Criterion benchmarks for detection hot paths.
//!
//! Benchmarks:
//! 1. Whole-history record scan at several series lengths
//! 2. Trailing-window scan
//! 3. Top-K ranking over all days

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hvescan_core::data::synthetic_series;
use hvescan_core::detect::{
    find_all_time_records, find_records_in_window, top_k_by_volume, VolumeDay,
};
use hvescan_core::domain::TimeSeries;

fn series_of_years(years: i32) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    let end = NaiveDate::from_ymd_opt(2000 + years, 1, 3).unwrap();
    synthetic_series("BENCH", start, end)
}

fn bench_all_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_time_records");
    for years in [1, 5, 20] {
        let series = series_of_years(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &series, |b, s| {
            b.iter(|| find_all_time_records(black_box(s)))
        });
    }
    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let series = series_of_years(20);
    let records = find_all_time_records(&series);
    c.bench_function("window_365_over_20y", |b| {
        b.iter(|| {
            find_records_in_window(
                black_box(&series),
                365,
                records.hve_date,
                records.hve_volume,
            )
        })
    });
}

fn bench_top_k(c: &mut Criterion) {
    let series = series_of_years(20);
    c.bench_function("top_10_over_20y", |b| {
        b.iter(|| top_k_by_volume(black_box(series.bars()).iter().map(VolumeDay::from), 10))
    });
}

criterion_group!(benches, bench_all_time, bench_window, bench_top_k);
criterion_main!(benches);
