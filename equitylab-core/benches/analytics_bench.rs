//! Criterion benchmarks for the analytic transforms.
//!
//! Benchmarks:
//! 1. Simple returns over a long daily series
//! 2. Cumulative growth from returns
//! 3. Max drawdown scan
//! 4. Raw bar ingest into a `PriceSeries`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use equitylab_core::analytics::{compute_cumulative_growth, compute_max_drawdown, compute_returns};
use equitylab_core::data::provider::RawBar;
use equitylab_core::data::{ingest, price_series_from_raw};
use equitylab_core::domain::{PriceField, PriceSeries};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_raw_bars(n: usize) -> Vec<RawBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2014, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            RawBar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
                adj_close: close * 0.98,
            }
        })
        .collect()
}

fn make_series(n: usize) -> PriceSeries {
    price_series_from_raw(&make_raw_bars(n), PriceField::AdjClose).unwrap()
}

const SIZES: [usize; 3] = [252, 2_770, 10_000];

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_returns(c: &mut Criterion) {
    let mut group = c.benchmark_group("returns");
    for n in SIZES {
        let prices = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &prices, |b, p| {
            b.iter(|| compute_returns(black_box(p)))
        });
    }
    group.finish();
}

fn bench_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("cumulative_growth");
    for n in SIZES {
        let returns = compute_returns(&make_series(n)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &returns, |b, r| {
            b.iter(|| compute_cumulative_growth(black_box(r)))
        });
    }
    group.finish();
}

fn bench_drawdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("max_drawdown");
    for n in SIZES {
        let prices = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &prices, |b, p| {
            b.iter(|| compute_max_drawdown(black_box(p)))
        });
    }
    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    let raw = make_raw_bars(2_770);
    c.bench_function("ingest_2770", |b| {
        b.iter(|| {
            let cleaned = ingest(black_box(raw.clone())).unwrap();
            price_series_from_raw(&cleaned.bars, PriceField::AdjClose)
        })
    });
}

criterion_group!(benches, bench_returns, bench_growth, bench_drawdown, bench_ingest);
criterion_main!(benches);
