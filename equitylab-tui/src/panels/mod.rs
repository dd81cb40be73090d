//! Chart and table widgets for the three views.

pub mod growth_chart;
pub mod price_chart;
pub mod summary;

pub use growth_chart::{GrowthChart, GrowthLine};
pub use price_chart::PriceChart;
pub use summary::SummaryTable;

use chrono::NaiveDate;

/// X coordinate of a date: days since `origin`.
pub(crate) fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

/// Padded `[lo, hi]` y bounds. Flat data gets a fixed margin.
pub(crate) fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    let range = hi - lo;
    let pad = if range > 0.0 { range * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    [lo - pad, hi + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_pad_five_percent() {
        let [lo, hi] = padded_bounds([100.0, 200.0].into_iter());
        assert_eq!(lo, 95.0);
        assert_eq!(hi, 205.0);
    }

    #[test]
    fn flat_and_empty_bounds_are_usable() {
        let [lo, hi] = padded_bounds([50.0, 50.0].into_iter());
        assert!(lo < 50.0 && hi > 50.0);
        assert_eq!(padded_bounds(std::iter::empty()), [0.0, 1.0]);
    }

    #[test]
    fn day_offset_counts_calendar_days() {
        let a = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let b = NaiveDate::from_ymd_opt(2022, 2, 2).unwrap();
        assert_eq!(day_offset(a, b), 30.0);
    }
}
