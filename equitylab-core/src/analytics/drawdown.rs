//! Maximum drawdown with the absolute and percentage decline kept together.

use crate::domain::{DrawdownResult, PriceSeries};
use crate::error::AnalyticsError;

/// Largest peak-to-trough decline over a chronological series.
///
/// The running peak starts at the first close and only ever rises. The
/// stored percentage is the one that co-occurred with the largest *absolute*
/// decline, not an independently tracked maximum percentage. Ties keep the
/// earlier pair.
pub fn compute_max_drawdown(prices: &PriceSeries) -> Result<DrawdownResult, AnalyticsError> {
    let first = prices.first().ok_or(AnalyticsError::EmptyInput {
        operation: "max drawdown",
    })?;

    let mut peak = first.close;
    let mut best = DrawdownResult::zero();

    for (i, bar) in prices.iter().enumerate() {
        if bar.close > peak {
            peak = bar.close;
            continue;
        }
        if peak <= 0.0 {
            return Err(AnalyticsError::DegenerateData {
                index: i,
                date: bar.date,
                price: peak,
            });
        }

        let drop = peak - bar.close;
        if drop > best.max_drop_absolute {
            best = DrawdownResult {
                max_drop_absolute: drop,
                max_drop_percent: drop / peak,
            };
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        PriceSeries::from_pairs(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| (start + chrono::Duration::days(i as i64), c)),
        )
        .unwrap()
    }

    #[test]
    fn reference_trace() {
        let dd = compute_max_drawdown(&series(&[100.0, 80.0, 90.0, 60.0, 120.0])).unwrap();
        assert_eq!(dd.max_drop_absolute, 40.0);
        assert!((dd.max_drop_percent - 0.40).abs() < 1e-12);
    }

    #[test]
    fn strictly_increasing_has_no_drawdown() {
        let dd = compute_max_drawdown(&series(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(dd, DrawdownResult::zero());
    }

    #[test]
    fn single_element_is_zero() {
        assert_eq!(
            compute_max_drawdown(&series(&[7.0])).unwrap(),
            DrawdownResult::zero()
        );
    }

    #[test]
    fn empty_is_invalid_input() {
        assert!(compute_max_drawdown(&PriceSeries::empty())
            .unwrap_err()
            .is_empty_input());
    }

    #[test]
    fn percentage_follows_largest_absolute_drop() {
        // 100 -> 50 is -50 absolute (50%). Later 200 -> 110 is -90 absolute (45%).
        // The larger absolute drop wins even though its percentage is smaller.
        let dd = compute_max_drawdown(&series(&[100.0, 50.0, 200.0, 110.0])).unwrap();
        assert_eq!(dd.max_drop_absolute, 90.0);
        assert!((dd.max_drop_percent - 0.45).abs() < 1e-12);
    }

    #[test]
    fn percentage_is_not_tracked_independently() {
        // 10 -> 5 is a 50% fall of 5; 100 -> 90 is a 10% fall of 10.
        // An independent maximum would report 50%; the coupled pair reports 10%.
        let dd = compute_max_drawdown(&series(&[10.0, 5.0, 100.0, 90.0])).unwrap();
        assert_eq!(dd.max_drop_absolute, 10.0);
        assert!((dd.max_drop_percent - 0.10).abs() < 1e-12);
    }

    #[test]
    fn equal_absolute_drop_keeps_first_pair() {
        // Both troughs are 20 below a peak of 100; the first pair is kept.
        let dd = compute_max_drawdown(&series(&[100.0, 80.0, 100.0, 80.0])).unwrap();
        assert_eq!(dd.max_drop_absolute, 20.0);
        assert!((dd.max_drop_percent - 0.20).abs() < 1e-12);
    }

    #[test]
    fn peak_never_decreases() {
        // After the peak of 120, a drop to 100 is measured against 120, not 100.
        let dd = compute_max_drawdown(&series(&[120.0, 100.0, 110.0, 90.0])).unwrap();
        assert_eq!(dd.max_drop_absolute, 30.0);
        assert!((dd.max_drop_percent - 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_peak_is_degenerate() {
        let err = compute_max_drawdown(&series(&[0.0, 0.0])).unwrap_err();
        assert!(err.is_degenerate());
    }
}
