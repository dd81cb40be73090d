//! Window return: total return between the first and last close of a window.

use crate::domain::PriceSeries;
use crate::error::AnalyticsError;

/// `(last - first) / first` over the whole series.
///
/// The caller chooses the window (e.g. [`PriceSeries::year`]). An empty
/// window is an error, never a silent zero.
pub fn compute_window_return(prices: &PriceSeries) -> Result<f64, AnalyticsError> {
    let (first, last) = match (prices.first(), prices.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(AnalyticsError::EmptyInput {
                operation: "window return",
            })
        }
    };

    if first.close <= 0.0 {
        return Err(AnalyticsError::DegenerateData {
            index: 0,
            date: first.date,
            price: first.close,
        });
    }

    Ok((last.close - first.close) / first.close)
}

/// Return from the first to the last close inside calendar year `year`.
///
/// Not anchored on the previous year's final close.
pub fn annual_return(prices: &PriceSeries, year: i32) -> Result<f64, AnalyticsError> {
    compute_window_return(&prices.year(year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fifty_to_fifty_five_is_ten_percent() {
        let s = PriceSeries::from_pairs([(d(2022, 1, 3), 50.0), (d(2022, 1, 4), 55.0)]).unwrap();
        assert!((compute_window_return(&s).unwrap() - 0.10).abs() < 1e-15);
    }

    #[test]
    fn loss_is_negative() {
        let s = PriceSeries::from_pairs([(d(2022, 1, 3), 200.0), (d(2022, 12, 30), 150.0)])
            .unwrap();
        assert!((compute_window_return(&s).unwrap() + 0.25).abs() < 1e-15);
    }

    #[test]
    fn single_bar_window_is_zero() {
        let s = PriceSeries::from_pairs([(d(2022, 1, 3), 50.0)]).unwrap();
        assert_eq!(compute_window_return(&s).unwrap(), 0.0);
    }

    #[test]
    fn empty_window_is_invalid_input() {
        let err = compute_window_return(&PriceSeries::empty()).unwrap_err();
        assert!(err.is_empty_input());
    }

    #[test]
    fn zero_first_close_is_degenerate() {
        let s = PriceSeries::from_pairs([(d(2022, 1, 3), 0.0), (d(2022, 1, 4), 5.0)]).unwrap();
        assert!(compute_window_return(&s).unwrap_err().is_degenerate());
    }

    #[test]
    fn annual_return_uses_in_year_endpoints() {
        let s = PriceSeries::from_pairs([
            (d(2021, 12, 31), 80.0),
            (d(2022, 1, 3), 100.0),
            (d(2022, 6, 1), 70.0),
            (d(2022, 12, 30), 90.0),
            (d(2023, 1, 3), 120.0),
        ])
        .unwrap();
        assert!((annual_return(&s, 2022).unwrap() + 0.10).abs() < 1e-12);
    }

    #[test]
    fn annual_return_for_missing_year_fails() {
        let s = PriceSeries::from_pairs([(d(2022, 1, 3), 100.0)]).unwrap();
        assert!(annual_return(&s, 2026).unwrap_err().is_empty_input());
    }
}
