//! Return transform: prices → period-over-period simple returns.

use crate::domain::{PriceSeries, ReturnPoint, ReturnSeries, ReturnValue};
use crate::error::AnalyticsError;

/// Simple returns `(close[i] - close[i-1]) / close[i-1]`.
///
/// The output has the same length as the input and its first element is
/// [`ReturnValue::Absent`]. Fails with [`AnalyticsError::DegenerateData`] at the
/// first element whose predecessor close is zero or negative.
pub fn compute_returns(prices: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    let bars = prices.bars();
    let mut points = Vec::with_capacity(bars.len());

    if let Some(first) = bars.first() {
        points.push(ReturnPoint {
            date: first.date,
            value: ReturnValue::Absent,
        });
    }

    for (i, pair) in bars.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if prev.close <= 0.0 {
            return Err(AnalyticsError::DegenerateData {
                index: i + 1,
                date: cur.date,
                price: prev.close,
            });
        }
        points.push(ReturnPoint {
            date: cur.date,
            value: ReturnValue::Present((cur.close - prev.close) / prev.close),
        });
    }

    Ok(ReturnSeries::new(points))
}
