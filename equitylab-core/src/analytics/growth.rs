//! Cumulative growth transform: returns → compounded growth index.

use crate::domain::{CumulativeGrowthSeries, GrowthPoint, ReturnSeries};

/// Running product of `1 + r`, seeded at 1.0.
///
/// `growth[0]` is 1.0 whatever the first return holds, and absent returns
/// are treated as the multiplicative identity.
pub fn compute_cumulative_growth(returns: &ReturnSeries) -> CumulativeGrowthSeries {
    let mut points = Vec::with_capacity(returns.len());
    let mut growth = 1.0_f64;

    for (i, point) in returns.iter().enumerate() {
        if i > 0 {
            growth *= point.value.growth_factor();
        }
        points.push(GrowthPoint {
            date: point.date,
            growth,
        });
    }

    CumulativeGrowthSeries::new(points)
}

/// Rebuild closes from the first close and a growth index: `anchor * growth[i]`.
pub fn reconstruct_prices(anchor_close: f64, growth: &CumulativeGrowthSeries) -> Vec<f64> {
    growth.iter().map(|p| anchor_close * p.growth).collect()
}
