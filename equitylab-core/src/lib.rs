//! EquityLab Core — price series, return analytics, data acquisition.
//!
//! - Domain types: `PriceBar`, `PriceSeries`, `ReturnSeries`,
//!   `CumulativeGrowthSeries`, `DrawdownResult`
//! - Analytics: simple returns, compounded growth, window return, max drawdown
//! - Data: provider trait, Yahoo chart provider, circuit breaker, Parquet
//!   cache, CSV import, S&P 500 constituents, study universes

pub mod analytics;
pub mod data;
pub mod domain;
pub mod error;

pub use analytics::{
    annual_return, compute_cumulative_growth, compute_max_drawdown, compute_returns,
    compute_window_return, reconstruct_prices,
};
pub use domain::{
    CumulativeGrowthSeries, DrawdownResult, PriceBar, PriceField, PriceSeries, ReturnSeries,
    ReturnValue,
};
pub use error::AnalyticsError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Per-symbol pipelines run on worker threads; every value type must cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceSeries>();
        require_sync::<PriceSeries>();
        require_send::<ReturnSeries>();
        require_sync::<ReturnSeries>();
        require_send::<CumulativeGrowthSeries>();
        require_sync::<CumulativeGrowthSeries>();
        require_send::<DrawdownResult>();
        require_sync::<DrawdownResult>();
        require_send::<AnalyticsError>();
        require_sync::<AnalyticsError>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
    }

    #[test]
    fn full_pipeline_on_reference_prices() {
        let start = chrono::NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let prices = PriceSeries::from_pairs(
            [100.0, 80.0, 90.0, 60.0, 120.0]
                .into_iter()
                .enumerate()
                .map(|(i, c)| (start + chrono::Duration::days(i as i64), c)),
        )
        .unwrap();

        let returns = compute_returns(&prices).unwrap();
        let growth = compute_cumulative_growth(&returns);
        let window = compute_window_return(&prices).unwrap();
        let dd = compute_max_drawdown(&prices).unwrap();

        assert_eq!(returns.len(), 5);
        assert!((growth.final_growth().unwrap() - 1.2).abs() < 1e-12);
        assert!((window - 0.2).abs() < 1e-12);
        assert_eq!(dd.max_drop_absolute, 40.0);
    }
}
