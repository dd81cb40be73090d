//! Domain types for EquityLab

pub mod bar;
pub mod series;

pub use bar::{PriceBar, PriceField};
pub use series::{
    CumulativeGrowthSeries, DrawdownResult, GrowthPoint, PriceSeries, ReturnPoint, ReturnSeries,
    ReturnValue,
};
