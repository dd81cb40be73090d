//! PriceBar — one dated closing price for a single instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated closing price.
///
/// The close is expected to be strictly positive. A zero or negative close is
/// a data-quality problem which the transforms report when they would divide
/// by it; it is never silently patched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// True when the close can safely be used as a ratio denominator.
    pub fn is_valid_price(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Which column of a provider bar becomes the series close.
///
/// `AdjClose` is split- and dividend-adjusted, which is what a total-growth
/// comparison across tickers wants. `Close` is the raw traded close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Close,
    #[default]
    AdjClose,
}

impl std::str::FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close" => Ok(PriceField::Close),
            "adj_close" | "adjclose" | "adjusted" => Ok(PriceField::AdjClose),
            other => Err(format!("unknown price field '{other}' (expected close or adj_close)")),
        }
    }
}
