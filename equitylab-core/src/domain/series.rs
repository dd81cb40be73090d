//! Series value types: prices in, derived returns/growth/drawdown out.
//!
//! All series are immutable once built. Transforms in [`crate::analytics`]
//! take a series by reference and return a new one.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::bar::PriceBar;
use crate::error::AnalyticsError;

/// Chronologically ordered closing prices with strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate dates and
    /// non-finite prices.
    ///
    /// Zero or negative closes are accepted here; the transforms that would
    /// divide by them fail with [`AnalyticsError::DegenerateData`].
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, AnalyticsError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(AnalyticsError::NonFinitePrice {
                    index: i,
                    date: bar.date,
                });
            }
            if i > 0 {
                let previous = bars[i - 1].date;
                if bar.date == previous {
                    return Err(AnalyticsError::DuplicateDate {
                        index: i,
                        date: bar.date,
                    });
                }
                if bar.date < previous {
                    return Err(AnalyticsError::OutOfOrder {
                        index: i,
                        previous,
                        date: bar.date,
                    });
                }
            }
        }
        Ok(Self { bars })
    }

    /// Build a series from `(date, close)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, AnalyticsError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, close)| PriceBar::new(date, close))
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceBar> {
        self.bars.iter()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Bars with `start <= date <= end`. May be empty.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let lo = self.bars.partition_point(|b| b.date < start);
        let hi = self.bars.partition_point(|b| b.date <= end);
        let bars = if lo < hi {
            self.bars[lo..hi].to_vec()
        } else {
            Vec::new()
        };
        // A contiguous slice of a valid series is itself valid.
        PriceSeries { bars }
    }

    /// Bars falling in calendar year `year`. May be empty.
    pub fn year(&self, year: i32) -> PriceSeries {
        match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(start), Some(end)) => self.window(start, end),
            _ => PriceSeries::empty(),
        }
    }

    /// Distinct calendar years covered, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.bars.iter().map(|b| b.date.year()).collect();
        years.dedup();
        years
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = AnalyticsError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        PriceSeries::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceBar;
    type IntoIter = std::slice::Iter<'a, PriceBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

/// A simple return that may be missing.
///
/// The first observation of any return series has no predecessor and is
/// `Absent`, which is distinct from a genuine zero return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum ReturnValue {
    Present(f64),
    Absent,
}

impl ReturnValue {
    pub fn as_option(self) -> Option<f64> {
        match self {
            ReturnValue::Present(r) => Some(r),
            ReturnValue::Absent => None,
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self, ReturnValue::Absent)
    }

    /// Growth factor `1 + r`; absent returns contribute the identity.
    pub fn growth_factor(self) -> f64 {
        match self {
            ReturnValue::Present(r) => 1.0 + r,
            ReturnValue::Absent => 1.0,
        }
    }
}

impl From<Option<f64>> for ReturnValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ReturnValue::Absent, ReturnValue::Present)
    }
}

impl From<ReturnValue> for Option<f64> {
    fn from(value: ReturnValue) -> Self {
        value.as_option()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: ReturnValue,
}

/// Period-over-period simple returns, aligned 1:1 with a price series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReturnPoint> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> Option<ReturnValue> {
        self.points.get(index).map(|p| p.value)
    }

    /// The present returns only, in order.
    pub fn present_values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value.as_option()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub growth: f64,
}

/// Compounded growth of one unit invested at the first observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeGrowthSeries {
    points: Vec<GrowthPoint>,
}

impl CumulativeGrowthSeries {
    pub fn new(points: Vec<GrowthPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GrowthPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GrowthPoint> {
        self.points.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.growth).collect()
    }

    /// Growth index at the last observation.
    pub fn final_growth(&self) -> Option<f64> {
        self.points.last().map(|p| p.growth)
    }

    /// Total compounded return over the whole series (`final - 1`).
    pub fn total_return(&self) -> Option<f64> {
        self.final_growth().map(|g| g - 1.0)
    }
}

/// Largest peak-to-trough decline and the percentage that co-occurred with it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawdownResult {
    pub max_drop_absolute: f64,
    pub max_drop_percent: f64,
}

impl DrawdownResult {
    pub fn zero() -> Self {
        Self::default()
    }
}
