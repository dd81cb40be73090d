//! Error taxonomy for price-series construction and the analytic transforms.
//!
//! Every variant is a deterministic data-validity failure. Callers get the
//! error at the call that detects it; nothing here is retried or masked.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// A non-empty series was required.
    #[error("{operation}: input series is empty")]
    EmptyInput { operation: &'static str },

    /// A ratio was about to be taken over a zero or negative price.
    #[error("degenerate price {price} on {date} (element {index}): cannot divide by a non-positive price")]
    DegenerateData {
        index: usize,
        date: NaiveDate,
        price: f64,
    },

    /// Dates must be strictly increasing.
    #[error("bar {index} dated {date} precedes the previous bar dated {previous}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("bar {index} repeats date {date}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("bar {index} dated {date} has a non-finite price")]
    NonFinitePrice { index: usize, date: NaiveDate },
}

impl AnalyticsError {
    /// True for the empty-series class of errors.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, AnalyticsError::EmptyInput { .. })
    }

    /// True for the division-by-zero class of errors.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, AnalyticsError::DegenerateData { .. })
    }
}
