//! EquityLab TUI — price history and cumulative growth comparisons.
//!
//! Views:
//! 1. Prices — 2x2 grid of price histories
//! 2. Growth — cumulative growth per group against the benchmark
//! 3. Summary — analysis-year return and max drop per symbol

pub mod app;
pub mod input;
pub mod panels;
pub mod theme;
pub mod ui;

pub use app::{AppState, View};
pub use theme::Theme;

#[cfg(test)]
mod test_helpers;
