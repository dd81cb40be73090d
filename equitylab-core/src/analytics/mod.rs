//! Analytics — pure reductions over a single price series.
//!
//! Every function takes its input by reference and returns a new value. No
//! I/O, no shared state: a caller may run them for many symbols in parallel.

pub mod drawdown;
pub mod growth;
pub mod returns;
pub mod window;

pub use drawdown::compute_max_drawdown;
pub use growth::{compute_cumulative_growth, reconstruct_prices};
pub use returns::compute_returns;
pub use window::{annual_return, compute_window_return};
