//! Shared fixtures for render and state tests.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use equitylab_core::data::Universe;
use equitylab_core::domain::PriceSeries;
use equitylab_runner::{analyze_universe, AnalysisOptions, StudyReport};
use ratatui::buffer::Buffer;

use crate::app::AppState;

/// Daily closes from 2022-01-03 with a constant drift and a small wobble.
pub fn synthetic_series(start: f64, drift: f64, n: usize) -> PriceSeries {
    let origin = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    PriceSeries::from_pairs((0..n).map(|i| {
        let wobble = 1.0 + 0.02 * (i as f64 * 0.3).sin();
        (
            origin + Duration::days(i as i64),
            start * (1.0 + drift).powi(i as i32) * wobble,
        )
    }))
    .unwrap()
}

/// Default study universe with every symbol but XLV present.
pub fn sample_report() -> (StudyReport, BTreeMap<String, PriceSeries>) {
    let mut series = BTreeMap::new();
    for (i, symbol) in ["SPY", "GOOG", "AAPL", "AMZN", "XLP", "XLU"].iter().enumerate() {
        let drift = 0.0005 * (i as f64 - 2.0);
        series.insert(symbol.to_string(), synthetic_series(50.0 + 20.0 * i as f64, drift, 250));
    }
    let opts = AnalysisOptions {
        name: "sample".into(),
        analysis_year: 2022,
        universe: Universe::default_study(),
    };
    (analyze_universe(&series, &opts), series)
}

pub fn sample_app() -> AppState {
    let (report, series) = sample_report();
    AppState::new(report, series)
}

pub fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut content = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell((x, y)) {
                content.push_str(cell.symbol());
            }
        }
        content.push('\n');
    }
    content
}
