//! Study pipeline: per-symbol analytics and the keyed report they roll up into.
//!
//! Each symbol is analysed independently: returns and compounded growth over
//! the full loaded range, full-range drawdown, and the analysis-year window
//! return and drawdown. `analyze_universe` fans symbols out over rayon and
//! keeps failures next to successes so nothing is silently dropped.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use equitylab_core::analytics::{
    compute_cumulative_growth, compute_max_drawdown, compute_returns, compute_window_return,
};
use equitylab_core::data::cache::ParquetCache;
use equitylab_core::data::provider::{DataProvider, DownloadProgress};
use equitylab_core::data::universe::{Universe, BENCHMARK_GROUP};
use equitylab_core::domain::{CumulativeGrowthSeries, DrawdownResult, PriceSeries, ReturnSeries};
use equitylab_core::error::AnalyticsError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StudyConfig;
use crate::data_loader::{load_series, LoadError, LoadOptions, LoadedData};

/// Current report schema version. Bump on breaking changes to `StudyReport`.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StudyError {
    #[error("analytics failed: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("data loading failed: {0}")]
    Load(#[from] LoadError),
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub name: String,
    pub analysis_year: i32,
    pub universe: Universe,
}

impl AnalysisOptions {
    pub fn from_config(config: &StudyConfig) -> Self {
        Self {
            name: config.study.name.clone(),
            analysis_year: config.study.analysis_year,
            universe: config.universe.clone(),
        }
    }
}

/// Metrics restricted to one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_close: f64,
    pub last_close: f64,
    pub observations: usize,
    pub annual_return: f64,
    pub drawdown: DrawdownResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub observations: usize,
    /// Compounded return over the full loaded range.
    pub total_return: f64,
    pub full_drawdown: DrawdownResult,
    pub window: WindowMetrics,
    #[serde(skip)]
    pub returns: ReturnSeries,
    #[serde(skip)]
    pub growth: CumulativeGrowthSeries,
}

/// Analyse one symbol's series.
///
/// An analysis year with no bars fails with `EmptyInput` rather than
/// reporting a zero return.
pub fn analyze_symbol(
    symbol: &str,
    prices: &PriceSeries,
    opts: &AnalysisOptions,
) -> Result<SymbolAnalysis, StudyError> {
    let (first, last) = match (prices.first(), prices.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => {
            return Err(AnalyticsError::EmptyInput {
                operation: "symbol analysis",
            }
            .into())
        }
    };

    let returns = compute_returns(prices)?;
    let growth = compute_cumulative_growth(&returns);
    let total_return = compute_window_return(prices)?;
    let full_drawdown = compute_max_drawdown(prices)?;

    let year = prices.year(opts.analysis_year);
    let annual_return = compute_window_return(&year)?;
    let year_drawdown = compute_max_drawdown(&year)?;
    let (year_first, year_last) = match (year.first(), year.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => {
            return Err(AnalyticsError::EmptyInput {
                operation: "annual window",
            }
            .into())
        }
    };

    tracing::debug!(
        symbol,
        year = opts.analysis_year,
        annual_return,
        max_drop = year_drawdown.max_drop_absolute,
        "analysed"
    );

    Ok(SymbolAnalysis {
        symbol: symbol.to_string(),
        first_date: first.date,
        last_date: last.date,
        observations: prices.len(),
        total_return,
        full_drawdown,
        window: WindowMetrics {
            year: opts.analysis_year,
            start_date: year_first.date,
            end_date: year_last.date,
            first_close: year_first.close,
            last_close: year_last.close,
            observations: year.len(),
            annual_return,
            drawdown: year_drawdown,
        },
        returns,
        growth,
    })
}

/// One symbol's line in a group comparison.
#[derive(Debug, Clone, Copy)]
pub struct GroupRow<'a> {
    pub symbol: &'a str,
    pub analysis: Option<&'a SymbolAnalysis>,
    pub failure: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub schema_version: u32,
    pub name: String,
    pub analysis_year: i32,
    pub analyses: BTreeMap<String, SymbolAnalysis>,
    /// Symbol → error message for symbols that could not be analysed.
    pub failures: BTreeMap<String, String>,
    pub groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub dataset_hash: String,
    #[serde(default)]
    pub has_synthetic: bool,
}

impl StudyReport {
    /// Rows for a group, in the group's listing order. Unknown groups are empty.
    pub fn group_rows(&self, group: &str) -> Vec<GroupRow<'_>> {
        self.groups
            .get(group)
            .map(|symbols| symbols.iter().map(|s| self.row(s)).collect())
            .unwrap_or_default()
    }

    /// Group rows with the benchmark prepended when the group lacks it.
    pub fn group_rows_with_benchmark(&self, group: &str) -> Vec<GroupRow<'_>> {
        let mut rows = self.group_rows(group);
        if let Some(bench) = self.benchmark() {
            if !rows.iter().any(|r| r.symbol == bench) {
                rows.insert(0, self.row(bench));
            }
        }
        rows
    }

    pub fn benchmark(&self) -> Option<&str> {
        self.groups
            .get(BENCHMARK_GROUP)
            .and_then(|g| g.first())
            .map(|s| s.as_str())
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(|s| s.as_str()).collect()
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolAnalysis> {
        self.analyses.get(symbol)
    }

    fn row<'a>(&'a self, symbol: &'a str) -> GroupRow<'a> {
        GroupRow {
            symbol,
            analysis: self.analyses.get(symbol),
            failure: self.failures.get(symbol).map(|s| s.as_str()),
        }
    }
}

/// Analyse every series in parallel.
///
/// Per-symbol failures are logged and recorded in `failures`.
pub fn analyze_universe(
    series: &BTreeMap<String, PriceSeries>,
    opts: &AnalysisOptions,
) -> StudyReport {
    let results: Vec<(String, Result<SymbolAnalysis, StudyError>)> = series
        .par_iter()
        .map(|(symbol, prices)| (symbol.clone(), analyze_symbol(symbol, prices, opts)))
        .collect();

    let mut analyses = BTreeMap::new();
    let mut failures = BTreeMap::new();
    for (symbol, result) in results {
        match result {
            Ok(a) => {
                analyses.insert(symbol, a);
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "analysis failed");
                failures.insert(symbol, e.to_string());
            }
        }
    }

    tracing::info!(
        analysed = analyses.len(),
        failed = failures.len(),
        year = opts.analysis_year,
        "study complete"
    );

    StudyReport {
        schema_version: SCHEMA_VERSION,
        name: opts.name.clone(),
        analysis_year: opts.analysis_year,
        analyses,
        failures,
        groups: opts.universe.groups.clone(),
        dataset_hash: String::new(),
        has_synthetic: false,
    }
}

/// Load every symbol in the study and analyse it.
///
/// Symbols that fail to load land in `StudyReport::failures` next to the
/// ones that fail analysis; only a study where nothing loads is an error.
pub fn run_study(
    config: &StudyConfig,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    progress: Option<&dyn DownloadProgress>,
    load: &LoadOptions,
) -> Result<(StudyReport, LoadedData), StudyError> {
    let symbols = config.symbols();
    let loaded = load_series(&symbols, cache, provider, progress, load)?;
    let mut report = analyze_universe(&loaded.series, &AnalysisOptions::from_config(config));
    report.failures.extend(loaded.failures.clone());
    report.dataset_hash = loaded.dataset_hash.clone();
    report.has_synthetic = loaded.has_synthetic;
    Ok((report, loaded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn opts(year: i32) -> AnalysisOptions {
        AnalysisOptions {
            name: "test".into(),
            analysis_year: year,
            universe: Universe::default_study(),
        }
    }

    fn two_year_series() -> PriceSeries {
        PriceSeries::from_pairs([
            (d(2021, 12, 30), 90.0),
            (d(2021, 12, 31), 100.0),
            (d(2022, 1, 3), 100.0),
            (d(2022, 3, 1), 80.0),
            (d(2022, 6, 1), 90.0),
            (d(2022, 9, 1), 60.0),
            (d(2022, 12, 30), 120.0),
            (d(2023, 1, 3), 110.0),
        ])
        .unwrap()
    }

    #[test]
    fn analyses_year_window_from_its_own_first_close() {
        let a = analyze_symbol("SPY", &two_year_series(), &opts(2022)).unwrap();
        assert_eq!(a.window.start_date, d(2022, 1, 3));
        assert_eq!(a.window.end_date, d(2022, 12, 30));
        assert!((a.window.annual_return - 0.20).abs() < 1e-12);
        assert_eq!(a.window.drawdown.max_drop_absolute, 40.0);
        assert!((a.window.drawdown.max_drop_percent - 0.40).abs() < 1e-12);
        assert_eq!(a.window.observations, 5);
    }

    #[test]
    fn full_range_metrics() {
        let a = analyze_symbol("SPY", &two_year_series(), &opts(2022)).unwrap();
        assert_eq!(a.observations, 8);
        assert_eq!(a.returns.len(), 8);
        assert_eq!(a.growth.len(), 8);
        assert!((a.total_return - (110.0 / 90.0 - 1.0)).abs() < 1e-12);
        assert!((a.growth.total_return().unwrap() - a.total_return).abs() < 1e-12);
    }

    #[test]
    fn missing_year_is_empty_input() {
        let err = analyze_symbol("SPY", &two_year_series(), &opts(2019)).unwrap_err();
        assert!(matches!(err, StudyError::Analytics(e) if e.is_empty_input()));
    }

    #[test]
    fn empty_series_is_empty_input() {
        let err = analyze_symbol("SPY", &PriceSeries::empty(), &opts(2022)).unwrap_err();
        assert!(matches!(err, StudyError::Analytics(e) if e.is_empty_input()));
    }

    #[test]
    fn universe_records_failures_alongside_results() {
        let mut series = BTreeMap::new();
        series.insert("SPY".to_string(), two_year_series());
        series.insert(
            "XLU".to_string(),
            PriceSeries::from_pairs([(d(2022, 1, 3), 0.0), (d(2022, 1, 4), 1.0)]).unwrap(),
        );

        let report = analyze_universe(&series, &opts(2022));
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert!(report.analyses.contains_key("SPY"));
        assert!(report.failures["XLU"].contains("degenerate"));
    }

    #[test]
    fn group_rows_follow_listing_order_and_mark_missing() {
        let mut series = BTreeMap::new();
        series.insert("SPY".to_string(), two_year_series());
        series.insert("AAPL".to_string(), two_year_series());
        let report = analyze_universe(&series, &opts(2022));

        let rows = report.group_rows("Big Tech");
        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol).collect();
        assert_eq!(symbols, vec!["GOOG", "AAPL", "AMZN"]);
        assert!(rows[0].analysis.is_none());
        assert!(rows[1].analysis.is_some());

        let with_bench = report.group_rows_with_benchmark("Defensive");
        assert_eq!(with_bench[0].symbol, "SPY");
        assert_eq!(with_bench.len(), 4);
        assert_eq!(report.group_rows_with_benchmark("Benchmark").len(), 1);
        assert!(report.group_rows("Nope").is_empty());
    }

    proptest::proptest! {
        #[test]
        fn annual_return_matches_growth_ratio(
            closes in proptest::collection::vec(1.0..500.0_f64, 2..120)
        ) {
            let start = d(2022, 1, 1);
            let prices = PriceSeries::from_pairs(
                closes.iter().enumerate().map(|(i, &c)| (start + chrono::Duration::days(i as i64), c)),
            )
            .unwrap();
            let a = analyze_symbol("X", &prices, &opts(2022)).unwrap();
            let g = a.growth.values();
            let year_len = a.window.observations;
            let ratio = g[year_len - 1] / g[0] - 1.0;
            proptest::prop_assert!((a.window.annual_return - ratio).abs() < 1e-9);
        }
    }
}
