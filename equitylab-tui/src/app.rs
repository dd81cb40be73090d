//! Application state — single-owner, main-thread only.

use std::collections::BTreeMap;

use equitylab_core::domain::PriceSeries;
use equitylab_runner::StudyReport;

use crate::theme::Theme;

/// Symbols shown in the price grid when the study does not override them.
pub const DEFAULT_GRID: [&str; 4] = ["SPY", "GOOG", "AAPL", "AMZN"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    PriceGrid,
    Growth,
    Summary,
}

impl View {
    pub const ALL: [View; 3] = [View::PriceGrid, View::Growth, View::Summary];

    pub fn index(self) -> usize {
        match self {
            View::PriceGrid => 0,
            View::Growth => 1,
            View::Summary => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            View::PriceGrid => "Prices",
            View::Growth => "Growth",
            View::Summary => "Summary",
        }
    }

    pub fn next(self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct AppState {
    pub view: View,
    pub report: StudyReport,
    pub series: BTreeMap<String, PriceSeries>,
    pub grid_symbols: Vec<String>,
    pub group_index: usize,
    pub theme: Theme,
    pub running: bool,
}

impl AppState {
    pub fn new(report: StudyReport, series: BTreeMap<String, PriceSeries>) -> Self {
        let grid_symbols = DEFAULT_GRID.iter().map(|s| s.to_string()).collect();
        Self {
            view: View::PriceGrid,
            report,
            series,
            grid_symbols,
            group_index: 0,
            theme: Theme::default(),
            running: true,
        }
    }

    /// Groups available for the growth view. The benchmark group on its
    /// own is skipped when others exist, since every comparison already
    /// carries the benchmark line.
    pub fn comparison_groups(&self) -> Vec<&str> {
        let names = self.report.group_names();
        let bench_group = equitylab_core::data::universe::BENCHMARK_GROUP;
        if names.len() > 1 {
            names.into_iter().filter(|n| *n != bench_group).collect()
        } else {
            names
        }
    }

    pub fn current_group(&self) -> Option<&str> {
        let groups = self.comparison_groups();
        if groups.is_empty() {
            return None;
        }
        groups.get(self.group_index % groups.len()).copied()
    }

    pub fn next_group(&mut self) {
        let n = self.comparison_groups().len();
        if n > 0 {
            self.group_index = (self.group_index + 1) % n;
        }
    }

    pub fn prev_group(&mut self) {
        let n = self.comparison_groups().len();
        if n > 0 {
            self.group_index = (self.group_index + n - 1) % n;
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}
