//! EquityLab Runner — study orchestration, per-symbol analysis, export.
//!
//! This crate builds on `equitylab-core` to provide:
//! - Study configuration (TOML) with validation
//! - Data loading with cache/download/synthetic fallback
//! - Parallel per-symbol analysis rolled up into a keyed `StudyReport`
//! - JSON, CSV and Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod pipeline;

pub use config::{ConfigError, OutputSection, StudyConfig, StudySection};
pub use data_loader::{load_series, LoadError, LoadOptions, LoadedData};
pub use export::{
    export_json, export_series_csv, export_summary_csv, format_percent, import_json,
    load_artifacts, render_markdown, save_artifacts, summary_lines,
};
pub use pipeline::{
    analyze_symbol, analyze_universe, run_study, AnalysisOptions, GroupRow, StudyError,
    StudyReport, SymbolAnalysis, WindowMetrics, SCHEMA_VERSION,
};
