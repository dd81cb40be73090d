//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: the full `StudyReport` with schema versioning
//! - **CSV**: per-symbol `date,close,daily_return,cumulative_return` tables
//!   and a one-row-per-symbol summary
//! - **Markdown**: per-group tables of annual return and max drawdown
//!
//! Unknown schema versions are rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use equitylab_core::domain::{CumulativeGrowthSeries, PriceSeries, ReturnSeries};

use crate::pipeline::{StudyReport, SymbolAnalysis, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &StudyReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize StudyReport to JSON")
}

/// Deserialize a `StudyReport`, rejecting unknown schema versions.
///
/// Return and growth series are not persisted; they come back empty.
pub fn import_json(json: &str) -> Result<StudyReport> {
    let report: StudyReport =
        serde_json::from_str(json).context("failed to deserialize StudyReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per bar. `cumulative_return` is `growth - 1`; the first row's
/// `daily_return` cell is empty.
pub fn export_series_csv(
    prices: &PriceSeries,
    returns: &ReturnSeries,
    growth: &CumulativeGrowthSeries,
) -> Result<String> {
    if returns.len() != prices.len() || growth.len() != prices.len() {
        bail!(
            "series lengths differ: {} prices, {} returns, {} growth points",
            prices.len(),
            returns.len(),
            growth.len()
        );
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "close", "daily_return", "cumulative_return"])?;
    for ((bar, r), g) in prices.iter().zip(returns.iter()).zip(growth.iter()) {
        let daily = r
            .value
            .as_option()
            .map(|v| format!("{v:.8}"))
            .unwrap_or_default();
        wtr.write_record([
            bar.date.to_string(),
            format!("{:.6}", bar.close),
            daily,
            format!("{:.8}", g.growth - 1.0),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per analysed symbol, then one per failure with an `error` cell.
pub fn export_summary_csv(report: &StudyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "first_date",
        "last_date",
        "observations",
        "total_return",
        "max_drop_absolute",
        "max_drop_percent",
        "year",
        "annual_return",
        "year_max_drop_absolute",
        "year_max_drop_percent",
        "error",
    ])?;

    for a in report.analyses.values() {
        wtr.write_record([
            a.symbol.clone(),
            a.first_date.to_string(),
            a.last_date.to_string(),
            a.observations.to_string(),
            format!("{:.6}", a.total_return),
            format!("{:.4}", a.full_drawdown.max_drop_absolute),
            format!("{:.6}", a.full_drawdown.max_drop_percent),
            a.window.year.to_string(),
            format!("{:.6}", a.window.annual_return),
            format!("{:.4}", a.window.drawdown.max_drop_absolute),
            format!("{:.6}", a.window.drawdown.max_drop_percent),
            String::new(),
        ])?;
    }
    for (symbol, error) in &report.failures {
        let mut row = vec![symbol.clone()];
        row.extend(std::iter::repeat(String::new()).take(10));
        row.push(error.clone());
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a study run.
///
/// Creates `{name}_{timestamp}/` under `output_dir` containing:
/// - `report.json` — the full `StudyReport`
/// - `summary.csv` — one row per symbol
/// - `report.md` — human-readable tables
/// - `{symbol}.csv` — per-symbol series, when `per_symbol_csv` is set
///
/// Returns the path to the created directory.
pub fn save_artifacts(
    report: &StudyReport,
    series: &BTreeMap<String, PriceSeries>,
    output_dir: &Path,
    per_symbol_csv: bool,
) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        sanitize(&report.name),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("summary.csv"), export_summary_csv(report)?)?;
    std::fs::write(run_dir.join("report.md"), render_markdown(report))?;

    if per_symbol_csv {
        for (symbol, analysis) in &report.analyses {
            let Some(prices) = series.get(symbol) else {
                continue;
            };
            let csv = export_series_csv(prices, &analysis.returns, &analysis.growth)
                .with_context(|| format!("failed to export series for {symbol}"))?;
            std::fs::write(run_dir.join(format!("{}.csv", sanitize(symbol))), csv)?;
        }
    }

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `StudyReport` from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<StudyReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Percent with two decimals, as in `-19.48%`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// `SPY 2022 return: -19.48%` / `SPY 2022 max drop: $92.13 (-24.50%)`.
pub fn summary_lines(analysis: &SymbolAnalysis) -> [String; 2] {
    let w = &analysis.window;
    [
        format!(
            "{} {} return: {}",
            analysis.symbol,
            w.year,
            format_percent(w.annual_return)
        ),
        format!(
            "{} {} max drop: ${:.2} (-{})",
            analysis.symbol,
            w.year,
            w.drawdown.max_drop_absolute,
            format_percent(w.drawdown.max_drop_percent)
        ),
    ]
}

/// Keep free text inside a single Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

pub fn render_markdown(report: &StudyReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# Study Report: {}\n\n", report.name));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Analysis Year | {} |\n", report.analysis_year));
    md.push_str(&format!("| Symbols | {} |\n", report.analyses.len()));
    if !report.dataset_hash.is_empty() {
        md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    }
    if report.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    for group in report.group_names() {
        md.push_str(&format!("## {group}\n\n"));
        md.push_str(&format!(
            "| Symbol | {y} Return | {y} Max Drop | {y} Max Drop % | Total Return |\n",
            y = report.analysis_year
        ));
        md.push_str("| --- | ---: | ---: | ---: | ---: |\n");
        for row in report.group_rows(group) {
            match (row.analysis, row.failure) {
                (Some(a), _) => md.push_str(&format!(
                    "| {} | {} | ${:.2} | {} | {} |\n",
                    row.symbol,
                    format_percent(a.window.annual_return),
                    a.window.drawdown.max_drop_absolute,
                    format_percent(a.window.drawdown.max_drop_percent),
                    format_percent(a.total_return),
                )),
                (None, Some(err)) => md.push_str(&format!(
                    "| {} | error: {} | | | |\n",
                    row.symbol,
                    escape_cell(err)
                )),
                (None, None) => md.push_str(&format!("| {} | no data | | | |\n", row.symbol)),
            }
        }
        md.push('\n');
    }

    if !report.failures.is_empty() {
        md.push_str("## Failures\n\n");
        for (symbol, err) in &report.failures {
            md.push_str(&format!("- {symbol}: {err}\n"));
        }
        md.push('\n');
    }

    md
}
