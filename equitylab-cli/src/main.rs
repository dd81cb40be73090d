//! EquityLab CLI — download, analyze, constituents and cache management.
//!
//! Commands:
//! - `download` — fetch daily bars from Yahoo Finance and cache as Parquet
//! - `import` — load a CSV export into the cache when Yahoo is unreachable
//! - `analyze` — run a study (annual return, max drop, cumulative growth)
//!   and write JSON/CSV/Markdown artifacts
//! - `constituents` — list S&P 500 members, sectors and filters
//! - `cache status` — report cache size, symbol count, date ranges
//! - `cache clean` — remove symbols not refreshed recently

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equitylab_core::data::constituents::{
    fetch_sp500_constituents, filter_sector, filter_symbols, sectors, Constituent,
};
use equitylab_core::data::provider::{DataProvider, DownloadProgress};
use equitylab_core::data::{
    download_symbols, import_csv_to_cache, CircuitBreaker, LogProgress, ParquetCache, Universe,
    YahooProvider,
};
use equitylab_runner::{
    run_study, save_artifacts, summary_lines, LoadOptions, StudyConfig, StudyReport,
};

#[derive(Parser)]
#[command(
    name = "equitylab",
    about = "EquityLab CLI — equity return and drawdown studies",
    version
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily bars from Yahoo Finance and cache as Parquet.
    Download {
        /// Symbols to download (e.g., SPY GOOG AAPL). Defaults to the study universe.
        symbols: Vec<String>,

        /// Study config whose universe and date range to download.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Start date (YYYY-MM-DD). Defaults to the study start.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD, exclusive). Defaults to the study end.
        #[arg(long)]
        end: Option<String>,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Import daily bars for one symbol from a CSV file into the cache.
    Import {
        /// Symbol the bars belong to.
        symbol: String,

        /// CSV with date,open,high,low,close,volume[,adj_close] columns.
        file: PathBuf,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Analyse a study: annual return, max drop and cumulative growth per symbol.
    Analyze {
        /// Path to a TOML study file. Defaults to the built-in study.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Analyse these symbols instead of the study universe.
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Calendar year for the annual return and drawdown.
        #[arg(long)]
        year: Option<i32>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD, exclusive).
        #[arg(long)]
        end: Option<String>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Output directory for artifacts. Defaults to the study's `output.dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print results without writing artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// List S&P 500 constituents from Wikipedia.
    Constituents {
        /// Only these symbols.
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Only this GICS sector.
        #[arg(long)]
        sector: Option<String>,

        /// Print the distinct sectors instead of members.
        #[arg(long, default_value_t = false)]
        list_sectors: bool,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cache size, symbol count, and date ranges.
    Status {
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Remove cached symbols not refreshed within the given number of days.
    Clean {
        #[arg(long)]
        unused_days: u64,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Download {
            symbols,
            config,
            start,
            end,
            force,
            cache_dir,
        } => run_download(symbols, config, start, end, force, cache_dir),
        Commands::Import {
            symbol,
            file,
            cache_dir,
        } => run_import(&symbol, &file, &cache_dir),
        Commands::Analyze {
            config,
            symbols,
            year,
            start,
            end,
            offline,
            synthetic,
            cache_dir,
            output_dir,
            no_save,
        } => {
            let config = resolve_study(config, symbols, year, start, end)?;
            run_analyze(&config, offline, synthetic, &cache_dir, output_dir, no_save)
        }
        Commands::Constituents {
            symbols,
            sector,
            list_sectors,
            json,
        } => run_constituents(symbols, sector, list_sectors, json),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clean {
                unused_days,
                cache_dir,
                confirm,
            } => run_cache_clean(&cache_dir, unused_days, confirm),
        },
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

fn load_study(path: Option<PathBuf>) -> Result<StudyConfig> {
    match path {
        Some(p) => StudyConfig::from_file(&p)
            .with_context(|| format!("failed to load study config {}", p.display())),
        None => Ok(StudyConfig::default_study()),
    }
}

/// Study config with command-line overrides applied and re-validated.
fn resolve_study(
    path: Option<PathBuf>,
    symbols: Vec<String>,
    year: Option<i32>,
    start: Option<String>,
    end: Option<String>,
) -> Result<StudyConfig> {
    let mut config = load_study(path)?;
    if !symbols.is_empty() {
        config.universe = Universe::from_symbols(&symbols);
    }
    if let Some(y) = year {
        config.study.analysis_year = y;
    }
    if let Some(s) = start.as_deref() {
        config.study.start_date = parse_date(s)?;
    }
    if let Some(e) = end.as_deref() {
        config.study.end_date = parse_date(e)?;
    }
    config.validate()?;
    Ok(config)
}

fn yahoo_provider() -> Result<YahooProvider> {
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    Ok(YahooProvider::new(circuit_breaker)?)
}

fn run_download(
    symbols: Vec<String>,
    config: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    force: bool,
    cache_dir: PathBuf,
) -> Result<()> {
    let study = load_study(config)?;
    let start_date = match start.as_deref() {
        Some(s) => parse_date(s)?,
        None => study.study.start_date,
    };
    let end_date = match end.as_deref() {
        Some(e) => parse_date(e)?,
        None => study.study.end_date,
    };
    if start_date >= end_date {
        bail!("start {start_date} must precede end {end_date}");
    }

    let symbols: Vec<String> = if symbols.is_empty() {
        study.symbols().into_iter().map(String::from).collect()
    } else {
        symbols.into_iter().map(|s| s.to_uppercase()).collect()
    };
    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();

    let provider = yahoo_provider()?;
    let cache = ParquetCache::new(cache_dir);
    let summary = download_symbols(
        &provider,
        &cache,
        &sym_refs,
        start_date,
        end_date,
        force,
        &LogProgress,
    );

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }

    println!(
        "Downloaded {} symbol(s), {start_date} to {end_date}.",
        summary.succeeded
    );
    Ok(())
}

fn run_import(symbol: &str, file: &Path, cache_dir: &Path) -> Result<()> {
    let symbol = symbol.to_uppercase();
    let cache = ParquetCache::new(cache_dir);
    let result = import_csv_to_cache(&cache, &symbol, file)
        .with_context(|| format!("failed to import {}", file.display()))?;
    for w in &result.warnings {
        eprintln!("Warning: {w}");
    }
    let (Some(first), Some(last)) = (result.bars.first(), result.bars.last()) else {
        bail!("no bars imported for {symbol}");
    };
    println!(
        "Imported {} bar(s) for {symbol}, {} to {}.",
        result.bars.len(),
        first.date,
        last.date
    );
    Ok(())
}

fn run_analyze(
    config: &StudyConfig,
    offline: bool,
    synthetic: bool,
    cache_dir: &Path,
    output_dir: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let cache = ParquetCache::new(cache_dir);
    let provider = if offline { None } else { Some(yahoo_provider()?) };
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
    let progress = LogProgress;

    let mut load = LoadOptions::from_config(config);
    load.offline = offline;
    load.synthetic = synthetic;

    let (report, loaded) = run_study(
        config,
        &cache,
        provider_ref,
        Some(&progress as &dyn DownloadProgress),
        &load,
    )?;

    print_summary(&report);

    if !no_save {
        let out = output_dir.unwrap_or_else(|| config.output.dir.clone());
        let run_dir = save_artifacts(&report, &loaded.series, &out, config.output.per_symbol_csv)?;
        println!("Artifacts: {}", run_dir.display());
    }

    Ok(())
}

fn print_summary(report: &StudyReport) {
    println!();
    println!("=== {} ({}) ===", report.name, report.analysis_year);
    for group in report.group_names() {
        println!();
        println!("--- {group} ---");
        for row in report.group_rows(group) {
            match (row.analysis, row.failure) {
                (Some(a), _) => {
                    for line in summary_lines(a) {
                        println!("{line}");
                    }
                }
                (None, Some(err)) => println!("{}: FAILED ({err})", row.symbol),
                (None, None) => println!("{}: no data", row.symbol),
            }
        }
    }
    if report.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn run_constituents(
    symbols: Vec<String>,
    sector: Option<String>,
    list_sectors: bool,
    json: bool,
) -> Result<()> {
    let all = fetch_sp500_constituents()?;

    if list_sectors {
        for s in sectors(&all) {
            let count = filter_sector(&all, &s).len();
            println!("{s} ({count})");
        }
        return Ok(());
    }

    let mut selected: Vec<&Constituent> = if symbols.is_empty() {
        all.iter().collect()
    } else {
        let refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
        filter_symbols(&all, &refs)
    };
    if let Some(sector) = sector.as_deref() {
        selected.retain(|c| c.sector.eq_ignore_ascii_case(sector));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    println!(
        "{:<8} {:<36} {:<24} {:<12}",
        "Symbol", "Security", "Sector", "Added"
    );
    println!("{}", "-".repeat(82));
    for c in &selected {
        println!(
            "{:<8} {:<36} {:<24} {:<12}",
            c.symbol,
            truncate(&c.security, 36),
            truncate(&c.sector, 24),
            c.date_added
        );
    }
    println!();
    println!("{} of {} constituents", selected.len(), all.len());
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = ParquetCache::new(cache_dir);
    let symbols = cache.symbols();
    if symbols.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let mut total_size: u64 = 0;
    let mut rows: Vec<(String, String, String, String, u64)> = Vec::new();
    for symbol in &symbols {
        let (range, bars, source) = match cache.get_meta(symbol) {
            Some(meta) => (
                format!("{} to {}", meta.start_date, meta.end_date),
                format!("{} bars", meta.bar_count),
                format!("{:?}", meta.source),
            ),
            None => ("(no meta)".into(), String::new(), String::new()),
        };
        let size = dir_size(&cache_dir.join(format!("symbol={symbol}")));
        total_size += size;
        rows.push((symbol.clone(), range, bars, source, size));
    }

    println!("Cache: {}", cache_dir.display());
    println!("Symbols: {}", symbols.len());
    println!("Total size: {}", format_size(total_size));
    println!();
    println!(
        "{:<8} {:<25} {:<12} {:<13} {:>10}",
        "Symbol", "Date Range", "Bars", "Source", "Size"
    );
    println!("{}", "-".repeat(72));
    for (sym, range, bars, source, size) in &rows {
        println!(
            "{:<8} {:<25} {:<12} {:<13} {:>10}",
            sym,
            range,
            bars,
            source,
            format_size(*size)
        );
    }

    Ok(())
}

fn run_cache_clean(cache_dir: &Path, unused_days: u64, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cutoff =
        chrono::Local::now().naive_local() - chrono::Duration::days(unused_days as i64);
    let cache = ParquetCache::new(cache_dir);

    // Symbols without readable metadata are left alone.
    let to_remove: Vec<String> = cache
        .symbols()
        .into_iter()
        .filter(|s| cache.get_meta(s).is_some_and(|m| m.cached_at < cutoff))
        .collect();

    if to_remove.is_empty() {
        println!("No symbols older than {unused_days} days to remove.");
        return Ok(());
    }

    println!(
        "Found {} symbol(s) not refreshed in {unused_days} days:",
        to_remove.len()
    );
    for sym in &to_remove {
        let size = dir_size(&cache_dir.join(format!("symbol={sym}")));
        println!("  {sym} ({})", format_size(size));
    }

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    for sym in &to_remove {
        cache.remove(sym)?;
        println!("Removed: {sym}");
    }

    println!("Done. Removed {} symbol(s).", to_remove.len());
    Ok(())
}

fn dir_size(path: &Path) -> u64 {
    let mut size = 0u64;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            if let Ok(meta) = entry.metadata() {
                size += meta.len();
            }
        }
    }
    size
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
