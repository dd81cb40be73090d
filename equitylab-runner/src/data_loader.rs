//! Series loading and data resolution for a study.
//!
//! Given a list of symbols, loads bars from the Parquet cache and projects
//! them onto price series. Fallback policy per symbol:
//! 1. Cache, when it covers `[start, end)`. Offline, whatever it holds.
//! 2. Download, ingest and cache when a provider is available
//! 3. A partially covering cache if the download failed
//! 4. Synthetic random walk when `synthetic` is set
//! 5. Otherwise the symbol is recorded in `failures`
//!
//! The load only fails as a whole when no symbol could be loaded.
//! Synthetic data is a developer-only debug mode; reports built on it are
//! flagged through `has_synthetic`.

use chrono::{Datelike, NaiveDate};
use equitylab_core::data::{
    cache::{CoverageResult, ParquetCache},
    ingest::{ingest, price_series_from_raw},
    provider::{DataError, DataProvider, DataSource, DownloadProgress, RawBar},
};
use equitylab_core::domain::{PriceField, PriceSeries};
use equitylab_core::error::AnalyticsError;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::StudyConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "no cached data for '{symbol}' and no network access (use --synthetic for synthetic data)"
    )]
    NoCachedDataOffline { symbol: String },

    #[error("no cached data for '{symbol}' and download failed: {reason}")]
    DownloadFailed { symbol: String, reason: String },

    #[error("invalid price data for '{symbol}': {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: AnalyticsError,
    },

    #[error("no symbols to load")]
    NoSymbols,

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// First date loaded (inclusive).
    pub start: NaiveDate,
    /// Last date loaded (exclusive).
    pub end: NaiveDate,
    pub price_field: PriceField,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
    /// Re-download even if cached.
    pub force: bool,
}

#[derive(Debug)]
pub struct LoadedData {
    /// Price series per symbol, keyed and ordered by symbol.
    pub series: BTreeMap<String, PriceSeries>,
    /// The cleaned provider bars the series were projected from.
    pub raw: BTreeMap<String, Vec<RawBar>>,
    pub sources: BTreeMap<String, DataSource>,
    /// Symbols that could not be loaded, with the reason.
    pub failures: BTreeMap<String, String>,
    /// BLAKE3 over every loaded bar, in symbol order.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

impl LoadOptions {
    /// Online, no synthetic fallback, cache first.
    pub fn from_config(config: &StudyConfig) -> Self {
        Self {
            start: config.study.start_date,
            end: config.study.end_date,
            price_field: config.study.price_field,
            offline: false,
            synthetic: false,
            force: false,
        }
    }
}

/// Load price series for a set of symbols, with fallback to download or synthetic.
///
/// A symbol that cannot be loaded is recorded in `LoadedData::failures` and
/// the rest of the batch continues. Returns the first symbol's error only
/// when nothing loaded at all.
pub fn load_series(
    symbols: &[&str],
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    progress: Option<&dyn DownloadProgress>,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    if symbols.is_empty() {
        return Err(LoadError::NoSymbols);
    }

    let mut raw: BTreeMap<String, Vec<RawBar>> = BTreeMap::new();
    let mut sources: BTreeMap<String, DataSource> = BTreeMap::new();
    let mut failures: BTreeMap<String, String> = BTreeMap::new();
    let mut first_error: Option<LoadError> = None;
    let mut has_synthetic = false;
    let total = symbols.len();

    let network = if opts.offline {
        None
    } else {
        provider.filter(|p| p.is_available())
    };

    for (i, symbol) in symbols.iter().enumerate() {
        if raw.contains_key(*symbol) || failures.contains_key(*symbol) {
            continue;
        }

        // Step 1: cache
        let cached = if opts.force {
            None
        } else {
            cache.load_range(symbol, opts.start, opts.end).ok()
        };
        if let Some(bars) = &cached {
            let coverage = cache.covers_range(symbol, opts.start, opts.end);
            if network.is_none() || coverage == CoverageResult::FullyCovered {
                if coverage != CoverageResult::FullyCovered {
                    tracing::warn!(symbol, ?coverage, "cache only partially covers the range");
                }
                tracing::debug!(symbol, bars = bars.len(), "loaded from cache");
                if let Some(p) = progress {
                    p.on_start(symbol, i, total);
                    p.on_complete(symbol, i, total, &Ok(()));
                }
                raw.insert(symbol.to_string(), bars.clone());
                sources.insert(symbol.to_string(), DataSource::Cache);
                continue;
            }
            tracing::debug!(symbol, ?coverage, "cache incomplete, downloading");
        }

        // Step 2: download
        let mut reason: Option<String> = None;
        if let Some(prov) = network {
            if let Some(p) = progress {
                p.on_start(symbol, i, total);
            }
            match fetch_and_cache(prov, cache, symbol, opts) {
                Ok((bars, source)) => {
                    if let Some(p) = progress {
                        p.on_complete(symbol, i, total, &Ok(()));
                    }
                    raw.insert(symbol.to_string(), bars);
                    sources.insert(symbol.to_string(), source);
                    continue;
                }
                Err(e) => {
                    reason = Some(e.to_string());
                    if let Some(p) = progress {
                        p.on_complete(symbol, i, total, &Err(e));
                    }
                }
            }
        }

        // Step 3: partial cache beats nothing
        if let Some(bars) = cached {
            tracing::warn!(symbol, "download failed, using partially cached bars");
            raw.insert(symbol.to_string(), bars);
            sources.insert(symbol.to_string(), DataSource::Cache);
            continue;
        }

        // Step 4: synthetic
        if opts.synthetic {
            tracing::warn!(
                symbol,
                "generating synthetic data; results will be tagged as synthetic"
            );
            let bars = generate_synthetic_bars(symbol, opts.start, opts.end);
            raw.insert(symbol.to_string(), bars);
            sources.insert(symbol.to_string(), DataSource::Synthetic);
            has_synthetic = true;
            continue;
        }

        // Step 5: record the failure
        let err = if opts.offline {
            LoadError::NoCachedDataOffline {
                symbol: symbol.to_string(),
            }
        } else {
            LoadError::DownloadFailed {
                symbol: symbol.to_string(),
                reason: reason.unwrap_or_else(|| "no data provider available".into()),
            }
        };
        tracing::warn!(symbol, error = %err, "symbol not loaded");
        failures.insert(symbol.to_string(), err.to_string());
        if first_error.is_none() {
            first_error = Some(err);
        }
    }

    let mut series = BTreeMap::new();
    raw.retain(|symbol, bars| match price_series_from_raw(bars, opts.price_field) {
        Ok(s) => {
            series.insert(symbol.clone(), s);
            true
        }
        Err(source) => {
            let err = LoadError::InvalidSeries {
                symbol: symbol.clone(),
                source,
            };
            tracing::warn!(symbol = %symbol, error = %err, "symbol not loaded");
            failures.insert(symbol.clone(), err.to_string());
            if first_error.is_none() {
                first_error = Some(err);
            }
            false
        }
    });
    sources.retain(|symbol, _| raw.contains_key(symbol));

    if let Some(p) = progress {
        p.on_batch_complete(series.len(), failures.len(), total);
    }

    if series.is_empty() {
        return Err(first_error.unwrap_or(LoadError::NoSymbols));
    }

    let dataset_hash = compute_dataset_hash(&raw);

    Ok(LoadedData {
        series,
        raw,
        sources,
        failures,
        dataset_hash,
        has_synthetic,
    })
}

fn fetch_and_cache(
    provider: &dyn DataProvider,
    cache: &ParquetCache,
    symbol: &str,
    opts: &LoadOptions,
) -> Result<(Vec<RawBar>, DataSource), DataError> {
    let fetched = provider.fetch(symbol, opts.start, opts.end)?;
    let ingested = ingest(fetched.bars)?;
    cache.write(symbol, &ingested.bars, fetched.source)?;
    let bars: Vec<RawBar> = ingested
        .bars
        .into_iter()
        .filter(|b| b.date >= opts.start && b.date < opts.end)
        .collect();
    if bars.is_empty() {
        return Err(DataError::ValidationError(format!(
            "{symbol}: no bars between {} and {}",
            opts.start, opts.end
        )));
    }
    Ok((bars, fetched.source))
}

/// Deterministic BLAKE3 hash over all bar data.
///
/// Covers dates and every OHLCV value in sorted symbol order.
fn compute_dataset_hash(raw: &BTreeMap<String, Vec<RawBar>>) -> String {
    let mut hasher = blake3::Hasher::new();

    for (symbol, bars) in raw {
        hasher.update(symbol.as_bytes());
        for bar in bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
            hasher.update(&bar.adj_close.to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}

/// Random walk from 100.0 on weekdays in `[start, end)`, seeded by the symbol.
fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current < end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(RawBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
            adj_close: close,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
