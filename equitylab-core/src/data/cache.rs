//! Parquet price cache with Hive-style partitioning.
//!
//! Layout: `{cache_dir}/symbol={SYMBOL}/{year}.parquet` plus a `meta.json`
//! sidecar per symbol.
//!
//! - Writes merge with what is already cached (new bars win on equal dates)
//! - Writes are atomic (write to .tmp, rename into place)
//! - Corrupt partitions are quarantined (`{file}.quarantined`) on load

use super::provider::{DataError, DataSource, RawBar};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub source: DataSource,
    pub cached_at: chrono::NaiveDateTime,
}

pub struct ParquetCache {
    cache_dir: PathBuf,
}

impl ParquetCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.cache_dir.join(format!("symbol={symbol}"))
    }

    fn year_path(&self, symbol: &str, year: i32) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{year}.parquet"))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("meta.json")
    }

    /// Write bars for a symbol, merging with any bars already cached.
    pub fn write(&self, symbol: &str, bars: &[RawBar], source: DataSource) -> Result<(), DataError> {
        if bars.is_empty() {
            return Err(DataError::CacheError("no bars to cache".into()));
        }

        let sym_dir = self.symbol_dir(symbol);
        fs::create_dir_all(&sym_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let mut merged: BTreeMap<NaiveDate, RawBar> = BTreeMap::new();
        if let Ok(existing) = self.load(symbol) {
            merged.extend(existing.into_iter().map(|b| (b.date, b)));
        }
        merged.extend(bars.iter().map(|b| (b.date, b.clone())));
        let all: Vec<RawBar> = merged.into_values().collect();

        let mut by_year: BTreeMap<i32, Vec<&RawBar>> = BTreeMap::new();
        for bar in &all {
            by_year.entry(bar.date.year()).or_default().push(bar);
        }

        for (year, year_bars) in &by_year {
            let mut df = bars_to_dataframe(year_bars)?;
            let path = self.year_path(symbol, *year);
            let tmp_path = path.with_extension("parquet.tmp");

            write_parquet(&mut df, &tmp_path)?;

            fs::rename(&tmp_path, &path).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                DataError::CacheError(format!("atomic rename failed: {e}"))
            })?;
        }

        // `all` is non-empty: it contains at least `bars`.
        let (start_date, end_date) = match (all.first(), all.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(DataError::CacheError("no bars to cache".into())),
        };
        let hash_input = serde_json::to_vec(&all)
            .map_err(|e| DataError::CacheError(format!("hash serialization: {e}")))?;
        let meta = CacheMeta {
            symbol: symbol.to_string(),
            start_date,
            end_date,
            bar_count: all.len(),
            data_hash: blake3::hash(&hash_input).to_hex().to_string(),
            source,
            cached_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(symbol), meta_json)
            .map_err(|e| DataError::CacheError(format!("meta write: {e}")))?;

        tracing::debug!(symbol, bars = all.len(), "cache written");
        Ok(())
    }

    /// Load all cached bars for a symbol, sorted by date ascending.
    pub fn load(&self, symbol: &str) -> Result<Vec<RawBar>, DataError> {
        let sym_dir = self.symbol_dir(symbol);
        if !sym_dir.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        let mut all_bars = Vec::new();

        let entries =
            fs::read_dir(&sym_dir).map_err(|e| DataError::CacheError(format!("read dir: {e}")))?;

        for entry in entries {
            let entry = entry.map_err(|e| DataError::CacheError(format!("dir entry: {e}")))?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }

            match load_and_validate_parquet(&path) {
                Ok(bars) => all_bars.extend(bars),
                Err(e) => {
                    let quarantine = path.with_extension("parquet.quarantined");
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "quarantining corrupt cache file"
                    );
                    let _ = fs::rename(&path, &quarantine);
                }
            }
        }

        if all_bars.is_empty() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        all_bars.sort_by_key(|b| b.date);
        Ok(all_bars)
    }

    /// Cached bars for a symbol with `start <= date < end`.
    pub fn load_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let bars: Vec<RawBar> = self
            .load(symbol)?
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();
        if bars.is_empty() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    pub fn get_meta(&self, symbol: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Symbols present in the cache directory, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };
        let mut symbols: Vec<String> = entries
            .flatten()
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|n| n.strip_prefix("symbol="))
                    .map(String::from)
            })
            .collect();
        symbols.sort();
        symbols
    }

    pub fn status(&self, symbols: &[&str]) -> Vec<CacheStatus> {
        symbols
            .iter()
            .map(|sym| {
                let meta = self.get_meta(sym);
                CacheStatus {
                    symbol: sym.to_string(),
                    cached: meta.is_some(),
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    bar_count: meta.as_ref().map(|m| m.bar_count),
                }
            })
            .collect()
    }

    /// Whether the cache holds `[start, end)` for a symbol.
    ///
    /// Markets are closed on the boundary days often enough that the check
    /// allows the cached range to start up to a week after `start` and to end
    /// up to a week before `end`.
    pub fn covers_range(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> CoverageResult {
        let slack = chrono::Duration::days(7);
        match self.get_meta(symbol) {
            None => CoverageResult::NotCached,
            Some(meta) => {
                if meta.start_date <= start + slack && meta.end_date + slack >= end {
                    CoverageResult::FullyCovered
                } else {
                    CoverageResult::PartiallyCovered {
                        cached_start: meta.start_date,
                        cached_end: meta.end_date,
                    }
                }
            }
        }
    }

    /// Delete a symbol's partitions and metadata.
    pub fn remove(&self, symbol: &str) -> Result<(), DataError> {
        let dir = self.symbol_dir(symbol);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|e| DataError::CacheError(format!("remove {symbol}: {e}")))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub symbol: String,
    pub cached: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoverageResult {
    NotCached,
    FullyCovered,
    PartiallyCovered {
        cached_start: NaiveDate,
        cached_end: NaiveDate,
    },
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn bars_to_dataframe(bars: &[&RawBar]) -> Result<DataFrame, DataError> {
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| b.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();
    let adj_closes: Vec<f64> = bars.iter().map(|b| b.adj_close).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ParquetError(format!("date cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
        Column::new("adj_close".into(), adj_closes),
    ])
    .map_err(|e| DataError::ParquetError(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file =
        fs::File::create(path).map_err(|e| DataError::ParquetError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<Vec<RawBar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::ParquetError(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::ParquetError(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::ValidationError("empty parquet file".into()));
    }

    for col_name in ["date", "open", "high", "low", "close", "volume", "adj_close"] {
        if df.column(col_name).is_err() {
            return Err(DataError::ValidationError(format!(
                "missing column '{col_name}'"
            )));
        }
    }

    dataframe_to_bars(&df)
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<RawBar>, DataError> {
    let col = |name: &str| {
        df.column(name)
            .map_err(|e| DataError::ParquetError(format!("column read: {e}")))
    };
    let f64_col = |name: &str| -> Result<Vec<f64>, DataError> {
        Ok(col(name)?
            .f64()
            .map_err(|e| DataError::ParquetError(format!("{name} column type: {e}")))?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    };

    let dates = col("date")?
        .date()
        .map_err(|e| DataError::ParquetError(format!("date column type: {e}")))?;
    let volumes = col("volume")?
        .u64()
        .map_err(|e| DataError::ParquetError(format!("volume column type: {e}")))?;
    let opens = f64_col("open")?;
    let highs = f64_col("high")?;
    let lows = f64_col("low")?;
    let closes = f64_col("close")?;
    let adj_closes = f64_col("adj_close")?;

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let days = dates
            .get(i)
            .ok_or_else(|| DataError::ParquetError(format!("null date at row {i}")))?;
        let date = NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
            .ok_or_else(|| DataError::ParquetError(format!("date out of range at row {i}")))?;

        bars.push(RawBar {
            date,
            open: opens[i],
            high: highs[i],
            low: lows[i],
            close: closes[i],
            volume: volumes.get(i).unwrap_or(0),
            adj_close: adj_closes[i],
        });
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_cache_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("equitylab_cache_test_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn bar(y: i32, m: u32, d: u32, close: f64) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
            adj_close: close * 0.98,
        }
    }

    #[test]
    fn epoch_offset_is_correct() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(epoch.num_days_from_ce(), UNIX_EPOCH_DAYS_FROM_CE);
    }

    #[test]
    fn write_and_load_roundtrip_across_years() {
        let dir = temp_cache_dir();
        let cache = ParquetCache::new(&dir);

        let bars = vec![bar(2021, 12, 31, 100.0), bar(2022, 1, 3, 101.0)];
        cache.write("SPY", &bars, DataSource::YahooFinance).unwrap();
        let loaded = cache.load("SPY").unwrap();

        assert_eq!(loaded, bars);
        assert!(dir.join("symbol=SPY/2021.parquet").exists());
        assert!(dir.join("symbol=SPY/2022.parquet").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_merges_with_existing_bars() {
        let dir = temp_cache_dir();
        let cache = ParquetCache::new(&dir);

        cache
            .write("AAPL", &[bar(2022, 1, 3, 10.0), bar(2022, 1, 4, 11.0)], DataSource::YahooFinance)
            .unwrap();
        cache
            .write("AAPL", &[bar(2022, 1, 4, 12.0), bar(2022, 1, 5, 13.0)], DataSource::YahooFinance)
            .unwrap();

        let closes: Vec<f64> = cache.load("AAPL").unwrap().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![10.0, 12.0, 13.0]);
        assert_eq!(cache.get_meta("AAPL").unwrap().bar_count, 3);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_nonexistent_is_no_cached_data() {
        let dir = temp_cache_dir();
        let cache = ParquetCache::new(&dir);
        assert!(matches!(
            cache.load("NONE"),
            Err(DataError::NoCachedData { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_range_is_end_exclusive() {
        let dir = temp_cache_dir();
        let cache = ParquetCache::new(&dir);
        cache
            .write(
                "XLP",
                &[bar(2022, 1, 3, 1.0), bar(2022, 1, 4, 2.0), bar(2022, 1, 5, 3.0)],
                DataSource::YahooFinance,
            )
            .unwrap();
        let bars = cache
            .load_range(
                "XLP",
                NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(),
                NaiveDate::from_ymd_opt(2022, 1, 5).unwrap(),
            )
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 2.0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_partition_is_quarantined() {
        let dir = temp_cache_dir();
        let cache = ParquetCache::new(&dir);
        cache
            .write("XLV", &[bar(2022, 1, 3, 1.0)], DataSource::YahooFinance)
            .unwrap();
        fs::write(dir.join("symbol=XLV/2021.parquet"), b"not parquet").unwrap();

        let loaded = cache.load("XLV").unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(dir.join("symbol=XLV/2021.parquet.quarantined").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn meta_status_and_symbols() {
        let dir = temp_cache_dir();
        let cache = ParquetCache::new(&dir);
        cache
            .write("SPY", &[bar(2022, 1, 3, 1.0), bar(2022, 1, 4, 2.0)], DataSource::Synthetic)
            .unwrap();

        let meta = cache.get_meta("SPY").unwrap();
        assert_eq!(meta.bar_count, 2);
        assert_eq!(meta.source, DataSource::Synthetic);

        let statuses = cache.status(&["SPY", "QQQ"]);
        assert!(statuses[0].cached);
        assert!(!statuses[1].cached);
        assert_eq!(cache.symbols(), vec!["SPY".to_string()]);

        cache.remove("SPY").unwrap();
        assert!(cache.symbols().is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn coverage_allows_boundary_holidays() {
        let dir = temp_cache_dir();
        let cache = ParquetCache::new(&dir);
        cache
            .write("SPY", &[bar(2014, 1, 2, 1.0), bar(2024, 12, 31, 2.0)], DataSource::YahooFinance)
            .unwrap();

        assert_eq!(
            cache.covers_range(
                "SPY",
                NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            ),
            CoverageResult::FullyCovered
        );
        assert!(matches!(
            cache.covers_range(
                "SPY",
                NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            ),
            CoverageResult::PartiallyCovered { .. }
        ));
        assert_eq!(
            cache.covers_range("QQQ", NaiveDate::default(), NaiveDate::default()),
            CoverageResult::NotCached
        );

        let _ = fs::remove_dir_all(&dir);
    }
}
