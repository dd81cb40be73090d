//! Multi-symbol download: fetch → ingest → cache, with progress reporting.

use super::cache::{CoverageResult, ParquetCache};
use super::ingest;
use super::provider::{DataError, DataProvider, DownloadProgress};
use chrono::NaiveDate;

/// Download and cache a batch of symbols.
///
/// Symbols already covered by the cache are skipped unless `force` is set.
/// Once the provider reports itself unavailable (circuit breaker open), the
/// remaining symbols are failed without being requested.
pub fn download_symbols(
    provider: &dyn DataProvider,
    cache: &ParquetCache,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        if !force && cache.covers_range(symbol, start, end) == CoverageResult::FullyCovered {
            tracing::debug!(symbol, "cache already covers range");
            progress.on_complete(symbol, i, total, &Ok(()));
            succeeded += 1;
            continue;
        }

        let result = download_single(provider, cache, symbol, start, end);
        progress.on_complete(symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => errors.push((symbol.to_string(), e)),
        }

        if !provider.is_available() {
            for sym in &symbols[(i + 1)..] {
                errors.push((sym.to_string(), DataError::CircuitBreakerTripped));
            }
            break;
        }
    }

    let failed = errors.len();
    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

/// Fetch one symbol, clean it and store it.
pub fn download_single(
    provider: &dyn DataProvider,
    cache: &ParquetCache,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), DataError> {
    let fetched = provider.fetch(symbol, start, end)?;
    let ingested = ingest::ingest(fetched.bars)?;
    cache.write(symbol, &ingested.bars, fetched.source)?;
    Ok(())
}

#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
