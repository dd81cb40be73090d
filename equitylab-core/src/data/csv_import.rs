//! CSV import: offline fallback for when the network provider is unavailable.
//!
//! Accepts `date,open,high,low,close,volume[,adj_close]` with a header row.
//! Header names are matched case-insensitively, so exports that use
//! `Date,Open,High,Low,Close,Volume` load as well. Imported bars go through
//! the same ingest as downloads and land in the cache tagged `CsvImport`.

use super::cache::ParquetCache;
use super::ingest::{ingest, IngestResult};
use super::provider::{DataError, DataSource, RawBar};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;

/// Import a CSV file for `symbol`, clean it and merge it into the cache.
pub fn import_csv_to_cache(
    cache: &ParquetCache,
    symbol: &str,
    path: &Path,
) -> Result<IngestResult, DataError> {
    let ingested = ingest(import_csv(path)?)?;
    cache.write(symbol, &ingested.bars, DataSource::CsvImport)?;
    tracing::info!(
        symbol,
        bars = ingested.bars.len(),
        path = %path.display(),
        "imported csv into cache"
    );
    Ok(ingested)
}

pub fn import_csv(path: &Path) -> Result<Vec<RawBar>, DataError> {
    let file = std::fs::File::open(path)
        .map_err(|e| DataError::CsvError(format!("open {}: {e}", path.display())))?;
    import_csv_reader(file)
}

pub fn import_csv_reader<R: Read>(reader: R) -> Result<Vec<RawBar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DataError::CsvError(format!("header: {e}")))?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name) || h.replace(' ', "_").eq_ignore_ascii_case(name))
    };
    let required = |name: &str| {
        find(name).ok_or_else(|| DataError::CsvError(format!("missing column '{name}'")))
    };

    let date_idx = required("date")?;
    let open_idx = required("open")?;
    let high_idx = required("high")?;
    let low_idx = required("low")?;
    let close_idx = required("close")?;
    let volume_idx = required("volume")?;
    let adj_idx = find("adj_close");

    let mut bars = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| DataError::CsvError(format!("row {row}: {e}")))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let number = |idx: usize| -> Result<f64, DataError> {
            let raw = field(idx);
            if raw.is_empty() {
                return Ok(f64::NAN);
            }
            raw.parse::<f64>()
                .map_err(|e| DataError::CsvError(format!("row {row}: bad number '{raw}': {e}")))
        };

        // Accept plain dates as well as timestamps with a trailing time part.
        let date_raw = field(date_idx);
        let date_part = date_raw.get(..10).unwrap_or(date_raw);
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| DataError::CsvError(format!("row {row}: bad date '{date_raw}': {e}")))?;

        let close = number(close_idx)?;
        let volume = number(volume_idx)?;
        bars.push(RawBar {
            date,
            open: number(open_idx)?,
            high: number(high_idx)?,
            low: number(low_idx)?,
            close,
            volume: if volume.is_finite() && volume > 0.0 {
                volume.round() as u64
            } else {
                0
            },
            adj_close: match adj_idx {
                Some(idx) => number(idx)?,
                None => close,
            },
        });
    }

    if bars.is_empty() {
        return Err(DataError::CsvError("no rows".into()));
    }
    Ok(bars)
}
