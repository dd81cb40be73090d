//! Ingest: raw provider bars → clean, date-ordered bars → `PriceSeries`.
//!
//! Sorting and de-duplication happen once here so that every transform can
//! assume a valid series. Non-positive closes are kept but flagged: the
//! transforms report them precisely instead of the ingest layer dropping them.

use super::provider::{DataError, RawBar};
use crate::domain::{PriceBar, PriceField, PriceSeries};
use crate::error::AnalyticsError;

#[derive(Debug, Clone)]
pub struct IngestResult {
    pub bars: Vec<RawBar>,
    pub dropped_duplicates: usize,
    pub dropped_void: usize,
    pub warnings: Vec<String>,
}

/// Sort by date, drop void bars, then drop repeated dates (keeping the first).
pub fn ingest(mut bars: Vec<RawBar>) -> Result<IngestResult, DataError> {
    if bars.is_empty() {
        return Err(DataError::ValidationError("no bars to ingest".into()));
    }

    bars.sort_by_key(|b| b.date);

    // Void rows go first so a duplicate date keeps its valid bar.
    let before = bars.len();
    bars.retain(|b| !b.is_void());
    let dropped_void = before - bars.len();

    let before = bars.len();
    bars.dedup_by_key(|b| b.date);
    let dropped_duplicates = before - bars.len();

    if bars.is_empty() {
        return Err(DataError::ValidationError(
            "every bar was void after ingest".into(),
        ));
    }

    let mut warnings = Vec::new();
    if dropped_duplicates > 0 {
        warnings.push(format!("dropped {dropped_duplicates} duplicate-date bar(s)"));
    }
    if dropped_void > 0 {
        warnings.push(format!("dropped {dropped_void} bar(s) with no close"));
    }
    for bar in bars.iter().filter(|b| b.close <= 0.0 || b.adj_close <= 0.0) {
        warnings.push(format!("non-positive price on {}", bar.date));
    }
    for w in &warnings {
        tracing::warn!("{w}");
    }

    Ok(IngestResult {
        bars,
        dropped_duplicates,
        dropped_void,
        warnings,
    })
}

/// Project raw bars onto the chosen price column.
///
/// Expects ingested bars; out-of-order input is rejected by `PriceSeries::new`.
pub fn price_series_from_raw(
    bars: &[RawBar],
    field: PriceField,
) -> Result<PriceSeries, AnalyticsError> {
    PriceSeries::new(
        bars.iter()
            .map(|b| {
                let close = match field {
                    PriceField::Close => b.close,
                    PriceField::AdjClose if b.adj_close.is_nan() => b.close,
                    PriceField::AdjClose => b.adj_close,
                };
                PriceBar::new(b.date, close)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(day: u32, close: f64, adj: f64) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2022, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
            adj_close: adj,
        }
    }

    #[test]
    fn sorts_and_dedupes() {
        let result = ingest(vec![raw(4, 2.0, 2.0), raw(3, 1.0, 1.0), raw(3, 9.0, 9.0)]).unwrap();
        assert_eq!(result.bars.len(), 2);
        assert_eq!(result.dropped_duplicates, 1);
        assert_eq!(result.bars[0].close, 1.0);
        assert_eq!(result.bars[1].close, 2.0);
    }

    #[test]
    fn drops_void_bars() {
        let result = ingest(vec![raw(3, 1.0, 1.0), raw(4, f64::NAN, f64::NAN)]).unwrap();
        assert_eq!(result.bars.len(), 1);
        assert_eq!(result.dropped_void, 1);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn void_bar_does_not_shadow_valid_bar_on_same_date() {
        let result = ingest(vec![raw(3, f64::NAN, f64::NAN), raw(3, 1.0, 1.0)]).unwrap();
        assert_eq!(result.bars.len(), 1);
        assert_eq!(result.bars[0].close, 1.0);
        assert_eq!(result.dropped_void, 1);
        assert_eq!(result.dropped_duplicates, 0);
    }

    #[test]
    fn flags_but_keeps_zero_close() {
        let result = ingest(vec![raw(3, 1.0, 1.0), raw(4, 0.0, 0.0)]).unwrap();
        assert_eq!(result.bars.len(), 2);
        assert!(result.warnings.iter().any(|w| w.contains("2022-01-04")));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(ingest(vec![]).is_err());
        assert!(ingest(vec![raw(3, f64::NAN, f64::NAN)]).is_err());
    }

    #[test]
    fn selects_price_field() {
        let bars = vec![raw(3, 10.0, 9.5), raw(4, 11.0, f64::NAN)];
        let adj = price_series_from_raw(&bars, PriceField::AdjClose).unwrap();
        assert_eq!(adj.closes(), vec![9.5, 11.0]);
        let close = price_series_from_raw(&bars, PriceField::Close).unwrap();
        assert_eq!(close.closes(), vec![10.0, 11.0]);
    }
}
