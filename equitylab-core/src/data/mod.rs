//! Data acquisition, ingest and caching.

pub mod cache;
pub mod circuit_breaker;
pub mod constituents;
pub mod csv_import;
pub mod download;
pub mod ingest;
pub mod provider;
pub mod universe;
pub mod yahoo;

pub use cache::{CacheMeta, CacheStatus, CoverageResult, ParquetCache};
pub use circuit_breaker::CircuitBreaker;
pub use constituents::{fetch_sp500_constituents, parse_constituents, Constituent};
pub use csv_import::{import_csv, import_csv_to_cache};
pub use download::{download_symbols, DownloadSummary};
pub use ingest::{ingest, price_series_from_raw, IngestResult};
pub use provider::{DataError, DataProvider, DataSource, DownloadProgress, FetchResult, LogProgress, RawBar};
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooProvider;
