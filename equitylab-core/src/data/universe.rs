//! Universe — named ticker groups compared within one study.
//!
//! Stored as TOML:
//!
//! ```toml
//! [groups]
//! Benchmark = ["SPY"]
//! "Big Tech" = ["GOOG", "AAPL", "AMZN"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub const BENCHMARK_GROUP: &str = "Benchmark";

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A single ungrouped list of symbols.
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(
            "Symbols".to_string(),
            symbols.iter().map(|s| s.as_ref().to_uppercase()).collect(),
        );
        Self { groups }
    }

    /// Benchmark, big tech and defensive sector ETFs.
    pub fn default_study() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(BENCHMARK_GROUP.to_string(), vec!["SPY".to_string()]);
        groups.insert(
            "Big Tech".to_string(),
            ["GOOG", "AAPL", "AMZN"].into_iter().map(String::from).collect(),
        );
        groups.insert(
            "Defensive".to_string(),
            ["XLP", "XLU", "XLV"].into_iter().map(String::from).collect(),
        );
        Self { groups }
    }

    /// Every symbol once, in group order then listing order.
    pub fn all_symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for symbols in self.groups.values() {
            for s in symbols {
                if !out.contains(&s.as_str()) {
                    out.push(s);
                }
            }
        }
        out
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(|v| v.as_slice())
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(|s| s.as_str()).collect()
    }

    /// The benchmark symbol, if a benchmark group is defined.
    pub fn benchmark(&self) -> Option<&str> {
        self.group(BENCHMARK_GROUP)
            .and_then(|g| g.first())
            .map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|g| g.is_empty())
    }
}
