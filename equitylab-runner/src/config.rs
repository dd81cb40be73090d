//! Serializable study configuration.
//!
//! A study file names the date range, the calendar year to analyse, the price
//! column and the ticker groups to compare:
//!
//! ```toml
//! [study]
//! name = "big-tech-vs-defensive"
//! start_date = "2014-01-01"
//! end_date = "2025-01-01"
//! analysis_year = 2022
//!
//! [universe.groups]
//! Benchmark = ["SPY"]
//! ```

use chrono::{Datelike, NaiveDate};
use equitylab_core::data::Universe;
use equitylab_core::domain::PriceField;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    pub study: StudySection,
    #[serde(default = "Universe::default_study")]
    pub universe: Universe,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySection {
    pub name: String,
    /// First date loaded (inclusive).
    pub start_date: NaiveDate,
    /// Last date loaded (exclusive).
    pub end_date: NaiveDate,
    pub analysis_year: i32,
    #[serde(default)]
    pub price_field: PriceField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub per_symbol_csv: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_true() -> bool {
    true
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            per_symbol_csv: true,
        }
    }
}

impl StudyConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// SPY against big tech and the defensive sector ETFs, 2014 through
    /// 2024, with 2022 as the analysis year.
    pub fn default_study() -> Self {
        Self {
            study: StudySection {
                name: "big-tech-vs-defensive".into(),
                start_date: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
                end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
                analysis_year: 2022,
                price_field: PriceField::AdjClose,
            },
            universe: Universe::default_study(),
            output: OutputSection::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.study;
        if s.name.trim().is_empty() {
            return Err(ConfigError::Invalid("study name is empty".into()));
        }
        if s.start_date >= s.end_date {
            return Err(ConfigError::Invalid(format!(
                "start_date {} must precede end_date {}",
                s.start_date, s.end_date
            )));
        }
        if self.universe.is_empty() {
            return Err(ConfigError::Invalid("universe has no symbols".into()));
        }
        // end_date is exclusive, so a Jan 1 end does not reach into its year.
        let last_loaded = s.end_date.pred_opt().unwrap_or(s.end_date);
        if s.analysis_year < s.start_date.year() || s.analysis_year > last_loaded.year() {
            return Err(ConfigError::Invalid(format!(
                "analysis_year {} is outside {}..{}",
                s.analysis_year, s.start_date, s.end_date
            )));
        }
        Ok(())
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.universe.all_symbols()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
