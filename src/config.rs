//! Dashboard configuration
//!
//! Values come from command-line flags first, then the environment
//! (optionally populated from a `.env` file by the binary), then defaults.

use crate::distribution::DEFAULT_HISTOGRAM_BINS;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DATA_PATH: &str = "COMPLAINTS_DATA";
pub const ENV_HISTOGRAM_BINS: &str = "DASHBOARD_BINS";
pub const ENV_TABLE_ROWS: &str = "DASHBOARD_TABLE_ROWS";

pub const DEFAULT_TABLE_ROWS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// CSV export to load; the session stays empty when unset.
    pub data_path: Option<PathBuf>,
    pub histogram_bins: usize,
    /// Rows printed per ranking table in text output.
    pub table_rows: usize,
    pub format: OutputFormat,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            table_rows: DEFAULT_TABLE_ROWS,
            format: OutputFormat::Text,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_DATA_PATH).filter(|p| !p.trim().is_empty()) {
            config.data_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_HISTOGRAM_BINS) {
            config.histogram_bins = parse_positive(ENV_HISTOGRAM_BINS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TABLE_ROWS) {
            config.table_rows = parse_positive(ENV_TABLE_ROWS, &raw)?;
        }
        Ok(config)
    }

    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.data_path = path;
        }
        self
    }

    pub fn with_histogram_bins(mut self, bins: Option<usize>) -> Self {
        if let Some(bins) = bins.filter(|b| *b > 0) {
            self.histogram_bins = bins;
        }
        self
    }

    pub fn with_table_rows(mut self, rows: Option<usize>) -> Self {
        if let Some(rows) = rows.filter(|r| *r > 0) {
            self.table_rows = rows;
        }
        self
    }

    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(DashboardError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_environment() {
        let config = DashboardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.histogram_bins, 50);
    }

    #[test]
    fn test_environment_then_flags() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_PATH, "complaints.csv"),
            (ENV_HISTOGRAM_BINS, "25"),
            (ENV_TABLE_ROWS, "5"),
        ]
        .into_iter()
        .collect();

        let config = DashboardConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
            .unwrap()
            .with_histogram_bins(Some(10))
            .with_table_rows(None);

        assert_eq!(config.data_path, Some(PathBuf::from("complaints.csv")));
        assert_eq!(config.histogram_bins, 10);
        assert_eq!(config.table_rows, 5);
    }

    #[test]
    fn test_rejects_zero_bins() {
        let err = DashboardConfig::from_lookup(|key| {
            (key == ENV_HISTOGRAM_BINS).then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
