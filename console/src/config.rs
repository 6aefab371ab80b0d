//! Configuration management for the console.

use gridline_engine::{Column, FilterMode, GridConfig};
use std::env;
use std::path::PathBuf;

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to a JSON array of records
    pub data_path: PathBuf,
    /// Declared columns, if given. Otherwise derived from the first record.
    pub columns: Option<Vec<Column>>,
    /// Grid behavior
    pub grid: GridConfig,
    /// Where `export` writes when no path is given
    pub export_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_path = lookup("GRIDLINE_DATA")
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingDataPath)?;

        let columns = lookup("GRIDLINE_COLUMNS")
            .map(|json| Column::many_from_json(&json))
            .transpose()
            .map_err(ConfigError::InvalidColumns)?;

        let grid = match lookup("GRIDLINE_GRID_CONFIG") {
            Some(json) => GridConfig::from_json(&json).map_err(ConfigError::InvalidGridConfig)?,
            None => GridConfig::default()
                .with_filter_mode(FilterMode::Both)
                .with_row_selection(),
        };

        let export_path = lookup("GRIDLINE_EXPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("export.csv"));

        Ok(Self {
            data_path,
            columns,
            grid,
            export_path,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GRIDLINE_DATA environment variable is required")]
    MissingDataPath,

    #[error("Invalid GRIDLINE_COLUMNS value: {0}")]
    InvalidColumns(gridline_engine::Error),

    #[error("Invalid GRIDLINE_GRID_CONFIG value: {0}")]
    InvalidGridConfig(gridline_engine::Error),
}
