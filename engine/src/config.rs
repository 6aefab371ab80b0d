//! Static per-grid configuration.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};

/// Which filter inputs a grid offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    None,
    Global,
    Column,
    Both,
}

impl FilterMode {
    pub fn column_filters(self) -> bool {
        matches!(self, FilterMode::Column | FilterMode::Both)
    }

    pub fn global_filter(self) -> bool {
        matches!(self, FilterMode::Global | FilterMode::Both)
    }
}

/// Configuration fixed at grid construction.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Which filters apply
    pub filter_mode: FilterMode,
    /// Placeholder for the global filter input
    pub filter_placeholder: String,
    /// Whether header clicks sort
    pub enable_sorting: bool,
    /// Whether rows are split into pages
    pub enable_pagination: bool,
    /// Page size at construction
    pub initial_page_size: usize,
    /// Page sizes offered to the user
    pub page_size_options: Vec<usize>,
    /// Field holding each record's identifier
    pub row_key: String,
    /// Whether rows can be selected
    pub enable_row_selection: bool,
    /// Fewest columns the host may leave visible
    pub min_visible_columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            filter_mode: FilterMode::None,
            filter_placeholder: "Search...".to_string(),
            enable_sorting: true,
            enable_pagination: true,
            initial_page_size: 5,
            page_size_options: vec![5, 10, 20, 50],
            row_key: "id".to_string(),
            enable_row_selection: false,
            min_visible_columns: 2,
        }
    }
}

impl GridConfig {
    /// Builder-style: set the filter mode.
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Builder-style: set the initial page size.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.initial_page_size = size;
        self
    }

    /// Builder-style: enable row selection.
    pub fn with_row_selection(mut self) -> Self {
        self.enable_row_selection = true;
        self
    }

    /// Builder-style: disable pagination.
    pub fn without_pagination(mut self) -> Self {
        self.enable_pagination = false;
        self
    }

    /// Builder-style: disable sorting.
    pub fn without_sorting(mut self) -> Self {
        self.enable_sorting = false;
        self
    }

    /// Check the configuration for values the grid cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.initial_page_size == 0 {
            return Err(Error::InvalidConfig(
                "initialPageSize must be positive".into(),
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(Error::InvalidConfig(
                "pageSizeOptions must all be positive".into(),
            ));
        }
        if self.row_key.is_empty() {
            return Err(Error::InvalidConfig("rowKey must not be empty".into()));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
