//! Column descriptors and the column visibility resolver.
//!
//! Columns are host configuration. The grid only reads them; the host flips
//! visibility through [`toggle_visibility`], which enforces a minimum number of
//! visible columns.

use crate::{error::Result, Error, FieldValue, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Display transform applied to a cell value.
pub type Renderer = Arc<dyn Fn(&FieldValue<'_>) -> String + Send + Sync>;

fn default_visible() -> bool {
    true
}

/// Describes how one field is displayed, sorted and filtered.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Field name the column reads
    pub key: String,
    /// Header label
    pub header: String,
    /// Whether clicking the header sorts by this column
    #[serde(default)]
    pub sortable: bool,
    /// Whether the column is currently shown
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Optional display transform, attached in code
    #[serde(skip)]
    pub render: Option<Renderer>,
}

impl Column {
    /// Create a visible, non-sortable column.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            visible: true,
            render: None,
        }
    }

    /// Builder-style: make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Builder-style: start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Builder-style: attach a display transform.
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&FieldValue<'_>) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Text shown in this column's cell for `row`.
    pub fn cell_text<R: Row>(&self, row: &R) -> String {
        let value = row.field(&self.key).unwrap_or(FieldValue::Null);
        match &self.render {
            Some(render) => render(&value),
            None => value.to_text().into_owned(),
        }
    }

    /// Parse and validate a column list from JSON.
    pub fn many_from_json(json: &str) -> Result<Vec<Column>> {
        let columns: Vec<Column> =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        validate_columns(&columns)?;
        Ok(columns)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("visible", &self.visible)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Reject column lists that declare the same key twice.
pub fn validate_columns(columns: &[Column]) -> Result<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            return Err(Error::DuplicateColumn(column.key.clone()));
        }
    }
    Ok(())
}

/// The visible subset of `columns`, in declaration order.
pub fn visible_columns(columns: &[Column]) -> Vec<&Column> {
    columns.iter().filter(|c| c.visible).collect()
}

pub fn visible_count(columns: &[Column]) -> usize {
    columns.iter().filter(|c| c.visible).count()
}

/// Whether the column `key` may be hidden without dropping below `min_visible`.
pub fn can_hide(columns: &[Column], key: &str, min_visible: usize) -> bool {
    columns
        .iter()
        .find(|c| c.key == key)
        .is_some_and(|c| c.visible && visible_count(columns) > min_visible)
}

/// Flip the visibility of column `key`.
///
/// Returns `false` without touching anything when the key is unknown or when
/// hiding would leave fewer than `min_visible` columns visible.
pub fn toggle_visibility(columns: &mut [Column], key: &str, min_visible: usize) -> bool {
    let visible = visible_count(columns);
    let Some(column) = columns.iter_mut().find(|c| c.key == key) else {
        return false;
    };

    if column.visible && visible <= min_visible {
        tracing::debug!(column = %key, visible, min_visible, "refusing to hide column");
        return false;
    }

    column.visible = !column.visible;
    true
}
