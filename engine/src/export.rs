//! CSV export of a derived view.
//!
//! Export columns are picked from every declared column, hidden ones included.
//! Each line ends with `\n`. Fields containing a comma, quote or line break are
//! quoted with embedded quotes doubled; everything else is written as is.

use crate::{Column, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which columns go into an export, keyed by column key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportSelection(BTreeMap<String, bool>);

impl ExportSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include exactly `keys`.
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(|k| (k.into(), true)).collect())
    }

    pub fn set(&mut self, key: impl Into<String>, included: bool) {
        self.0.insert(key.into(), included);
    }

    pub fn includes(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// The chosen columns, in declaration order.
    pub fn pick<'a>(&self, columns: &'a [Column]) -> Vec<&'a Column> {
        columns.iter().filter(|c| self.includes(&c.key)).collect()
    }
}

fn escape(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

/// Render `rows` as CSV over `columns`. Missing and null values are "".
pub fn to_csv<R: Row>(rows: &[R], columns: &[&Column]) -> String {
    let mut out = String::new();

    let header: Vec<_> = columns.iter().map(|c| escape(&c.header)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|c| escape(&row.text(&c.key)).into_owned())
            .collect();
        out.push_str(&values.join(","));
        out.push('\n');
    }

    out
}
