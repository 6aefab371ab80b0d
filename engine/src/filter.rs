//! Filter stage.
//!
//! Patterns are case-insensitive, unanchored substring matches against the
//! stringified field value. An empty pattern never constrains anything.

use crate::{Column, FieldValue, FilterMode, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column-scoped patterns plus one global pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Pattern per field key
    pub columns: BTreeMap<String, String>,
    /// Pattern matched against every visible column
    pub global: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pattern for one column. Returns true if it changed.
    pub fn set_column(&mut self, key: &str, pattern: &str) -> bool {
        if pattern.is_empty() {
            return self.columns.remove(key).is_some();
        }
        if self.columns.get(key).map(String::as_str) == Some(pattern) {
            return false;
        }
        self.columns.insert(key.to_string(), pattern.to_string());
        true
    }

    /// Set the global pattern. Returns true if it changed.
    pub fn set_global(&mut self, pattern: &str) -> bool {
        if self.global == pattern {
            return false;
        }
        self.global = pattern.to_string();
        true
    }

    /// Drop every pattern. Returns true if anything was set.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.is_empty();
        self.columns.clear();
        self.global.clear();
        had_any
    }

    /// True when no pattern constrains anything.
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.columns.values().all(String::is_empty)
    }

    /// Pattern currently set for `key`, or "".
    pub fn column(&self, key: &str) -> &str {
        self.columns.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Whether a field value contains an already-lowercased pattern.
///
/// Null and absent values never match.
fn contains(value: Option<FieldValue<'_>>, lowered: &str) -> bool {
    match value {
        None | Some(FieldValue::Null) => false,
        Some(v) => v.to_text().to_lowercase().contains(lowered),
    }
}

/// Run the filter stage.
///
/// Column filters apply first, then the global filter, which only scans
/// `visible` columns. Input order is preserved.
pub fn apply<'a, R: Row>(
    rows: Vec<&'a R>,
    state: &FilterState,
    mode: FilterMode,
    visible: &[&Column],
) -> Vec<&'a R> {
    let column_patterns: Vec<(&str, String)> = if mode.column_filters() {
        state
            .columns
            .iter()
            .filter(|(_, pattern)| !pattern.is_empty())
            .map(|(key, pattern)| (key.as_str(), pattern.to_lowercase()))
            .collect()
    } else {
        Vec::new()
    };

    let global = if mode.global_filter() && !state.global.is_empty() {
        Some(state.global.to_lowercase())
    } else {
        None
    };

    if column_patterns.is_empty() && global.is_none() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            column_patterns
                .iter()
                .all(|(key, pattern)| contains(row.field(key), pattern))
        })
        .filter(|row| match &global {
            Some(pattern) => visible
                .iter()
                .any(|column| contains(row.field(&column.key), pattern)),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, RowId};
    use serde_json::json;

    fn users() -> Vec<Record> {
        Record::many_from_value(
            json!([
                {"id": 1, "name": "Ahmet", "email": "ahmet@example.com", "role": "Admin"},
                {"id": 2, "name": "Ayşe", "email": "ayse@example.com", "role": "User"},
                {"id": 3, "name": "Mehmet", "email": "mehmet@corp.io", "role": null},
            ]),
            "id",
        )
        .unwrap()
    }

    fn ids(rows: &[&Record]) -> Vec<RowId> {
        rows.iter().map(|r| r.id.clone()).collect()
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name"),
            Column::new("email", "Email"),
            Column::new("role", "Role").hidden(),
        ]
    }

    #[test]
    fn column_filter_case_insensitive() {
        let data = users();
        let cols = columns();
        let visible = crate::column::visible_columns(&cols);
        let mut state = FilterState::new();
        state.set_column("name", "a");

        let out = apply(data.iter().collect(), &state, FilterMode::Column, &visible);
        assert_eq!(ids(&out), vec![RowId::Int(1), RowId::Int(2)]);

        state.set_column("name", "AHM");
        let out = apply(data.iter().collect(), &state, FilterMode::Column, &visible);
        assert_eq!(ids(&out), vec![RowId::Int(1)]);
    }

    #[test]
    fn null_fails_non_empty_column_filter() {
        let data = users();
        let mut state = FilterState::new();
        state.set_column("role", "e");

        let out = apply(data.iter().collect(), &state, FilterMode::Column, &[]);
        // "Admin" has no "e", "User" does, null never matches
        assert_eq!(ids(&out), vec![RowId::Int(2)]);
    }

    #[test]
    fn empty_pattern_is_no_constraint() {
        let data = users();
        let mut state = FilterState::new();
        state.columns.insert("name".into(), String::new());

        let out = apply(data.iter().collect(), &state, FilterMode::Both, &[]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn global_filter_scans_visible_columns_only() {
        let data = users();
        let cols = columns();
        let visible = crate::column::visible_columns(&cols);
        let mut state = FilterState::new();

        state.set_global("example.com");
        let out = apply(data.iter().collect(), &state, FilterMode::Global, &visible);
        assert_eq!(ids(&out), vec![RowId::Int(1), RowId::Int(2)]);

        // "admin" only appears in the hidden role column
        state.set_global("admin");
        let out = apply(data.iter().collect(), &state, FilterMode::Global, &visible);
        assert!(out.is_empty());
    }

    #[test]
    fn mode_selects_sub_filters() {
        let data = users();
        let cols = columns();
        let visible = crate::column::visible_columns(&cols);
        let mut state = FilterState::new();
        state.set_column("name", "mehmet");
        state.set_global("example");

        assert_eq!(apply(data.iter().collect(), &state, FilterMode::None, &visible).len(), 3);
        assert_eq!(apply(data.iter().collect(), &state, FilterMode::Column, &visible).len(), 1);
        assert_eq!(apply(data.iter().collect(), &state, FilterMode::Global, &visible).len(), 2);
        assert!(apply(data.iter().collect(), &state, FilterMode::Both, &visible).is_empty());
    }

    #[test]
    fn set_column_reports_changes() {
        let mut state = FilterState::new();
        assert!(state.set_column("name", "a"));
        assert!(!state.set_column("name", "a"));
        assert_eq!(state.column("name"), "a");
        assert!(state.set_column("name", ""));
        assert!(!state.set_column("name", ""));
        assert!(state.is_empty());
        assert!(!state.clear());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_records() -> impl Strategy<Value = Vec<Record>> {
            prop::collection::vec(("[a-cA-C]{0,4}", prop::option::of(0i64..20)), 0..30).prop_map(
                |items| {
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, (name, score))| {
                            let mut fields = serde_json::Map::new();
                            fields.insert("id".into(), json!(i));
                            fields.insert("name".into(), json!(name));
                            if let Some(score) = score {
                                fields.insert("score".into(), json!(score));
                            }
                            Record::new(i as i64, fields)
                        })
                        .collect()
                },
            )
        }

        proptest! {
            #[test]
            fn prop_filter_idempotent(
                data in arb_records(),
                name in "[a-c]{0,2}",
                global in "[a-c1]{0,2}",
            ) {
                let cols = vec![Column::new("name", "Name"), Column::new("score", "Score")];
                let visible = crate::column::visible_columns(&cols);
                let mut state = FilterState::new();
                state.set_column("name", &name);
                state.set_global(&global);

                let once = apply(data.iter().collect(), &state, FilterMode::Both, &visible);
                let twice = apply(once.clone(), &state, FilterMode::Both, &visible);
                prop_assert_eq!(ids(&once), ids(&twice));
            }
        }
    }
}
