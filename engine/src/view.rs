//! Derived views and host notifications.

use crate::{Column, PageInfo, Row, RowId};
use std::collections::BTreeSet;

/// Snapshot of what the grid shows: final rows and visible columns.
///
/// This is what the host receives on a data change, and what the grid keeps
/// as its last emission to decide whether the next derivation is a change.
#[derive(Debug, Clone)]
pub struct DerivedView<R> {
    pub rows: Vec<R>,
    pub columns: Vec<Column>,
}

impl<R: Clone> DerivedView<R> {
    pub(crate) fn capture(rows: &[&R], columns: &[&Column]) -> Self {
        Self {
            rows: rows.iter().map(|r| (*r).clone()).collect(),
            columns: columns.iter().map(|c| (*c).clone()).collect(),
        }
    }
}

impl<R: PartialEq> DerivedView<R> {
    /// Order-sensitive comparison against a fresh derivation.
    ///
    /// Rows compare by value at each position. Columns compare by key and
    /// visibility flag at each position.
    pub fn matches(&self, rows: &[&R], columns: &[&Column]) -> bool {
        self.rows.len() == rows.len()
            && self.columns.len() == columns.len()
            && self.rows.iter().zip(rows).all(|(a, b)| a == *b)
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|(a, b)| a.key == b.key && a.visible == b.visible)
    }
}

impl<R: Row> DerivedView<R> {
    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(Row::id).collect()
    }
}

/// Receives the grid's notifications.
///
/// Both methods default to doing nothing, so hosts implement only what they
/// need. `()` is the observer of a grid nobody listens to.
pub trait GridObserver<R> {
    /// Final rows or visible columns differ from the last emission.
    fn on_data_change(&mut self, view: &DerivedView<R>) {
        let _ = view;
    }

    /// The selection set was mutated. Carries the full set, not a delta.
    fn on_selection_change(&mut self, selected: &BTreeSet<RowId>) {
        let _ = selected;
    }
}

impl<R> GridObserver<R> for () {}

/// Observer that keeps the latest notifications.
///
/// This is the usual host pattern: export and bulk actions read from the last
/// emitted view and selection instead of re-deriving state.
#[derive(Debug, Clone)]
pub struct Recorder<R> {
    pub view: Option<DerivedView<R>>,
    pub selection: BTreeSet<RowId>,
    pub data_changes: usize,
    pub selection_changes: usize,
}

impl<R> Default for Recorder<R> {
    fn default() -> Self {
        Self {
            view: None,
            selection: BTreeSet::new(),
            data_changes: 0,
            selection_changes: 0,
        }
    }
}

impl<R> Recorder<R> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: Clone> GridObserver<R> for Recorder<R> {
    fn on_data_change(&mut self, view: &DerivedView<R>) {
        self.view = Some(view.clone());
        self.data_changes += 1;
    }

    fn on_selection_change(&mut self, selected: &BTreeSet<RowId>) {
        self.selection = selected.clone();
        self.selection_changes += 1;
    }
}

/// Everything a host needs to render one derivation.
#[derive(Debug)]
pub struct GridView<'a, R> {
    /// Rows of the current page, in display order
    pub rows: Vec<&'a R>,
    /// Visible columns, in declaration order
    pub columns: Vec<&'a Column>,
    pub page: PageInfo,
    /// State of the "select all" checkbox for this page
    pub all_visible_selected: bool,
    /// Whether this derivation notified the observer
    pub data_changed: bool,
}

impl<R: Row> GridView<'_, R> {
    /// Identifiers of the rows on the current page.
    pub fn visible_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
