//! Selection tracker.
//!
//! Tracks selected rows by identifier, so membership survives re-filtering,
//! re-sorting and paging. A row that is filtered out stays selected.

use crate::RowId;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<RowId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`.
    pub fn toggle(&mut self, id: RowId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Add (`checked`) or remove exactly `visible` ids. Returns true if the set changed.
    pub fn toggle_all_visible(&mut self, checked: bool, visible: &[RowId]) -> bool {
        let mut changed = false;
        for id in visible {
            changed |= if checked {
                self.selected.insert(id.clone())
            } else {
                self.selected.remove(id)
            };
        }
        changed
    }

    /// True when `visible` is non-empty and every id in it is selected.
    pub fn is_all_visible_selected(&self, visible: &[RowId]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id))
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Empty the set. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.selected.is_empty();
        self.selected.clear();
        had_any
    }

    pub fn ids(&self) -> &BTreeSet<RowId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
