//! Per-row actions (Edit, Delete, ...).
//!
//! The grid never interprets actions. Hosts render one button per action on
//! each row and call [`RowAction::invoke`] with the clicked row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual weight of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    Default,
    #[default]
    Outline,
    Destructive,
}

/// A labelled callback run against one row.
pub struct RowAction<R> {
    pub label: String,
    pub variant: ActionVariant,
    on_click: Box<dyn Fn(&R)>,
}

impl<R> RowAction<R> {
    /// Create an outline action.
    pub fn new(label: impl Into<String>, on_click: impl Fn(&R) + 'static) -> Self {
        Self {
            label: label.into(),
            variant: ActionVariant::default(),
            on_click: Box::new(on_click),
        }
    }

    /// Builder-style: set the variant.
    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn invoke(&self, row: &R) {
        (self.on_click)(row)
    }
}

impl<R> fmt::Debug for RowAction<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowAction")
            .field("label", &self.label)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

/// Find an action by label, ignoring case.
pub fn find<'a, R>(actions: &'a [RowAction<R>], label: &str) -> Option<&'a RowAction<R>> {
    actions.iter().find(|a| a.label.eq_ignore_ascii_case(label))
}
