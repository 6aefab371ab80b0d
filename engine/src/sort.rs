//! Sort stage and the header-click toggle state machine.
//!
//! A rule list is applied as one stable sort whose comparator consults the
//! rules in list order: the first rule is the primary key and every later rule
//! only breaks ties left by the ones before it. This is the same ordering as
//! running one stable pass per rule from the last rule to the first.

use crate::{FieldValue, Row};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single (field, direction) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRule {
    pub key: String,
    pub descending: bool,
}

impl SortRule {
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            descending: false,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            descending: true,
        }
    }
}

/// Ordered rule list. A key appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortRules(Vec<SortRule>);

impl SortRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[SortRule] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) -> bool {
        let had_any = !self.0.is_empty();
        self.0.clear();
        had_any
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|r| r.key == key)
    }

    /// Header position (1-based) and direction of `key`, if it is sorted.
    pub fn indicator(&self, key: &str) -> Option<(usize, bool)> {
        self.position(key).map(|i| (i + 1, self.0[i].descending))
    }

    /// Plain header click.
    ///
    /// unsorted -> ascending -> descending -> unsorted, always leaving at most
    /// one rule. Clicking a column that is not the primary rule restarts at
    /// ascending on that column alone.
    pub fn toggle(&mut self, key: &str) {
        let next = match self.0.first() {
            Some(primary) if primary.key == key && !primary.descending => {
                vec![SortRule::descending(key)]
            }
            Some(primary) if primary.key == key => Vec::new(),
            _ => vec![SortRule::ascending(key)],
        };
        self.0 = next;
    }

    /// Modifier-qualified header click.
    ///
    /// absent -> appended ascending -> descending -> removed, leaving other
    /// rules in place.
    pub fn toggle_multi(&mut self, key: &str) {
        match self.position(key) {
            None => self.0.push(SortRule::ascending(key)),
            Some(i) if !self.0[i].descending => self.0[i].descending = true,
            Some(i) => {
                self.0.remove(i);
            }
        }
    }
}

impl From<Vec<SortRule>> for SortRules {
    fn from(rules: Vec<SortRule>) -> Self {
        let mut out: Vec<SortRule> = Vec::with_capacity(rules.len());
        for rule in rules {
            if !out.iter().any(|r| r.key == rule.key) {
                out.push(rule);
            }
        }
        Self(out)
    }
}

/// Precomputed comparison key for one cell.
///
/// Keys fall into three ranks so mixed columns still sort by a total order:
/// empty text (null, absent or "") first, then numbers, then other text.
#[derive(Debug)]
enum SortKey {
    Empty,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn new(value: Option<FieldValue<'_>>) -> Self {
        let Some(value) = value else {
            return SortKey::Empty;
        };
        if let Some(n) = value.as_number() {
            return SortKey::Number(n);
        }
        let text = value.to_text().to_lowercase();
        if text.is_empty() {
            SortKey::Empty
        } else {
            SortKey::Text(text)
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Run the sort stage. Stable: rows equal under every rule keep input order.
pub fn apply<'a, R: Row>(rows: Vec<&'a R>, rules: &SortRules) -> Vec<&'a R> {
    if rules.is_empty() || rows.len() < 2 {
        return rows;
    }

    let mut keyed: Vec<(Vec<SortKey>, &'a R)> = rows
        .into_iter()
        .map(|row| {
            let keys = rules
                .rules()
                .iter()
                .map(|rule| SortKey::new(row.field(&rule.key)))
                .collect();
            (keys, row)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        for (i, rule) in rules.rules().iter().enumerate() {
            let ord = a[i].compare(&b[i]);
            let ord = if rule.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    keyed.into_iter().map(|(_, row)| row).collect()
}
