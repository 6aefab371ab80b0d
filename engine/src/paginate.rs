//! Pagination stage.

use serde::{Deserialize, Serialize};

/// Number of pages needed for `total_rows`. Never less than 1.
pub fn total_pages(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_rows.div_ceil(page_size).max(1)
}

/// Current page and page size.
///
/// `current_page` is 1-based and is kept within `[1, total_pages]` by
/// [`Pagination::clamp`], which the grid runs on every derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
}

impl Pagination {
    /// Start on page 1. A zero page size is bumped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Change the page size and return to page 1. Zero is refused.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if size == 0 {
            return false;
        }
        let changed = self.page_size != size || self.current_page != 1;
        self.page_size = size;
        self.current_page = 1;
        changed
    }

    /// Return to page 1. Returns true if the page changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.current_page != 1;
        self.current_page = 1;
        changed
    }

    /// Jump to `page`, clamped into range. Returns true if the page changed.
    pub fn go_to(&mut self, page: usize, total_rows: usize) -> bool {
        let target = page.clamp(1, total_pages(total_rows, self.page_size));
        let changed = target != self.current_page;
        self.current_page = target;
        changed
    }

    /// Advance one page. No-op on the last page.
    pub fn next(&mut self, total_rows: usize) -> bool {
        if self.current_page >= total_pages(total_rows, self.page_size) {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Go back one page. No-op on page 1.
    pub fn previous(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.current_page -= 1;
        true
    }

    /// Pull `current_page` back into `[1, total_pages]`.
    pub fn clamp(&mut self, total_rows: usize) {
        self.current_page = self
            .current_page
            .clamp(1, total_pages(total_rows, self.page_size));
    }

    /// Index range of the current page within `total_rows` rows.
    pub fn window(&self, total_rows: usize) -> std::ops::Range<usize> {
        let start = (self.current_page.saturating_sub(1))
            .saturating_mul(self.page_size)
            .min(total_rows);
        let end = start.saturating_add(self.page_size).min(total_rows);
        start..end
    }

    /// Page metadata for `total_rows` rows.
    pub fn info(&self, total_rows: usize) -> PageInfo {
        let total_pages = total_pages(total_rows, self.page_size);
        PageInfo {
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages,
            total_rows,
            has_previous: self.current_page > 1,
            has_next: self.current_page < total_pages,
        }
    }
}

/// What a pagination control needs to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Rows after filtering, across all pages
    pub total_rows: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Run the pagination stage.
pub fn apply<T>(rows: Vec<T>, pagination: &Pagination) -> Vec<T> {
    let window = pagination.window(rows.len());
    rows.into_iter()
        .skip(window.start)
        .take(window.len())
        .collect()
}
