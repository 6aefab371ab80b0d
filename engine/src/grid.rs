//! Grid - the stateful engine the host drives.
//!
//! The grid owns filter, sort, pagination and selection state and mutates it
//! only through its own transition methods. Records and columns are supplied
//! by the host on every [`Grid::recompute`], which runs the fixed pipeline
//!
//! ```text
//! columns -> visibility
//! records -> filter -> sort -> paginate -> view
//! ```
//!
//! and notifies the observer when the view differs from the last emission.

use crate::{
    column, filter, paginate, sort, Column, DerivedView, FilterState, GridConfig, GridObserver,
    GridView, PageInfo, Pagination, Row, RowId, Selection, SortRules,
};
use std::collections::BTreeSet;

/// All mutable state of one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    pub filters: FilterState,
    pub sort: SortRules,
    pub pagination: Pagination,
    pub selection: Selection,
}

impl GridState {
    fn new(config: &GridConfig) -> Self {
        Self {
            filters: FilterState::new(),
            sort: SortRules::new(),
            pagination: Pagination::new(config.initial_page_size),
            selection: Selection::new(),
        }
    }
}

/// The data-grid engine.
///
/// `R` is the row type, `O` the observer receiving change notifications.
#[derive(Debug)]
pub struct Grid<R, O = ()> {
    config: GridConfig,
    state: GridState,
    /// Row count after filtering, from the last derivation
    total_rows: usize,
    /// Ids on the current page, from the last derivation
    visible_ids: Vec<RowId>,
    last_emitted: Option<DerivedView<R>>,
    observer: O,
}

impl<R: Row + Clone + PartialEq> Grid<R> {
    /// Create a grid nobody observes.
    pub fn new(config: GridConfig) -> Self {
        Self::with_observer(config, ())
    }
}

impl<R, O> Grid<R, O>
where
    R: Row + Clone + PartialEq,
    O: GridObserver<R>,
{
    /// Create a grid that notifies `observer`.
    pub fn with_observer(config: GridConfig, observer: O) -> Self {
        let state = GridState::new(&config);
        Self {
            config,
            state,
            total_rows: 0,
            visible_ids: Vec::new(),
            last_emitted: None,
            observer,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Last view handed to the observer.
    pub fn last_emitted(&self) -> Option<&DerivedView<R>> {
        self.last_emitted.as_ref()
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Set (or clear, with "") the pattern of one column. Resets to page 1.
    pub fn set_column_filter(&mut self, key: &str, pattern: &str) -> bool {
        if !self.state.filters.set_column(key, pattern) {
            return false;
        }
        tracing::debug!(column = %key, pattern = %pattern, "column filter changed");
        self.state.pagination.reset();
        true
    }

    /// Set (or clear, with "") the global pattern. Resets to page 1.
    pub fn set_global_filter(&mut self, pattern: &str) -> bool {
        if !self.state.filters.set_global(pattern) {
            return false;
        }
        tracing::debug!(pattern = %pattern, "global filter changed");
        self.state.pagination.reset();
        true
    }

    pub fn clear_filters(&mut self) -> bool {
        if !self.state.filters.clear() {
            return false;
        }
        tracing::debug!("filters cleared");
        self.state.pagination.reset();
        true
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Header click on `column`. `multi` is the modifier-qualified click.
    ///
    /// No-op when sorting is disabled or the column is not sortable.
    pub fn toggle_sort(&mut self, column: &Column, multi: bool) -> bool {
        if !self.config.enable_sorting || !column.sortable {
            return false;
        }
        if multi {
            self.state.sort.toggle_multi(&column.key);
        } else {
            self.state.sort.toggle(&column.key);
        }
        tracing::debug!(column = %column.key, multi, rules = ?self.state.sort, "sort toggled");
        self.state.pagination.reset();
        true
    }

    pub fn clear_sort(&mut self) -> bool {
        if !self.state.sort.clear() {
            return false;
        }
        self.state.pagination.reset();
        true
    }

    /// Header badge for `key`: 1-based rule position and direction.
    pub fn sort_indicator(&self, key: &str) -> Option<(usize, bool)> {
        self.state.sort.indicator(key)
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !self.config.enable_pagination {
            return false;
        }
        let changed = self.state.pagination.set_page_size(size);
        if changed {
            tracing::debug!(size, "page size changed");
        }
        changed
    }

    pub fn next_page(&mut self) -> bool {
        self.config.enable_pagination && self.state.pagination.next(self.total_rows)
    }

    pub fn previous_page(&mut self) -> bool {
        self.config.enable_pagination && self.state.pagination.previous()
    }

    /// Jump to `page`, clamped to the pages of the last derivation.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.config.enable_pagination && self.state.pagination.go_to(page, self.total_rows)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Flip the selection of row `id`.
    pub fn toggle_row(&mut self, id: RowId) -> bool {
        if !self.config.enable_row_selection {
            return false;
        }
        self.state.selection.toggle(id);
        self.notify_selection();
        true
    }

    /// Select (`checked`) or unselect exactly `visible_ids`.
    pub fn toggle_all_visible(&mut self, checked: bool, visible_ids: &[RowId]) -> bool {
        if !self.config.enable_row_selection {
            return false;
        }
        if !self.state.selection.toggle_all_visible(checked, visible_ids) {
            return false;
        }
        self.notify_selection();
        true
    }

    /// [`Grid::toggle_all_visible`] over the page of the last derivation.
    pub fn toggle_all_on_page(&mut self, checked: bool) -> bool {
        let visible = std::mem::take(&mut self.visible_ids);
        let changed = self.toggle_all_visible(checked, &visible);
        self.visible_ids = visible;
        changed
    }

    pub fn is_all_visible_selected(&self, visible_ids: &[RowId]) -> bool {
        self.state.selection.is_all_visible_selected(visible_ids)
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.state.selection.is_selected(id)
    }

    pub fn selected(&self) -> &BTreeSet<RowId> {
        self.state.selection.ids()
    }

    pub fn clear_selection(&mut self) -> bool {
        if !self.state.selection.clear() {
            return false;
        }
        self.notify_selection();
        true
    }

    fn notify_selection(&mut self) {
        let selected = self.state.selection.ids();
        tracing::debug!(selected = selected.len(), "selection changed");
        self.observer.on_selection_change(selected);
    }

    // -------------------------------------------------------------------------
    // Derivation
    // -------------------------------------------------------------------------

    /// Run the pipeline over the host's current records and columns.
    pub fn recompute<'a>(&mut self, records: &'a [R], columns: &'a [Column]) -> GridView<'a, R> {
        let visible = column::visible_columns(columns);

        let filtered = filter::apply(
            records.iter().collect(),
            &self.state.filters,
            self.config.filter_mode,
            &visible,
        );

        let sorted = if self.config.enable_sorting {
            sort::apply(filtered, &self.state.sort)
        } else {
            filtered
        };

        let total_rows = sorted.len();
        self.total_rows = total_rows;

        let (rows, page) = if self.config.enable_pagination {
            self.state.pagination.clamp(total_rows);
            let page = self.state.pagination.info(total_rows);
            (paginate::apply(sorted, &self.state.pagination), page)
        } else {
            (sorted, single_page(total_rows))
        };

        self.visible_ids = rows.iter().map(|r| r.id()).collect();

        let data_changed = self
            .last_emitted
            .as_ref()
            .map_or(true, |last| !last.matches(&rows, &visible));

        if data_changed {
            let view = DerivedView::capture(&rows, &visible);
            self.observer.on_data_change(&view);
            self.last_emitted = Some(view);
        }

        tracing::trace!(
            records = records.len(),
            filtered = total_rows,
            shown = rows.len(),
            page = page.current_page,
            data_changed,
            "grid recomputed"
        );

        GridView {
            all_visible_selected: self.state.selection.is_all_visible_selected(&self.visible_ids),
            rows,
            columns: visible,
            page,
            data_changed,
        }
    }
}

fn single_page(total_rows: usize) -> PageInfo {
    PageInfo {
        current_page: 1,
        page_size: total_rows,
        total_pages: 1,
        total_rows,
        has_previous: false,
        has_next: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FilterMode, Record, Recorder};
    use serde_json::json;

    fn users() -> Vec<Record> {
        Record::many_from_value(
            json!([
                {"id": 1, "name": "Ahmet Yılmaz", "email": "ahmet@example.com", "role": "Admin"},
                {"id": 2, "name": "Ayşe Demir", "email": "ayse@example.com", "role": "User"},
                {"id": 3, "name": "Mehmet Akar", "email": "mehmet@example.com", "role": "User"},
                {"id": 4, "name": "Zeynep Şahin", "email": "zeynep@example.com", "role": "Editor"},
                {"id": 5, "name": "Ali Çelik", "email": "ali@example.com", "role": "User"},
                {"id": 6, "name": "Fatma Koç", "email": "fatma@example.com", "role": "Admin"},
                {"id": 7, "name": "Emre Güneş", "email": "emre@example.com", "role": "Editor"},
                {"id": 8, "name": "Burak Yıldız", "email": "burak@example.com", "role": "User"},
                {"id": 9, "name": "Cem Özkan", "email": "cem@example.com", "role": "Admin"},
                {"id": 10, "name": "Selin Arslan", "email": "selin@example.com", "role": "User"},
            ]),
            "id",
        )
        .unwrap()
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").sortable(),
            Column::new("email", "Email").sortable(),
            Column::new("role", "Role").sortable(),
            Column::new("id", "ID"),
        ]
    }

    fn config() -> GridConfig {
        GridConfig::default()
            .with_filter_mode(FilterMode::Both)
            .with_row_selection()
    }

    fn ids(view: &GridView<'_, Record>) -> Vec<i64> {
        view.visible_ids()
            .into_iter()
            .map(|id| match id {
                RowId::Int(i) => i,
                RowId::Str(_) => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn first_page_by_default() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::new(config());

        let view = grid.recompute(&data, &cols);
        assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
        assert_eq!(view.page.total_pages, 2);
        assert_eq!(view.page.total_rows, 10);
        assert_eq!(view.columns.len(), 4);
    }

    #[test]
    fn filter_change_resets_page() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::new(config());

        grid.recompute(&data, &cols);
        assert!(grid.next_page());
        assert_eq!(grid.recompute(&data, &cols).page.current_page, 2);

        assert!(grid.set_column_filter("role", "user"));
        let view = grid.recompute(&data, &cols);
        assert_eq!(view.page.current_page, 1);
        assert_eq!(ids(&view), vec![2, 3, 5, 8, 10]);
    }

    #[test]
    fn sort_change_resets_page() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::new(config());

        grid.recompute(&data, &cols);
        grid.next_page();
        assert!(grid.toggle_sort(&cols[0], false));
        let view = grid.recompute(&data, &cols);
        assert_eq!(view.page.current_page, 1);
        // Ahmet, Ali, Ayşe, Burak, Cem
        assert_eq!(ids(&view), vec![1, 5, 2, 8, 9]);
        assert_eq!(grid.sort_indicator("name"), Some((1, false)));
    }

    #[test]
    fn non_sortable_column_ignored() {
        let cols = columns();
        let mut grid: Grid<Record> = Grid::new(config());
        assert!(!grid.toggle_sort(&cols[3], false));

        let mut grid: Grid<Record> = Grid::new(config().without_sorting());
        assert!(!grid.toggle_sort(&cols[0], false));
        assert!(grid.state().sort.is_empty());
    }

    #[test]
    fn page_clamps_when_rows_shrink() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::new(config());

        grid.recompute(&data, &cols);
        grid.next_page();
        grid.recompute(&data, &cols);

        // Host drops records; page 2 no longer exists
        let fewer = &data[..3];
        let view = grid.recompute(fewer, &cols);
        assert_eq!(view.page.current_page, 1);
        assert_eq!(view.rows.len(), 3);
    }

    #[test]
    fn empty_data_has_one_page() {
        let cols = columns();
        let mut grid: Grid<Record> = Grid::new(config());

        let view = grid.recompute(&[], &cols);
        assert!(view.is_empty());
        assert_eq!(view.page.total_pages, 1);
        assert!(!view.page.has_next && !view.page.has_previous);
        assert!(!view.all_visible_selected);
        assert!(!grid.next_page());
    }

    #[test]
    fn pagination_disabled_shows_everything() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::new(config().without_pagination());

        let view = grid.recompute(&data, &cols);
        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.page.total_pages, 1);
        assert!(!grid.next_page());
        assert!(!grid.set_page_size(3));
    }

    #[test]
    fn select_all_scoped_to_page() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::with_observer(config(), Recorder::new());

        let view = grid.recompute(&data, &cols);
        let visible = view.visible_ids();
        assert!(grid.toggle_all_visible(true, &visible));

        assert_eq!(grid.selected().len(), 5);
        assert!(grid.recompute(&data, &cols).all_visible_selected);

        grid.next_page();
        let view = grid.recompute(&data, &cols);
        assert!(!view.all_visible_selected);
        assert_eq!(grid.observer().selection.len(), 5);
    }

    #[test]
    fn selection_survives_filtering() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::with_observer(config(), Recorder::new());

        grid.toggle_row(RowId::Int(4));
        grid.set_global_filter("fatma");
        let view = grid.recompute(&data, &cols);
        assert_eq!(ids(&view), vec![6]);
        assert!(grid.is_selected(&RowId::Int(4)));

        grid.set_global_filter("");
        grid.recompute(&data, &cols);
        assert!(grid.is_selected(&RowId::Int(4)));
        assert_eq!(grid.observer().selection_changes, 1);
    }

    #[test]
    fn selection_disabled_is_noop() {
        let mut grid = Grid::with_observer(GridConfig::default(), Recorder::<Record>::new());
        assert!(!grid.toggle_row(RowId::Int(1)));
        assert!(!grid.toggle_all_visible(true, &[RowId::Int(1)]));
        assert!(grid.selected().is_empty());
        assert_eq!(grid.observer().selection_changes, 0);
    }

    #[test]
    fn toggle_all_on_page_uses_last_derivation() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::with_observer(config().with_page_size(3), Recorder::new());

        grid.recompute(&data, &cols);
        assert!(grid.toggle_all_on_page(true));
        assert_eq!(
            grid.observer().selection.iter().cloned().collect::<Vec<_>>(),
            vec![RowId::Int(1), RowId::Int(2), RowId::Int(3)]
        );
        assert!(grid.toggle_all_on_page(false));
        assert!(grid.selected().is_empty());
        assert!(!grid.toggle_all_on_page(false));
    }

    #[test]
    fn clear_selection_notifies_once() {
        let mut grid = Grid::with_observer(config(), Recorder::<Record>::new());
        grid.toggle_row(RowId::Int(1));
        assert!(grid.clear_selection());
        assert!(!grid.clear_selection());
        assert_eq!(grid.observer().selection_changes, 2);
        assert!(grid.observer().selection.is_empty());
    }

    #[test]
    fn notifies_only_on_change() {
        let data = users();
        let mut cols = columns();
        let mut grid = Grid::with_observer(config(), Recorder::new());

        assert!(grid.recompute(&data, &cols).data_changed);
        assert!(!grid.recompute(&data, &cols).data_changed);
        assert_eq!(grid.observer().data_changes, 1);

        // Same rows, one column hidden
        cols[3].visible = false;
        assert!(grid.recompute(&data, &cols).data_changed);
        assert_eq!(grid.observer().data_changes, 2);

        // A filter that keeps the same first page is not a change
        grid.set_global_filter("example.com");
        assert!(!grid.recompute(&data, &cols).data_changed);

        // Updated record content on the page is a change
        let mut edited = data.clone();
        edited[0]
            .fields
            .insert("name".into(), json!("Ahmet Yılmaz-Kaya"));
        assert!(grid.recompute(&edited, &cols).data_changed);
        assert_eq!(grid.observer().data_changes, 3);

        let last = grid.observer().view.as_ref().unwrap();
        assert_eq!(last.rows[0].text("name"), "Ahmet Yılmaz-Kaya");
        assert_eq!(last.columns.len(), 3);
    }

    #[test]
    fn global_filter_ignores_hidden_columns() {
        let data = users();
        let mut cols = columns();
        let mut grid = Grid::new(config());

        grid.set_global_filter("editor");
        assert_eq!(grid.recompute(&data, &cols).page.total_rows, 2);

        cols[2].visible = false;
        assert_eq!(grid.recompute(&data, &cols).page.total_rows, 0);
    }

    #[test]
    fn filter_mode_none_ignores_patterns() {
        let data = users();
        let cols = columns();
        let mut grid = Grid::new(GridConfig::default());

        grid.set_column_filter("name", "zzz");
        grid.set_global_filter("zzz");
        assert_eq!(grid.recompute(&data, &cols).page.total_rows, 10);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_selection_persists_across_filters(
                target in 1i64..=10,
                pattern in "[a-z]{1,3}",
            ) {
                let data = users();
                let cols = columns();
                let mut grid = Grid::new(config());

                grid.toggle_row(RowId::Int(target));
                grid.set_global_filter(&pattern);
                grid.recompute(&data, &cols);
                prop_assert!(grid.is_selected(&RowId::Int(target)));

                grid.clear_filters();
                grid.recompute(&data, &cols);
                prop_assert!(grid.is_selected(&RowId::Int(target)));
            }

            #[test]
            fn prop_recompute_deterministic(page_size in 1usize..12, multi in any::<bool>()) {
                let data = users();
                let cols = columns();

                let run = || {
                    let mut grid = Grid::new(config().with_page_size(page_size));
                    grid.toggle_sort(&cols[2], multi);
                    grid.toggle_sort(&cols[0], true);
                    grid.recompute(&data, &cols);
                    grid.next_page();
                    let view = grid.recompute(&data, &cols);
                    view.visible_ids()
                };

                prop_assert_eq!(run(), run());
            }
        }
    }
}
