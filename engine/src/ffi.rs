//! FFI layer for non-Rust hosts.
//!
//! This module provides C-compatible functions over a grid of JSON-backed
//! [`Record`]s. Records, columns and configuration cross the boundary as JSON
//! strings.
//!
//! # Memory Management
//!
//! - Strings returned by `gridline_*` functions are allocated by Rust
//! - Caller must free them with `gridline_string_free`
//! - Grid pointers must be freed with `gridline_grid_free`
//!
//! # Error Handling
//!
//! Functions returning strings return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure
//!
//! Functions returning `i32` return `1` when state changed, `0` when the call
//! was a no-op and `-1` on a null pointer or undecodable argument.

use crate::{
    export, Column, ExportSelection, Grid, GridConfig, PageInfo, Record, Recorder, RowId,
    SortRule,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// Result wrapper for FFI responses.
#[derive(Serialize)]
#[serde(untagged)]
enum FfiResult<T: Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

fn error_string(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `gridline_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            const NUL_ERROR: &CStr = c"{\"error\":\"string contained null bytes\"}";
            CString::from(NUL_ERROR).into_raw()
        }
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn status(changed: bool) -> i32 {
    i32::from(changed)
}

/// A grid plus the columns of its last recompute.
pub struct GridHandle {
    grid: Grid<Record, Recorder<Record>>,
    columns: Vec<Column>,
}

/// Serialized form of one derivation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse<'a> {
    rows: Vec<&'a Map<String, Value>>,
    columns: Vec<&'a Column>,
    page: PageInfo,
    sort: &'a [SortRule],
    selected: Vec<&'a RowId>,
    all_visible_selected: bool,
    data_changed: bool,
}

// ============================================================================
// Grid Lifecycle
// ============================================================================

/// Create a new grid.
///
/// # Arguments
/// - `config_json`: JSON string of GridConfig, or null for defaults
///
/// # Returns
/// Pointer to the grid, or null if the configuration is invalid.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or null
/// - Caller must free the returned pointer with `gridline_grid_free`
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_new(config_json: *const c_char) -> *mut GridHandle {
    let config = if config_json.is_null() {
        GridConfig::default()
    } else {
        let Some(json) = from_c_string(config_json) else {
            return ptr::null_mut();
        };
        match GridConfig::from_json(&json) {
            Ok(c) => c,
            Err(_) => return ptr::null_mut(),
        }
    };

    let handle = GridHandle {
        grid: Grid::with_observer(config, Recorder::new()),
        columns: Vec::new(),
    };
    Box::into_raw(Box::new(handle))
}

/// Free a grid.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_free(grid: *mut GridHandle) {
    if !grid.is_null() {
        drop(Box::from_raw(grid));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `gridline_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn gridline_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Derivation
// ============================================================================

/// Run the pipeline over the host's current records and columns.
///
/// # Arguments
/// - `records_json`: JSON array of record objects
/// - `columns_json`: JSON array of column descriptors
///
/// # Returns
/// JSON string: `{"ok": {rows, columns, page, sort, selected, allVisibleSelected, dataChanged}}`
/// or `{"error": "message"}`
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - `records_json` and `columns_json` must be valid null-terminated C strings or null
/// - Caller must free the returned string with `gridline_string_free`
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_recompute(
    grid: *mut GridHandle,
    records_json: *const c_char,
    columns_json: *const c_char,
) -> *mut c_char {
    let handle = match grid.as_mut() {
        Some(h) => h,
        None => return error_string("null grid pointer"),
    };

    let Some(records_str) = from_c_string(records_json) else {
        return error_string("invalid records JSON");
    };
    let Some(columns_str) = from_c_string(columns_json) else {
        return error_string("invalid columns JSON");
    };

    let records = match Record::many_from_json(&records_str, &handle.grid.config().row_key) {
        Ok(r) => r,
        Err(e) => return error_string(e.to_string()),
    };
    handle.columns = match Column::many_from_json(&columns_str) {
        Ok(c) => c,
        Err(e) => return error_string(e.to_string()),
    };

    let view = handle.grid.recompute(&records, &handle.columns);
    let response = ViewResponse {
        rows: view.rows.iter().map(|r| &r.fields).collect(),
        columns: view.columns,
        page: view.page,
        sort: handle.grid.state().sort.rules(),
        selected: handle.grid.selected().iter().collect(),
        all_visible_selected: view.all_visible_selected,
        data_changed: view.data_changed,
    };

    to_c_string(FfiResult::ok(response).to_json())
}

// ============================================================================
// Filters and Sorting
// ============================================================================

/// Set the filter pattern of one column. An empty pattern clears it.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - `key` and `pattern` must be valid null-terminated C strings or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_set_column_filter(
    grid: *mut GridHandle,
    key: *const c_char,
    pattern: *const c_char,
) -> i32 {
    let Some(handle) = grid.as_mut() else {
        return -1;
    };
    match (from_c_string(key), from_c_string(pattern)) {
        (Some(k), Some(p)) => status(handle.grid.set_column_filter(&k, &p)),
        _ => -1,
    }
}

/// Set the global filter pattern. An empty pattern clears it.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - `pattern` must be a valid null-terminated C string or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_set_global_filter(
    grid: *mut GridHandle,
    pattern: *const c_char,
) -> i32 {
    let Some(handle) = grid.as_mut() else {
        return -1;
    };
    match from_c_string(pattern) {
        Some(p) => status(handle.grid.set_global_filter(&p)),
        None => -1,
    }
}

/// Clear every filter pattern.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_clear_filters(grid: *mut GridHandle) -> i32 {
    match grid.as_mut() {
        Some(h) => status(h.grid.clear_filters()),
        None => -1,
    }
}

/// Header click on the column `key` from the last recompute.
///
/// # Arguments
/// - `multi`: non-zero for a modifier-qualified click
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - `key` must be a valid null-terminated C string or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_toggle_sort(
    grid: *mut GridHandle,
    key: *const c_char,
    multi: i32,
) -> i32 {
    let Some(handle) = grid.as_mut() else {
        return -1;
    };
    let Some(key) = from_c_string(key) else {
        return -1;
    };
    match handle.columns.iter().find(|c| c.key == key) {
        Some(column) => status(handle.grid.toggle_sort(column, multi != 0)),
        None => 0,
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Change the page size and return to page 1.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_set_page_size(grid: *mut GridHandle, size: u64) -> i32 {
    match grid.as_mut() {
        Some(h) => status(h.grid.set_page_size(size as usize)),
        None => -1,
    }
}

/// Advance one page.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_next_page(grid: *mut GridHandle) -> i32 {
    match grid.as_mut() {
        Some(h) => status(h.grid.next_page()),
        None => -1,
    }
}

/// Go back one page.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_previous_page(grid: *mut GridHandle) -> i32 {
    match grid.as_mut() {
        Some(h) => status(h.grid.previous_page()),
        None => -1,
    }
}

/// Jump to a 1-based page, clamped into range.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_go_to_page(grid: *mut GridHandle, page: u64) -> i32 {
    match grid.as_mut() {
        Some(h) => status(h.grid.go_to_page(page as usize)),
        None => -1,
    }
}

// ============================================================================
// Selection
// ============================================================================

fn selection_response(handle: &GridHandle, changed: bool) -> *mut c_char {
    #[derive(Serialize)]
    struct SelectionResponse<'a> {
        changed: bool,
        selected: Vec<&'a RowId>,
    }

    let response = SelectionResponse {
        changed,
        selected: handle.grid.selected().iter().collect(),
    };
    to_c_string(FfiResult::ok(response).to_json())
}

/// Flip the selection of one row.
///
/// # Arguments
/// - `id_json`: the row identifier as JSON (`7` or `"c-17"`)
///
/// # Returns
/// JSON string: `{"ok": {"changed": bool, "selected": [...]}}` or `{"error": "message"}`
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - `id_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `gridline_string_free`
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_toggle_row(
    grid: *mut GridHandle,
    id_json: *const c_char,
) -> *mut c_char {
    let Some(handle) = grid.as_mut() else {
        return error_string("null grid pointer");
    };
    let Some(id_str) = from_c_string(id_json) else {
        return error_string("invalid id JSON");
    };
    let id: RowId = match serde_json::from_str(&id_str) {
        Ok(id) => id,
        Err(e) => return error_string(format!("parse error: {}", e)),
    };

    let changed = handle.grid.toggle_row(id);
    selection_response(handle, changed)
}

/// Select or unselect every row on the page of the last recompute.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - Caller must free the returned string with `gridline_string_free`
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_toggle_all_visible(
    grid: *mut GridHandle,
    checked: i32,
) -> *mut c_char {
    let Some(handle) = grid.as_mut() else {
        return error_string("null grid pointer");
    };
    let changed = handle.grid.toggle_all_on_page(checked != 0);
    selection_response(handle, changed)
}

/// Empty the selection.
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - Caller must free the returned string with `gridline_string_free`
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_clear_selection(grid: *mut GridHandle) -> *mut c_char {
    let Some(handle) = grid.as_mut() else {
        return error_string("null grid pointer");
    };
    let changed = handle.grid.clear_selection();
    selection_response(handle, changed)
}

// ============================================================================
// Export
// ============================================================================

/// Export the last emitted view as CSV.
///
/// # Arguments
/// - `keys_json`: JSON array of column keys to export, in any order
///
/// # Returns
/// JSON string: `{"ok": "<csv>"}` or `{"error": "message"}`
///
/// # Safety
/// - `grid` must be a valid pointer from `gridline_grid_new` or null
/// - `keys_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `gridline_string_free`
#[no_mangle]
pub unsafe extern "C" fn gridline_grid_export_csv(
    grid: *const GridHandle,
    keys_json: *const c_char,
) -> *mut c_char {
    let Some(handle) = grid.as_ref() else {
        return error_string("null grid pointer");
    };
    let Some(keys_str) = from_c_string(keys_json) else {
        return error_string("invalid keys JSON");
    };
    let keys: Vec<String> = match serde_json::from_str(&keys_str) {
        Ok(k) => k,
        Err(e) => return error_string(format!("parse error: {}", e)),
    };

    let selection = ExportSelection::only(keys);
    let rows = handle
        .grid
        .observer()
        .view
        .as_ref()
        .map(|v| v.rows.as_slice())
        .unwrap_or_default();

    let csv = export::to_csv(rows, &selection.pick(&handle.columns));
    to_c_string(FfiResult::ok(csv).to_json())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn config_json() -> CString {
        CString::new(r#"{"filterMode": "both", "initialPageSize": 2, "enableRowSelection": true}"#)
            .unwrap()
    }

    fn records_json() -> CString {
        CString::new(
            r#"[
                {"id": 1, "name": "Kahve Durağı", "city": "İzmir", "seats": 40},
                {"id": 2, "name": "Çay Bahçesi", "city": "Ankara", "seats": 120},
                {"id": 3, "name": "Latte Lab", "city": "İstanbul", "seats": 25}
            ]"#,
        )
        .unwrap()
    }

    fn columns_json() -> CString {
        CString::new(
            r#"[
                {"key": "name", "header": "Name", "sortable": true},
                {"key": "city", "header": "City", "sortable": true},
                {"key": "seats", "header": "Seats", "sortable": true}
            ]"#,
        )
        .unwrap()
    }

    unsafe fn take(ptr: *mut c_char) -> Value {
        let json: Value = serde_json::from_str(CStr::from_ptr(ptr).to_str().unwrap()).unwrap();
        gridline_string_free(ptr);
        json
    }

    unsafe fn recompute(grid: *mut GridHandle) -> Value {
        let records = records_json();
        let columns = columns_json();
        take(gridline_grid_recompute(grid, records.as_ptr(), columns.as_ptr()))
    }

    #[test]
    fn ffi_grid_lifecycle() {
        unsafe {
            let config = config_json();
            let grid = gridline_grid_new(config.as_ptr());
            assert!(!grid.is_null());
            gridline_grid_free(grid);

            let grid = gridline_grid_new(ptr::null());
            assert!(!grid.is_null());
            gridline_grid_free(grid);

            let bad = CString::new(r#"{"initialPageSize": 0}"#).unwrap();
            assert!(gridline_grid_new(bad.as_ptr()).is_null());
        }
    }

    #[test]
    fn ffi_recompute_and_sort() {
        unsafe {
            let config = config_json();
            let grid = gridline_grid_new(config.as_ptr());

            let view = recompute(grid);
            assert_eq!(view["ok"]["rows"].as_array().unwrap().len(), 2);
            assert_eq!(view["ok"]["page"]["totalPages"], 2);
            assert_eq!(view["ok"]["dataChanged"], true);

            let key = CString::new("seats").unwrap();
            assert_eq!(gridline_grid_toggle_sort(grid, key.as_ptr(), 0), 1);
            let view = recompute(grid);
            assert_eq!(view["ok"]["rows"][0]["seats"], 25);
            assert_eq!(view["ok"]["sort"][0]["key"], "seats");

            let unknown = CString::new("phone").unwrap();
            assert_eq!(gridline_grid_toggle_sort(grid, unknown.as_ptr(), 0), 0);

            assert_eq!(gridline_grid_next_page(grid), 1);
            assert_eq!(gridline_grid_next_page(grid), 0);
            let view = recompute(grid);
            assert_eq!(view["ok"]["rows"][0]["seats"], 120);

            gridline_grid_free(grid);
        }
    }

    #[test]
    fn ffi_filter_select_export() {
        unsafe {
            let config = config_json();
            let grid = gridline_grid_new(config.as_ptr());
            recompute(grid);

            let pattern = CString::new("lab").unwrap();
            assert_eq!(gridline_grid_set_global_filter(grid, pattern.as_ptr()), 1);
            let view = recompute(grid);
            assert_eq!(view["ok"]["page"]["totalRows"], 1);

            let selection = take(gridline_grid_toggle_all_visible(grid, 1));
            assert_eq!(selection["ok"]["selected"], serde_json::json!([3]));

            let id = CString::new(r#"1"#).unwrap();
            let selection = take(gridline_grid_toggle_row(grid, id.as_ptr()));
            assert_eq!(selection["ok"]["selected"], serde_json::json!([1, 3]));

            let keys = CString::new(r#"["name", "seats"]"#).unwrap();
            let csv = take(gridline_grid_export_csv(grid, keys.as_ptr()));
            assert_eq!(csv["ok"], "Name,Seats\nLatte Lab,25\n");

            let cleared = take(gridline_grid_clear_selection(grid));
            assert_eq!(cleared["ok"]["changed"], true);
            assert_eq!(cleared["ok"]["selected"], serde_json::json!([]));

            gridline_grid_free(grid);
        }
    }

    #[test]
    fn ffi_null_pointers() {
        unsafe {
            assert_eq!(gridline_grid_next_page(ptr::null_mut()), -1);
            assert_eq!(gridline_grid_clear_filters(ptr::null_mut()), -1);

            let result = take(gridline_grid_recompute(
                ptr::null_mut(),
                ptr::null(),
                ptr::null(),
            ));
            assert!(result["error"].is_string());
        }
    }

    #[test]
    fn ffi_bad_records() {
        unsafe {
            let grid = gridline_grid_new(ptr::null());
            let records = CString::new(r#"[{"name": "no id"}]"#).unwrap();
            let columns = columns_json();

            let result = take(gridline_grid_recompute(grid, records.as_ptr(), columns.as_ptr()));
            assert_eq!(result["error"], "missing identifier field: id");

            gridline_grid_free(grid);
        }
    }
}
