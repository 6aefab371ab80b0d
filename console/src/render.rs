//! Plain-text table rendering.

use gridline_engine::{Grid, GridObserver, GridView, Record, Row};
use std::fmt::Write;

/// Header badge for a sorted column: `^` ascending, `v` descending, with the
/// 1-based rule position when more than one column is sorted.
fn sort_badge(position: usize, descending: bool, rules: usize) -> String {
    let arrow = if descending { "v" } else { "^" };
    if rules > 1 {
        format!(" {}{}", arrow, position)
    } else {
        format!(" {}", arrow)
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Render one derivation as an aligned table with a page footer.
pub fn table<O>(view: &GridView<'_, Record>, grid: &Grid<Record, O>) -> String
where
    O: GridObserver<Record>,
{
    let selection = grid.config().enable_row_selection;
    let rules = grid.state().sort.len();

    let mut header: Vec<String> = Vec::new();
    if selection {
        header.push(if view.all_visible_selected { "[x]" } else { "[ ]" }.to_string());
    }
    header.push("id".to_string());
    for column in &view.columns {
        let badge = grid
            .sort_indicator(&column.key)
            .map(|(position, descending)| sort_badge(position, descending, rules))
            .unwrap_or_default();
        header.push(format!("{}{}", column.header, badge));
    }

    let body: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            let mut cells = Vec::new();
            if selection {
                let marker = if grid.is_selected(&row.id()) { "[x]" } else { "[ ]" };
                cells.push(marker.to_string());
            }
            cells.push(row.id().to_string());
            cells.extend(view.columns.iter().map(|c| c.cell_text(*row)));
            cells
        })
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            body.iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&header));
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );

    if body.is_empty() {
        let _ = writeln!(out, "No data found");
    }
    for cells in &body {
        let _ = writeln!(out, "{}", line(cells));
    }

    let _ = write!(
        out,
        "Page {} of {} ({} rows)",
        view.page.current_page, view.page.total_pages, view.page.total_rows
    );
    if selection && !grid.selected().is_empty() {
        let _ = write!(out, " | {} selected", grid.selected().len());
    }
    out.push('\n');
    out
}
