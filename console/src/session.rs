//! Console session: the host side of the grid.
//!
//! The session owns the dataset, the column descriptors and the export choice.
//! Everything it shows, exports or deletes comes from the grid's last
//! notifications, cached by a [`Recorder`].

use crate::command::{Command, HELP};
use crate::config::Config;
use crate::error::{ConsoleError, Result};
use crate::render;
use gridline_engine::{
    action, column, export, ActionVariant, Column, ExportSelection, Grid, GridConfig, Record,
    Recorder, Row, RowAction, RowId,
};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

/// Requests raised by row actions, applied once the action returns.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Effect {
    Edit(RowId),
    Delete(RowId),
}

/// What the main loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

pub struct Session {
    records: Vec<Record>,
    columns: Vec<Column>,
    grid: Grid<Record, Recorder<Record>>,
    export: ExportSelection,
    export_path: PathBuf,
    actions: Vec<RowAction<Record>>,
    effects: Rc<RefCell<Vec<Effect>>>,
}

/// One sortable column per field of the first record, except the row key.
fn default_columns(records: &[Record], row_key: &str) -> Vec<Column> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    first
        .fields
        .keys()
        .filter(|key| key.as_str() != row_key)
        .map(|key| {
            let mut chars = key.chars();
            let header = match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            Column::new(key.as_str(), header).sortable()
        })
        .collect()
}

impl Session {
    pub fn new(
        records: Vec<Record>,
        columns: Vec<Column>,
        config: GridConfig,
        export_path: PathBuf,
    ) -> Self {
        let effects = Rc::new(RefCell::new(Vec::new()));
        let edit_sink = Rc::clone(&effects);
        let delete_sink = Rc::clone(&effects);
        let actions = vec![
            RowAction::new("Edit", move |row: &Record| {
                edit_sink.borrow_mut().push(Effect::Edit(row.id()))
            }),
            RowAction::new("Delete", move |row: &Record| {
                delete_sink.borrow_mut().push(Effect::Delete(row.id()))
            })
            .with_variant(ActionVariant::Destructive),
        ];

        Self {
            export: ExportSelection::only(columns.iter().map(|c| c.key.clone())),
            records,
            columns,
            grid: Grid::with_observer(config, Recorder::new()),
            export_path,
            actions,
            effects,
        }
    }

    /// Load the dataset named by `config`.
    pub fn load(config: &Config) -> Result<Self> {
        let text = fs::read_to_string(&config.data_path)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let records = Record::many_from_value(value, &config.grid.row_key)?;
        let columns = match &config.columns {
            Some(columns) => columns.clone(),
            None => default_columns(&records, &config.grid.row_key),
        };

        tracing::info!(
            records = records.len(),
            columns = columns.len(),
            path = %config.data_path.display(),
            "dataset loaded"
        );

        Ok(Self::new(
            records,
            columns,
            config.grid.clone(),
            config.export_path.clone(),
        ))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn grid(&self) -> &Grid<Record, Recorder<Record>> {
        &self.grid
    }

    fn column(&self, key: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| ConsoleError::UnknownColumn(key.to_string()))
    }

    /// Recompute and render the current page.
    pub fn show(&mut self) -> String {
        let view = self.grid.recompute(&self.records, &self.columns);
        render::table(&view, &self.grid)
    }

    /// CSV of the last emitted view over the chosen export columns.
    pub fn export_csv(&self) -> String {
        let rows = self
            .grid
            .observer()
            .view
            .as_ref()
            .map(|v| v.rows.as_slice())
            .unwrap_or_default();
        export::to_csv(rows, &self.export.pick(&self.columns))
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        let output = match command {
            Command::Show => self.show(),
            Command::Filter { key, pattern } => {
                self.column(&key)?;
                self.grid.set_column_filter(&key, &pattern);
                self.show()
            }
            Command::Search(pattern) => {
                self.grid.set_global_filter(&pattern);
                self.show()
            }
            Command::ClearFilters => {
                self.grid.clear_filters();
                self.show()
            }
            Command::Sort { key, multi } => {
                let column = self.column(&key)?.clone();
                self.grid.toggle_sort(&column, multi);
                self.show()
            }
            Command::Next => {
                self.grid.next_page();
                self.show()
            }
            Command::Prev => {
                self.grid.previous_page();
                self.show()
            }
            Command::Page(page) => {
                self.grid.go_to_page(page);
                self.show()
            }
            Command::Size(size) => {
                if size == 0 {
                    return Err(ConsoleError::Usage("size <n> with n > 0"));
                }
                self.grid.set_page_size(size);
                self.show()
            }
            Command::Select(id) => {
                self.grid.toggle_row(id);
                self.show()
            }
            Command::SelectAll(checked) => {
                self.grid.toggle_all_on_page(checked);
                self.show()
            }
            Command::Columns => self.list_columns(),
            Command::Toggle(key) => self.toggle_column(&key)?,
            Command::ExportCols(keys) => {
                for key in &keys {
                    self.column(key)?;
                }
                self.export = ExportSelection::only(keys);
                let headers: Vec<&str> = self
                    .export
                    .pick(&self.columns)
                    .into_iter()
                    .map(|c| c.header.as_str())
                    .collect();
                format!("Export columns: {}\n", headers.join(", "))
            }
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| self.export_path.clone());
                let csv = self.export_csv();
                let rows = self.grid.observer().view.as_ref().map_or(0, |v| v.rows.len());
                fs::write(&path, csv)?;
                tracing::info!(rows, path = %path.display(), "exported CSV");
                format!("Wrote {} rows to {}\n", rows, path.display())
            }
            Command::Act { label, id } => self.run_action(&label, &id)?,
            Command::BulkDelete => self.bulk_delete(),
            Command::Help => format!("{}\n", HELP),
            Command::Quit => return Ok(Flow::Quit),
        };

        Ok(Flow::Continue(output))
    }

    fn list_columns(&self) -> String {
        self.columns
            .iter()
            .map(|c| {
                format!(
                    "[{}] {} ({}){}{}\n",
                    if c.visible { "x" } else { " " },
                    c.key,
                    c.header,
                    if c.sortable { " sortable" } else { "" },
                    if self.export.includes(&c.key) { " export" } else { "" },
                )
            })
            .collect()
    }

    fn toggle_column(&mut self, key: &str) -> Result<String> {
        self.column(key)?;
        let min = self.grid.config().min_visible_columns;
        if !column::toggle_visibility(&mut self.columns, key, min) {
            return Ok(format!("At least {} columns must stay visible\n", min));
        }
        Ok(self.show())
    }

    fn run_action(&mut self, label: &str, id: &RowId) -> Result<String> {
        let action = action::find(&self.actions, label)
            .ok_or_else(|| ConsoleError::UnknownAction(label.to_string()))?;
        let row = self
            .grid
            .observer()
            .view
            .as_ref()
            .and_then(|v| v.rows.iter().find(|r| &r.id == id))
            .ok_or_else(|| ConsoleError::UnknownRow(id.to_string()))?;
        action.invoke(row);

        let mut out = self.apply_effects();
        out.push_str(&self.show());
        Ok(out)
    }

    fn apply_effects(&mut self) -> String {
        let effects: Vec<Effect> = self.effects.borrow_mut().drain(..).collect();
        let mut out = String::new();
        for effect in effects {
            match effect {
                Effect::Edit(id) => {
                    tracing::info!(%id, "edit requested");
                    out.push_str(&format!("Editing row {}\n", id));
                }
                Effect::Delete(id) => {
                    self.records.retain(|r| r.id != id);
                    if self.grid.is_selected(&id) {
                        self.grid.toggle_row(id.clone());
                    }
                    tracing::info!(%id, "row deleted");
                    out.push_str(&format!("Deleted row {}\n", id));
                }
            }
        }
        out
    }

    fn bulk_delete(&mut self) -> String {
        let selected = self.grid.observer().selection.clone();
        if selected.is_empty() {
            return "Nothing selected\n".to_string();
        }

        let before = self.records.len();
        self.records.retain(|r| !selected.contains(&r.id));
        let deleted = before - self.records.len();
        self.grid.clear_selection();
        tracing::info!(deleted, "bulk delete");

        format!("Deleted {} rows\n{}", deleted, self.show())
    }
}
