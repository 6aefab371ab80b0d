//! Line commands understood by the console.

use crate::error::{ConsoleError, Result};
use gridline_engine::RowId;
use std::path::PathBuf;
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  show                      print the current page
  filter <key> [pattern]    set or clear a column filter
  search [pattern]          set or clear the global filter
  clear-filters             clear every filter
  sort <key>                sort by a column (asc, desc, off)
  sort+ <key>               add a column to a multi-column sort
  next | prev               move one page
  page <n>                  jump to page n
  size <n>                  change the page size
  select <id>               toggle selection of a row
  select-all | unselect-all select or unselect the current page
  columns                   list columns
  toggle <key>              show or hide a column
  export-cols <key,...>     choose the export columns
  export [path]             write the current view as CSV
  act <label> <id>          run a row action (Edit, Delete)
  bulk-delete               delete every selected row
  help                      show this help
  quit                      leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Filter { key: String, pattern: String },
    Search(String),
    ClearFilters,
    Sort { key: String, multi: bool },
    Next,
    Prev,
    Page(usize),
    Size(usize),
    Select(RowId),
    SelectAll(bool),
    Columns,
    Toggle(String),
    ExportCols(Vec<String>),
    Export(Option<PathBuf>),
    Act { label: String, id: RowId },
    BulkDelete,
    Help,
    Quit,
}

/// Integers become integer ids, anything else a string id.
pub fn parse_id(raw: &str) -> RowId {
    raw.parse::<i64>()
        .map(RowId::Int)
        .unwrap_or_else(|_| RowId::Str(raw.to_string()))
}

fn parse_number(raw: Option<&str>, usage: &'static str) -> Result<usize> {
    raw.and_then(|n| n.parse().ok())
        .ok_or(ConsoleError::Usage(usage))
}

impl FromStr for Command {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then_some(rest);

        let command = match name {
            "show" | "" => Command::Show,
            "filter" => {
                let arg = arg.ok_or(ConsoleError::Usage("filter <key> [pattern]"))?;
                let (key, pattern) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
                Command::Filter {
                    key: key.to_string(),
                    pattern: pattern.trim().to_string(),
                }
            }
            "search" => Command::Search(rest.to_string()),
            "clear-filters" => Command::ClearFilters,
            "sort" | "sort+" => Command::Sort {
                key: arg.ok_or(ConsoleError::Usage("sort <key>"))?.to_string(),
                multi: name == "sort+",
            },
            "next" => Command::Next,
            "prev" => Command::Prev,
            "page" => Command::Page(parse_number(arg, "page <n>")?),
            "size" => Command::Size(parse_number(arg, "size <n>")?),
            "select" => Command::Select(parse_id(arg.ok_or(ConsoleError::Usage("select <id>"))?)),
            "select-all" => Command::SelectAll(true),
            "unselect-all" => Command::SelectAll(false),
            "columns" => Command::Columns,
            "toggle" => Command::Toggle(arg.ok_or(ConsoleError::Usage("toggle <key>"))?.to_string()),
            "export-cols" => {
                let arg = arg.ok_or(ConsoleError::Usage("export-cols <key,...>"))?;
                Command::ExportCols(
                    arg.split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(String::from)
                        .collect(),
                )
            }
            "export" => Command::Export(arg.map(PathBuf::from)),
            "act" => {
                let (label, id) = arg
                    .and_then(|a| a.split_once(char::is_whitespace))
                    .ok_or(ConsoleError::Usage("act <label> <id>"))?;
                Command::Act {
                    label: label.to_string(),
                    id: parse_id(id.trim()),
                }
            }
            "bulk-delete" => Command::BulkDelete,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}
