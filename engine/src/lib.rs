//! # Gridline Engine
//!
//! A deterministic in-memory data-grid engine.
//!
//! The engine takes a record set plus declarative column, filter, sort,
//! pagination and selection state and derives exactly which rows and columns a
//! host should render. It reports the derived view back to the host so the
//! host can drive side effects such as CSV export and bulk actions without
//! re-deriving anything itself.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine knows nothing about files, network or UI toolkits
//! - **Deterministic**: the same records, columns and state give the same view
//! - **Explicit**: state changes only through [`Grid`] methods, and derivation
//!   only happens when the host calls [`Grid::recompute`]
//!
//! ## Pipeline
//!
//! Every recompute runs the stages in a fixed order:
//!
//! 1. [`column::visible_columns`] - drop hidden columns
//! 2. [`filter::apply`] - column patterns, then the global pattern over visible columns
//! 3. [`sort::apply`] - stable multi-key sort, first rule primary
//! 4. [`paginate::apply`] - slice out the current page
//!
//! Selection is keyed by [`RowId`] and lives beside the pipeline, so it survives
//! filtering, sorting and paging.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridline_engine::{Column, FilterMode, Grid, GridConfig, Record, Recorder, Row};
//! use serde_json::json;
//!
//! // 1. Host data and columns
//! let users = Record::many_from_value(
//!     json!([
//!         {"id": 1, "name": "Ahmet", "email": "ahmet@example.com"},
//!         {"id": 2, "name": "Ayşe", "email": "ayse@example.com"},
//!         {"id": 3, "name": "Mehmet", "email": "mehmet@example.com"},
//!     ]),
//!     "id",
//! )
//! .unwrap();
//! let columns = vec![
//!     Column::new("name", "Name").sortable(),
//!     Column::new("email", "Email").sortable(),
//! ];
//!
//! // 2. A grid that records its notifications
//! let config = GridConfig::default().with_filter_mode(FilterMode::Column);
//! let mut grid = Grid::with_observer(config, Recorder::new());
//!
//! // 3. Change state, then recompute
//! grid.set_column_filter("name", "a");
//! grid.toggle_sort(&columns[0], false);
//! let view = grid.recompute(&users, &columns);
//!
//! let names: Vec<String> = view.rows.iter().map(|r| r.text("name")).collect();
//! assert_eq!(names, vec!["Ahmet", "Ayşe"]);
//! assert_eq!(grid.observer().data_changes, 1);
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module exposes the engine over JSON-backed records through
//! C-compatible functions, for hosts written in other languages.

pub mod action;
pub mod column;
pub mod config;
pub mod error;
pub mod export;
pub mod ffi;
pub mod filter;
pub mod grid;
pub mod paginate;
pub mod record;
pub mod selection;
pub mod sort;
pub mod view;

// Re-export main types at crate root
pub use action::{ActionVariant, RowAction};
pub use column::{Column, Renderer};
pub use config::{FilterMode, GridConfig};
pub use error::Error;
pub use export::ExportSelection;
pub use filter::FilterState;
pub use grid::{Grid, GridState};
pub use paginate::{PageInfo, Pagination};
pub use record::{FieldValue, Record, Row, RowId};
pub use selection::Selection;
pub use sort::{SortRule, SortRules};
pub use view::{DerivedView, GridObserver, GridView, Recorder};
