//! Generic sortable table.
//!
//! Rows are any [`TableRow`] (JSON objects in practice). Columns name a
//! field path, a label and optionally a renderer; the table owns a single
//! active [`SortState`] and renders to a plain [`RenderedTable`] that the
//! terminal layer turns into a `comfy_table::Table`.

pub mod column;
pub mod error;
pub mod path;
pub mod sort;
pub mod table;
pub mod terminal;

pub use column::{Alignment, CellStyle, Column, RenderError};
pub use error::{Result, TableError};
pub use path::{TableRow, lookup};
pub use sort::{SortDirection, SortState, compare_values, sort_rows};
pub use table::{
    CellKind, DEFAULT_EMPTY_MESSAGE, ERROR_PLACEHOLDER, HeaderCell, MISSING_PLACEHOLDER,
    RenderedCell, RenderedRow, RenderedTable, SortIndicator, SortableTable, TableView,
};
pub use terminal::to_comfy_table;
