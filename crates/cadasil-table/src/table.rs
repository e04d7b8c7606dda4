//! Table state and rendering.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, warn};

use crate::column::{CellStyle, Column};
use crate::error::{Result, TableError};
use crate::path::{TableRow, lookup};
use crate::sort::{SortDirection, SortState, sort_rows};

/// Placeholder shown when there are no rows to display.
pub const DEFAULT_EMPTY_MESSAGE: &str = "No data available";

/// Cell text for null, missing or empty values.
pub const MISSING_PLACEHOLDER: &str = "N/A";

/// Cell text for a renderer that failed.
pub const ERROR_PLACEHOLDER: &str = "Error";

// =============================================================================
// RENDERED OUTPUT
// =============================================================================

/// Header marker for the column's sort status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    /// Column cannot be sorted.
    Fixed,
    /// Sortable, but not the active column.
    Inactive,
    Ascending,
    Descending,
}

impl SortIndicator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Fixed => "",
            Self::Inactive => "⇅",
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub indicator: SortIndicator,
}

impl HeaderCell {
    /// Label followed by the sort indicator, if any.
    pub fn display(&self) -> String {
        match self.indicator {
            SortIndicator::Fixed => self.label.clone(),
            indicator => format!("{} {}", self.label, indicator.symbol()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Value,
    Missing,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub text: String,
    pub kind: CellKind,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// Stable identity: the row's `record_id`, else `id`, else its position.
    pub key: String,
    pub cells: Vec<RenderedCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedTable {
    pub fn row_keys(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.key.as_str()).collect()
    }

    /// Text of every cell in column `index`, in display order.
    pub fn column_text(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.cells.get(index))
            .map(|cell| cell.text.as_str())
            .collect()
    }
}

/// What a table renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    /// No rows; carries the placeholder message.
    Empty(String),
    Rows(RenderedTable),
}

// =============================================================================
// SORTABLE TABLE
// =============================================================================

/// Rows, column descriptors and the active sort.
#[derive(Debug)]
pub struct SortableTable<R> {
    rows: Vec<R>,
    columns: Vec<Column<R>>,
    sort: SortState,
    empty_message: String,
}

impl SortableTable<Value> {
    /// Builds a table from a JSON value, which must be an array of objects.
    pub fn from_json(data: Value, columns: Vec<Column<Value>>) -> Result<Self> {
        match data {
            Value::Array(rows) => Self::new(rows, columns),
            _ => Err(TableError::NotAList),
        }
    }
}

impl<R: TableRow> SortableTable<R> {
    /// Validates the configuration and starts unsorted.
    pub fn new(rows: Vec<R>, columns: Vec<Column<R>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }
        if let Some(index) = rows.iter().position(|row| !row.is_record()) {
            return Err(TableError::InvalidRow { index });
        }
        Ok(Self {
            rows,
            columns,
            sort: SortState::Unsorted,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        })
    }

    #[must_use]
    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Applies a header click on column `key`.
    ///
    /// Keys that name no column behave like a non-sortable column.
    pub fn click(&mut self, key: &str) -> &SortState {
        let sortable = self
            .columns
            .iter()
            .any(|column| column.key() == key && column.is_sortable());
        self.sort = std::mem::take(&mut self.sort).click(key, sortable);
        debug!(column = key, sort = %self.sort, "table header clicked");
        &self.sort
    }

    /// Rows in the current display order.
    pub fn sorted_rows(&self) -> Vec<&R> {
        sort_rows(&self.rows, &self.sort)
    }

    pub fn render(&self) -> TableView {
        if self.rows.is_empty() {
            return TableView::Empty(self.empty_message.clone());
        }
        let headers = self
            .columns
            .iter()
            .map(|column| HeaderCell {
                key: column.key().to_string(),
                label: column.label().to_string(),
                indicator: self.indicator(column),
            })
            .collect();
        let rows = self
            .sorted_rows()
            .into_iter()
            .enumerate()
            .map(|(index, row)| RenderedRow {
                key: row_key(row, index),
                cells: self
                    .columns
                    .iter()
                    .map(|column| render_cell(column, row))
                    .collect(),
            })
            .collect();
        TableView::Rows(RenderedTable { headers, rows })
    }

    fn indicator(&self, column: &Column<R>) -> SortIndicator {
        if !column.is_sortable() {
            return SortIndicator::Fixed;
        }
        match self.sort.direction_for(column.key()) {
            Some(SortDirection::Ascending) => SortIndicator::Ascending,
            Some(SortDirection::Descending) => SortIndicator::Descending,
            None => SortIndicator::Inactive,
        }
    }
}

fn render_cell<R: TableRow>(column: &Column<R>, row: &R) -> RenderedCell {
    let value = lookup(row, column.key());
    let style = column.style();
    match column.renderer() {
        // A panicking renderer is contained to its cell like a returned error.
        Some(renderer) => match panic::catch_unwind(AssertUnwindSafe(|| renderer(value, row))) {
            Ok(Ok(text)) => RenderedCell {
                text,
                kind: CellKind::Value,
                style,
            },
            Ok(Err(error)) => {
                warn!(column = column.key(), %error, "cell renderer failed");
                error_cell(style)
            }
            Err(_) => {
                warn!(column = column.key(), "cell renderer panicked");
                error_cell(style)
            }
        },
        None => match display_value(value) {
            Some(text) => RenderedCell {
                text,
                kind: CellKind::Value,
                style,
            },
            None => RenderedCell {
                text: MISSING_PLACEHOLDER.to_string(),
                kind: CellKind::Missing,
                style,
            },
        },
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(format_number(number)),
        other => Some(other.to_string()),
    }
}

fn format_number(number: &serde_json::Number) -> String {
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", value as i64),
        _ => number.to_string(),
    }
}

fn row_key<R: TableRow>(row: &R, index: usize) -> String {
    ["record_id", "id"]
        .iter()
        .find_map(|key| row.field(key).and_then(display_value))
        .map_or_else(|| format!("row-{index}"), |id| format!("row-{id}"))
}

fn error_cell(style: CellStyle) -> RenderedCell {
    RenderedCell {
        text: ERROR_PLACEHOLDER.to_string(),
        kind: CellKind::Error,
        style,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::column::RenderError;

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::new("record_id", "ID"),
            Column::new("edad", "Edad"),
            Column::new("acciones", "Acciones").sortable(false),
        ]
    }

    #[test]
    fn rejects_empty_columns_and_non_records() {
        let rows = vec![json!({"record_id": 1})];
        assert_eq!(
            SortableTable::new(rows, Vec::<Column<Value>>::new()).err(),
            Some(TableError::NoColumns)
        );
        let rows = vec![json!({"record_id": 1}), json!(42)];
        assert_eq!(
            SortableTable::new(rows, columns()).err(),
            Some(TableError::InvalidRow { index: 1 })
        );
        assert_eq!(
            SortableTable::from_json(json!({"record_id": 1}), columns()).err(),
            Some(TableError::NotAList)
        );
    }

    #[test]
    fn empty_rows_render_placeholder() {
        let table = SortableTable::new(Vec::<Value>::new(), columns()).unwrap();
        assert_eq!(table.render(), TableView::Empty(DEFAULT_EMPTY_MESSAGE.to_string()));
        let table = table.with_empty_message("Sin pacientes");
        assert_eq!(table.render(), TableView::Empty("Sin pacientes".to_string()));
    }

    #[test]
    fn missing_values_show_placeholder() {
        let rows = vec![json!({"record_id": 1, "edad": null}), json!({"record_id": 2, "edad": ""})];
        let TableView::Rows(rendered) = SortableTable::new(rows, columns()).unwrap().render() else {
            panic!("expected rows");
        };
        assert_eq!(rendered.column_text(1), ["N/A", "N/A"]);
        assert_eq!(rendered.column_text(2), ["N/A", "N/A"]);
        assert_eq!(rendered.rows[0].cells[1].kind, CellKind::Missing);
    }

    #[test]
    fn renderer_failure_is_isolated_to_its_cell() {
        let columns = vec![
            Column::new("record_id", "ID"),
            Column::new("edad", "Edad").with_renderer(|value: &Value, _row: &Value| {
                value
                    .as_f64()
                    .map(|age| format!("{age:.0} años"))
                    .ok_or_else(|| RenderError::new("age is not numeric"))
            }),
        ];
        let rows = vec![json!({"record_id": 1, "edad": 45}), json!({"record_id": 2, "edad": "?"})];
        let TableView::Rows(rendered) = SortableTable::new(rows, columns).unwrap().render() else {
            panic!("expected rows");
        };
        assert_eq!(rendered.column_text(0), ["1", "2"]);
        assert_eq!(rendered.column_text(1), ["45 años", "Error"]);
        assert_eq!(rendered.rows[1].cells[1].kind, CellKind::Error);
    }

    #[test]
    fn panicking_renderer_is_isolated_to_its_cell() {
        let columns = vec![
            Column::new("record_id", "ID"),
            Column::new("exon", "Exón").with_renderer(|value: &Value, _row: &Value| {
                let exon = value.as_i64().unwrap();
                Ok(format!("Exón {exon}"))
            }),
        ];
        let rows = vec![json!({"record_id": 1, "exon": 4}), json!({"record_id": 2})];
        let TableView::Rows(rendered) = SortableTable::new(rows, columns).unwrap().render() else {
            panic!("expected rows");
        };
        assert_eq!(rendered.column_text(1), ["Exón 4", "Error"]);
        assert_eq!(rendered.rows[1].cells[1].kind, CellKind::Error);
    }

    #[test]
    fn row_keys_prefer_record_id_then_id_then_position() {
        let rows = vec![
            json!({"record_id": "CAD-1", "id": 9}),
            json!({"id": 9}),
            json!({"edad": 30}),
        ];
        let TableView::Rows(rendered) = SortableTable::new(rows, columns()).unwrap().render() else {
            panic!("expected rows");
        };
        assert_eq!(rendered.row_keys(), ["row-CAD-1", "row-9", "row-2"]);
    }

    #[test]
    fn headers_show_sort_indicator() {
        let rows = vec![json!({"record_id": 1, "edad": 30})];
        let mut table = SortableTable::new(rows, columns()).unwrap();
        table.click("edad");
        table.click("acciones");
        assert_eq!(table.sort_state(), &SortState::Ascending("edad".to_string()));
        let TableView::Rows(rendered) = table.render() else {
            panic!("expected rows");
        };
        let headers: Vec<String> = rendered.headers.iter().map(HeaderCell::display).collect();
        assert_eq!(headers, ["ID ⇅", "Edad ▲", "Acciones"]);
    }

    #[test]
    fn integral_floats_display_without_fraction() {
        assert_eq!(display_value(&json!(54.0)), Some("54".to_string()));
        assert_eq!(display_value(&json!(27.5)), Some("27.5".to_string()));
        assert_eq!(display_value(&json!(true)), Some("true".to_string()));
    }
}
