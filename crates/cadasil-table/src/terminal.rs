//! Terminal rendering through comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::column::Alignment;
use crate::table::{CellKind, HeaderCell, RenderedCell, RenderedTable, SortIndicator, TableView};

pub fn to_comfy_table(rendered: &RenderedTable) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(rendered.headers.iter().map(header_cell));
    for row in &rendered.rows {
        table.add_row(row.cells.iter().map(body_cell));
    }
    table
}

impl TableView {
    /// Text for a terminal: the table itself, or the placeholder message.
    pub fn to_terminal(&self) -> String {
        match self {
            Self::Empty(message) => message.clone(),
            Self::Rows(rendered) => to_comfy_table(rendered).to_string(),
        }
    }
}

fn header_cell(header: &HeaderCell) -> Cell {
    let cell = Cell::new(header.display()).add_attribute(Attribute::Bold);
    match header.indicator {
        SortIndicator::Ascending | SortIndicator::Descending => cell.fg(Color::Green),
        SortIndicator::Inactive | SortIndicator::Fixed => cell.fg(Color::Cyan),
    }
}

fn body_cell(rendered: &RenderedCell) -> Cell {
    let mut cell = Cell::new(&rendered.text).set_alignment(match rendered.style.alignment {
        Alignment::Left => CellAlignment::Left,
        Alignment::Center => CellAlignment::Center,
        Alignment::Right => CellAlignment::Right,
    });
    if rendered.style.emphasis {
        cell = cell.add_attribute(Attribute::Bold);
    }
    match rendered.kind {
        CellKind::Value => cell,
        CellKind::Missing => cell.fg(Color::DarkGrey),
        CellKind::Error => cell.fg(Color::Red),
    }
}
