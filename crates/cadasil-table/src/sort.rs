//! Single-column, three-state sorting.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::path::{TableRow, lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The active sort. At most one column is sorted at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortState {
    /// Original row order.
    #[default]
    Unsorted,
    Ascending(String),
    Descending(String),
}

impl SortState {
    /// Transition for a click on the header of column `key`.
    ///
    /// A different column starts ascending; the active column goes
    /// ascending → descending → unsorted. Clicks on non-sortable columns
    /// leave the state unchanged.
    #[must_use]
    pub fn click(self, key: &str, sortable: bool) -> Self {
        if !sortable {
            return self;
        }
        match self {
            Self::Ascending(active) if active == key => Self::Descending(active),
            Self::Descending(active) if active == key => Self::Unsorted,
            _ => Self::Ascending(key.to_string()),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Unsorted => None,
            Self::Ascending(key) | Self::Descending(key) => Some(key),
        }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            Self::Unsorted => None,
            Self::Ascending(_) => Some(SortDirection::Ascending),
            Self::Descending(_) => Some(SortDirection::Descending),
        }
    }

    /// Direction applied to `key`, if it is the active column.
    pub fn direction_for(&self, key: &str) -> Option<SortDirection> {
        self.key()
            .filter(|active| *active == key)
            .and_then(|_| self.direction())
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsorted => f.write_str("unsorted"),
            Self::Ascending(key) => write!(f, "{key} ascending"),
            Self::Descending(key) => write!(f, "{key} descending"),
        }
    }
}

/// Orders two non-null cell values.
///
/// Values that read as finite numbers (JSON numbers or numeric strings)
/// compare numerically and sort before all other values. Anything else
/// compares as text, case-insensitively with accents folded, then by
/// lowercase text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(&text(a), &text(b)),
    }
}

/// Rows in display order for `state`. The input order is never modified.
///
/// Null values sort last in both directions. The sort is stable, so rows
/// with equal values keep their relative input order.
pub fn sort_rows<'a, R: TableRow>(rows: &'a [R], state: &SortState) -> Vec<&'a R> {
    let mut ordered: Vec<&R> = rows.iter().collect();
    let (Some(key), Some(direction)) = (state.key(), state.direction()) else {
        return ordered;
    };
    ordered.sort_by(|a, b| {
        let left = lookup(*a, key);
        let right = lookup(*b, key);
        match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = compare_values(left, right);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
        }
    });
    ordered
}

fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) if !text.trim().is_empty() => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let left = a.to_lowercase();
    let right = b.to_lowercase();
    fold_accents(&left)
        .cmp(&fold_accents(&right))
        .then_with(|| left.cmp(&right))
}

fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
