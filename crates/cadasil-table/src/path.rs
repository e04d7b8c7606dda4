//! Row access by dotted field path.

use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// A row the table can display: a record addressable by field name.
pub trait TableRow {
    /// Value of the top-level field `key`, if present.
    fn field(&self, key: &str) -> Option<&Value>;

    /// Whether this row is a record at all.
    fn is_record(&self) -> bool;
}

impl TableRow for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    fn is_record(&self) -> bool {
        self.is_object()
    }
}

impl TableRow for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn is_record(&self) -> bool {
        true
    }
}

/// Resolves a dot-separated path such as `"address.city"` or `"scores.0"`.
///
/// Objects are walked by key and arrays by index. Any missing segment, or a
/// segment applied to a scalar, yields `Value::Null`.
pub fn lookup<'a, R: TableRow + ?Sized>(row: &'a R, path: &str) -> &'a Value {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return &NULL;
    };
    let Some(mut current) = row.field(first) else {
        return &NULL;
    };
    for segment in segments {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return &NULL,
        }
    }
    current
}
