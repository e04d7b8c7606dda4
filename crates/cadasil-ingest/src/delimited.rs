//! Delimited-text exports (CSV, TSV and friends).

use std::fs;
use std::path::Path;

use cadasil_model::{FieldValue, RawRecord};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Delimiters tried when guessing, in order of preference.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b'\t', b'|', b';'];

/// Header names and dynamically typed rows of a delimited export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl DelimitedTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|header| header == name)
    }
}

/// Picks the candidate delimiter that occurs most often in the header line.
///
/// Ties go to the earlier candidate; a line with none of them is comma
/// separated.
pub fn guess_delimiter(text: &str) -> u8 {
    let Some(header) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };
    let mut best = (b',', 0usize);
    for candidate in DELIMITER_CANDIDATES {
        let count = header.bytes().filter(|byte| *byte == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Parses delimited text whose first non-blank row is the header.
pub fn parse_delimited(text: &str) -> Result<DelimitedTable> {
    parse_with_origin(text, "delimited text")
}

/// Reads and parses a delimited export from disk.
pub fn read_delimited_file(path: &Path) -> Result<DelimitedTable> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with_origin(&text, &path.display().to_string())
}

fn parse_with_origin(text: &str, origin: &str) -> Result<DelimitedTable> {
    let delimiter = guess_delimiter(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = loop {
        let Some(record) = records.next() else {
            debug!(origin, "delimited text has no header row");
            return Ok(DelimitedTable::default());
        };
        let record = record.map_err(|error| parse_error(origin, &error))?;
        if !is_blank(&record) {
            break record.iter().map(normalize_header).collect();
        }
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|error| parse_error(origin, &error))?;
        if is_blank(&record) {
            continue;
        }
        let row: RawRecord = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(index, name)| {
                let value = record.get(index).map_or(FieldValue::Null, FieldValue::parse);
                (name.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    debug!(
        origin,
        delimiter = %char::from(delimiter).escape_default(),
        columns = headers.len(),
        rows = rows.len(),
        "parsed delimited text"
    );
    Ok(DelimitedTable { headers, rows })
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

fn parse_error(origin: &str, error: &csv::Error) -> IngestError {
    IngestError::Parse {
        origin: origin.to_string(),
        message: error.to_string(),
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_most_frequent_delimiter() {
        assert_eq!(guess_delimiter("record_id;sexo;edad_ingresada\n1;1;25"), b';');
        assert_eq!(guess_delimiter("record_id\tsexo\n1\t2"), b'\t');
        assert_eq!(guess_delimiter("\n\nrecord_id|sexo\n"), b'|');
        assert_eq!(guess_delimiter("record_id"), b',');
        assert_eq!(guess_delimiter(""), b',');
    }

    #[test]
    fn parses_header_and_typed_cells() {
        let text = "\u{feff}record_id, nombre_apellido ,edad_ingresada,resultado_genetico\n\
                    1,Ana Pérez,47,\"Positivo, pendiente conseguir\"\n\
                    \n\
                    2,Juan Gómez,,\n";
        let table = parse_delimited(text).unwrap();
        assert_eq!(
            table.headers,
            ["record_id", "nombre_apellido", "edad_ingresada", "resultado_genetico"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["record_id"], FieldValue::Int(1));
        assert_eq!(table.rows[0]["edad_ingresada"], FieldValue::Int(47));
        assert_eq!(
            table.rows[0]["resultado_genetico"],
            FieldValue::Text("Positivo, pendiente conseguir".to_string())
        );
        assert_eq!(table.rows[1]["edad_ingresada"], FieldValue::Null);
    }

    #[test]
    fn short_rows_fill_with_null() {
        let table = parse_delimited("record_id;sexo;provincia\n7;2\n").unwrap();
        assert_eq!(table.rows[0]["sexo"], FieldValue::Int(2));
        assert_eq!(table.rows[0]["provincia"], FieldValue::Null);
    }

    #[test]
    fn empty_text_has_no_headers() {
        let table = parse_delimited("  \n\n").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }
}
