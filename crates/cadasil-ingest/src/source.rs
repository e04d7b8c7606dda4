//! The "fetch all records" capability and the loader boundary.

use std::path::{Path, PathBuf};

use cadasil_model::{FieldValue, RawRecord};
use serde_json::Value;
use tracing::{info, info_span, warn};

use crate::delimited::read_delimited_file;
use crate::error::{IngestError, Result};
use crate::snapshot::{Origin, Snapshot, build_snapshot};

/// A data source that can return every registry row at once.
pub trait RecordSource {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn origin(&self) -> Origin;

    fn fetch_records(&self) -> Result<Vec<RawRecord>>;
}

/// Loads a snapshot from `source`.
///
/// Source failures (unconfigured credentials, network errors, non-success
/// responses, unreadable files) are logged and produce an empty snapshot,
/// so callers always get something to summarize.
pub fn load_snapshot<S: RecordSource + ?Sized>(source: &S) -> Snapshot {
    let span = info_span!("load_snapshot", source = source.name());
    let _guard = span.enter();
    match source.fetch_records() {
        Ok(rows) => {
            let snapshot = build_snapshot(rows, source.origin());
            info!(
                records = snapshot.len(),
                discarded = snapshot.discarded,
                "loaded registry snapshot"
            );
            snapshot
        }
        Err(error) => {
            warn!(%error, "data source unavailable, continuing with no records");
            Snapshot::empty(source.origin())
        }
    }
}

/// A delimited export on disk.
#[derive(Debug, Clone)]
pub struct DelimitedFileSource {
    path: PathBuf,
}

impl DelimitedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for DelimitedFileSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn origin(&self) -> Origin {
        Origin::DelimitedFile
    }

    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        Ok(read_delimited_file(&self.path)?.rows)
    }
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn origin(&self) -> Origin {
        (**self).origin()
    }

    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        (**self).fetch_records()
    }
}

/// Converts a JSON array of flat objects into raw rows.
pub(crate) fn rows_from_json(body: Value, service: &'static str) -> Result<Vec<RawRecord>> {
    let Value::Array(items) = body else {
        return Err(IngestError::Decode {
            service,
            message: "expected a JSON array of records".to_string(),
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(fields
                .iter()
                .map(|(name, value)| (name.clone(), FieldValue::from(value)))
                .collect()),
            _ => Err(IngestError::Decode {
                service,
                message: format!("record {index} is not an object"),
            }),
        })
        .collect()
}
