//! Registry snapshots built from raw rows.

use std::fmt;

use cadasil_model::{
    PatientRecord, RECORD_ID_FIELD, REPEAT_INSTRUMENT_FIELD, RawRecord, UNREPORTED_GENETIC_RESULT,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::delimited::parse_delimited;
use crate::error::{IngestError, Result};

/// Where a snapshot's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Redcap,
    Supabase,
    DelimitedFile,
    /// A delimited export supplied by the user during the session.
    Upload,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Redcap => "REDCap",
            Self::Supabase => "Supabase",
            Self::DelimitedFile => "delimited file",
            Self::Upload => "upload",
        })
    }
}

/// The full set of records loaded for a session. Replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub origin: Origin,
    pub records: Vec<PatientRecord>,
    /// Rows dropped at load: repeat-instrument rows and rows without an id.
    pub discarded: usize,
}

impl Snapshot {
    pub fn empty(origin: Origin) -> Self {
        Self {
            origin,
            records: Vec::new(),
            discarded: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Converts raw rows into patient records.
///
/// Rows that belong to a repeating instrument, or that have no usable
/// `record_id`, are discarded. Uploaded rows without a genetic result are
/// marked as pending.
pub fn build_snapshot(rows: Vec<RawRecord>, origin: Origin) -> Snapshot {
    let total = rows.len();
    let records: Vec<PatientRecord> = rows
        .iter()
        .filter(|row| is_main_record(row))
        .filter_map(|row| PatientRecord::from_fields(row).ok())
        .map(|mut record| {
            if origin == Origin::Upload && record.genetic_result.is_none() {
                record.genetic_result = Some(UNREPORTED_GENETIC_RESULT.to_string());
            }
            record
        })
        .collect();
    let discarded = total - records.len();
    debug!(%origin, total, discarded, "built registry snapshot");
    Snapshot {
        origin,
        records,
        discarded,
    }
}

/// Parses an uploaded export into a snapshot.
///
/// Unlike remote sources, upload failures are returned to the caller so the
/// current snapshot can be kept.
pub fn snapshot_from_upload(text: &str) -> Result<Snapshot> {
    let table = parse_delimited(text)?;
    if table.headers.is_empty() {
        return Err(IngestError::EmptyInput {
            origin: Origin::Upload.to_string(),
        });
    }
    if !table.has_column(RECORD_ID_FIELD) {
        return Err(IngestError::MissingColumn {
            column: RECORD_ID_FIELD.to_string(),
            origin: Origin::Upload.to_string(),
        });
    }
    let snapshot = build_snapshot(table.rows, Origin::Upload);
    info!(
        records = snapshot.len(),
        discarded = snapshot.discarded,
        "processed uploaded export"
    );
    Ok(snapshot)
}

fn is_main_record(row: &RawRecord) -> bool {
    let repeated = row
        .get(REPEAT_INSTRUMENT_FIELD)
        .is_some_and(|value| value.is_populated());
    let identified = row
        .get(RECORD_ID_FIELD)
        .is_some_and(|value| value.is_populated());
    !repeated && identified
}
