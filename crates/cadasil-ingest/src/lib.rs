//! Loading registry snapshots.
//!
//! Every source yields [`RawRecord`]s which [`build_snapshot`] turns into
//! typed [`PatientRecord`]s. [`load_snapshot`] is the boundary where source
//! failures are logged and degrade to an empty snapshot.
//!
//! [`RawRecord`]: cadasil_model::RawRecord
//! [`PatientRecord`]: cadasil_model::PatientRecord

pub mod delimited;
pub mod error;
pub mod redcap;
pub mod snapshot;
pub mod source;
pub mod supabase;

pub use delimited::{
    DELIMITER_CANDIDATES, DelimitedTable, guess_delimiter, parse_delimited, read_delimited_file,
};
pub use error::{IngestError, Result};
pub use redcap::{RedcapClient, RedcapField, RedcapSettings};
pub use snapshot::{Origin, Snapshot, build_snapshot, snapshot_from_upload};
pub use source::{DelimitedFileSource, RecordSource, load_snapshot};
pub use supabase::{DEFAULT_TABLE, SupabaseClient, SupabaseSettings};
