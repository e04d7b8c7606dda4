//! Data model for the CADASIL patient registry.
//!
//! - **record**: the [`PatientRecord`] schema and its REDCap field names
//! - **codes**: fixed code tables (sex, province, diagnostic method, ...)
//! - **value**: dynamically typed [`FieldValue`]s used at the load boundary
//! - **filter**: the cohort [`FilterState`]

pub mod codes;
pub mod error;
pub mod filter;
pub mod record;
pub mod value;

pub use codes::{
    AdditionalSymptom, DiagnosticMethod, GeneticStatus, Handedness, InitialSymptom,
    PENDING_GENETIC_RESULT, PROVINCES, Sex, UNKNOWN_PROVINCE, UNREPORTED_GENETIC_RESULT,
    VascularRiskFactor, province_name, provinces,
};
pub use error::{ModelError, Result};
pub use filter::{AgeRange, FilterState, Selector};
pub use record::{PatientRecord, RECORD_ID_FIELD, REPEAT_INSTRUMENT_FIELD, RecordId};
pub use value::{FieldValue, RawRecord, format_numeric};
