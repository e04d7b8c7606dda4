//! Cohort selection.

use cadasil_model::{FilterState, PatientRecord};
use tracing::debug;

/// Returns true when `record` satisfies every constraint in `filters`.
///
/// A missing age is treated as 0. Unknown sex codes never match a specific
/// sex; every other selector compares the raw code.
pub fn matches(record: &PatientRecord, filters: &FilterState) -> bool {
    filters.age_range.contains(record.age.unwrap_or(0.0))
        && filters.sex.accepts(record.sex().as_ref())
        && filters.province.accepts(record.province.as_ref())
        && filters.symptom.accepts(record.initial_symptom.as_ref())
        && filters.diagnosis_method.accepts(record.diagnostic_method.as_ref())
        && filters.family_history.accepts(record.family_history.as_ref())
}

/// Keeps the records that match `filters`, in their original order.
pub fn apply_filters(records: &[PatientRecord], filters: &FilterState) -> Vec<PatientRecord> {
    let filtered: Vec<PatientRecord> = records
        .iter()
        .filter(|record| matches(record, filters))
        .cloned()
        .collect();
    debug!(
        total = records.len(),
        kept = filtered.len(),
        default_filters = filters.is_default(),
        "applied cohort filters"
    );
    filtered
}
