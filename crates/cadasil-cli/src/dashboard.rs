//! The dashboard session: one snapshot, one filter state, one patient-table sort.

use cadasil_analytics::{
    CompletenessOverview, ScoredRecord, SnapshotComparison, Summaries, apply_filters,
    score_completeness, summarize,
};
use cadasil_ingest::{IngestError, RecordSource, Snapshot, load_snapshot, snapshot_from_upload};
use cadasil_model::{
    DiagnosticMethod, FilterState, GeneticStatus, InitialSymptom, PatientRecord, Sex,
    format_numeric, province_name,
};
use cadasil_table::{
    Alignment, Column, MISSING_PLACEHOLDER, RenderError, SortState, SortableTable, TableError,
    lookup,
};
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Message shown by the patient table when no record passes the filters.
pub const NO_PATIENTS_MESSAGE: &str = "No hay pacientes que coincidan con los filtros";

#[derive(Debug, Clone)]
pub struct Dashboard {
    snapshot: Snapshot,
    filters: FilterState,
    patient_sort: SortState,
}

impl Dashboard {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            filters: FilterState::default(),
            patient_sort: SortState::Unsorted,
        }
    }

    /// Starts a session from whatever `source` returns.
    pub fn load<S: RecordSource + ?Sized>(source: &S) -> Self {
        Self::new(load_snapshot(source))
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Replaces the snapshot with a fresh load from `source`.
    pub fn reload<S: RecordSource + ?Sized>(&mut self, source: &S) {
        self.snapshot = load_snapshot(source);
    }

    /// Replaces the snapshot with an uploaded export.
    ///
    /// On failure the current snapshot is kept and the error is returned for
    /// display.
    pub fn upload(&mut self, text: &str) -> Result<SnapshotComparison, IngestError> {
        let previous_total = self.snapshot.len();
        let snapshot = match snapshot_from_upload(text) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, kept = previous_total, "upload rejected, keeping current data");
                return Err(error);
            }
        };
        let comparison = SnapshotComparison::between(previous_total, &summarize(&snapshot.records));
        info!(
            previous = previous_total,
            current = comparison.current_total,
            "replaced snapshot with uploaded data"
        );
        self.snapshot = snapshot;
        Ok(comparison)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
    }

    pub fn filtered(&self) -> Vec<PatientRecord> {
        apply_filters(&self.snapshot.records, &self.filters)
    }

    /// Summaries of the filtered cohort.
    pub fn summaries(&self) -> Summaries {
        summarize(&self.filtered())
    }

    /// Completeness scores over the whole snapshot, least complete first.
    ///
    /// Data quality is a property of the registry, so filters do not apply.
    pub fn completeness(&self) -> Vec<ScoredRecord> {
        score_completeness(&self.snapshot.records)
    }

    pub fn completeness_overview(&self) -> CompletenessOverview {
        CompletenessOverview::from_scored(&self.completeness())
    }

    pub fn patient_sort(&self) -> &SortState {
        &self.patient_sort
    }

    /// Applies a header click to the patient table.
    pub fn click_patient_column(&mut self, key: &str) -> &SortState {
        let sortable = patient_columns()
            .iter()
            .any(|column| column.key() == key && column.is_sortable());
        self.patient_sort = std::mem::take(&mut self.patient_sort).click(key, sortable);
        &self.patient_sort
    }

    /// The filtered cohort as a sortable table, in the session's sort order.
    pub fn patient_table(&self) -> Result<SortableTable<Value>, TableError> {
        let rows: Vec<Value> = self.filtered().iter().map(patient_row).collect();
        Ok(SortableTable::new(rows, patient_columns())?
            .with_empty_message(NO_PATIENTS_MESSAGE)
            .with_sort(self.patient_sort.clone()))
    }
}

/// A record as a flat JSON object keyed by registry field names.
pub fn patient_row(record: &PatientRecord) -> Value {
    let fields: Map<String, Value> = record
        .to_fields()
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    Value::Object(fields)
}

// =============================================================================
// PATIENT TABLE COLUMNS
// =============================================================================

pub fn patient_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("record_id", "ID").emphasized(),
        Column::new("edad_ingresada", "Edad")
            .aligned(Alignment::Right)
            .with_renderer(|value, _| Ok(number(value)?.map_or_else(missing, format_numeric))),
        Column::new("sexo", "Sexo")
            .aligned(Alignment::Center)
            .with_renderer(|value, _| {
                Ok(label(code(value)?.and_then(Sex::from_code).map(Sex::short_label)))
            }),
        Column::new("provincia", "Provincia")
            .with_renderer(|value, _| Ok(label(code(value)?.and_then(province_name)))),
        Column::new("sintoma_inicial", "Síntoma Inicial").with_renderer(|value, _| {
            Ok(label(
                code(value)?
                    .and_then(InitialSymptom::from_code)
                    .map(InitialSymptom::label),
            ))
        }),
        Column::new("valor_mmse_moca1", "MMSE")
            .aligned(Alignment::Right)
            .with_renderer(|value, row| {
                let first = number(value)?.map_or_else(missing, format_numeric);
                Ok(match number(lookup(row, "valor_mmse_moca2"))? {
                    Some(second) => format!("{first} ({})", format_numeric(second)),
                    None => first,
                })
            }),
        Column::new("metodo_diagnostico", "Método Dx").with_renderer(|value, _| {
            Ok(label(
                code(value)?
                    .and_then(DiagnosticMethod::from_code)
                    .map(DiagnosticMethod::label),
            ))
        }),
        Column::new("resultado_genetico", "Resultado Genético").with_renderer(|value, _| {
            Ok(GeneticStatus::classify(value.as_str()).label().to_string())
        }),
        Column::new("exon", "Exón")
            .aligned(Alignment::Center)
            .with_renderer(|value, _| Ok(code(value)?.map_or_else(missing, |exon| exon.to_string()))),
        Column::new("antecedentes_familiares", "Ant. Familiares")
            .aligned(Alignment::Center)
            .with_renderer(|value, _| {
                Ok(match code(value)? {
                    Some(1) => "Sí".to_string(),
                    Some(0) => "No".to_string(),
                    _ => missing(),
                })
            }),
    ]
}

fn missing() -> String {
    MISSING_PLACEHOLDER.to_string()
}

fn label(text: Option<&str>) -> String {
    text.map_or_else(missing, ToString::to_string)
}

/// A populated number; zero and null count as absent.
fn number(value: &Value) -> Result<Option<f64>, RenderError> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_f64(),
        Value::String(text) if text.trim().is_empty() => return Ok(None),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(number) if number == 0.0 => Ok(None),
        Some(number) => Ok(Some(number)),
        None => Err(RenderError::new(format!("expected a number, found {value}"))),
    }
}

/// An integer registry code.
fn code(value: &Value) -> Result<Option<i64>, RenderError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| RenderError::new(format!("expected a code, found {number}"))),
        Value::Bool(flag) => Ok(Some(i64::from(*flag))),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RenderError::new(format!("expected a code, found '{text}'"))),
        other => Err(RenderError::new(format!("expected a code, found {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use cadasil_table::TableView;
    use serde_json::json;

    use super::*;

    fn render(row: Value) -> Vec<String> {
        let table = SortableTable::new(vec![row], patient_columns()).unwrap();
        let TableView::Rows(rendered) = table.render() else {
            panic!("expected rows");
        };
        rendered.rows[0].cells.iter().map(|cell| cell.text.clone()).collect()
    }

    #[test]
    fn patient_cells_use_registry_labels() {
        let cells = render(json!({
            "record_id": 7,
            "edad_ingresada": 47,
            "sexo": 2,
            "provincia": 24,
            "sintoma_inicial": 2,
            "valor_mmse_moca1": 28,
            "valor_mmse_moca2": 25,
            "metodo_diagnostico": 1,
            "resultado_genetico": "NOTCH3 c.397C>T",
            "exon": 4,
            "antecedentes_familiares": 0
        }));
        assert_eq!(
            cells,
            [
                "7",
                "47",
                "F",
                "CABA",
                "Migraña",
                "28 (25)",
                "Genético",
                "Positivo (NOTCH3)",
                "4",
                "No"
            ]
        );
    }

    #[test]
    fn missing_and_unexpected_values() {
        let cells = render(json!({"record_id": 8, "sexo": "x", "edad_ingresada": 0}));
        assert_eq!(cells[1], "N/A");
        assert_eq!(cells[2], "Error");
        assert_eq!(cells[3], "N/A");
        assert_eq!(cells[5], "N/A");
        assert_eq!(cells[7], "N/A");
    }
}
