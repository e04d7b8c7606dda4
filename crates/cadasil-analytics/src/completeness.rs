//! Per-record data completeness scoring.
//!
//! Each record is scored against two field sets. The critical set covers the
//! answers every registry entry needs; the secondary set covers follow-up
//! details. A field counts when [`FieldValue::is_populated`] holds for it.
//!
//! [`FieldValue::is_populated`]: cadasil_model::FieldValue::is_populated

use std::fmt;

use cadasil_model::PatientRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::summary::percentage;

pub const CRITICAL_FIELDS: [&str; 9] = [
    "nombre_apellido",
    "sexo",
    "fecha_nacimiento",
    "provincia",
    "sintoma_inicial",
    "edad_inicio",
    "metodo_diagnostico",
    "antecedentes_familiares",
    "resultado_genetico",
];

pub const SECONDARY_FIELDS: [&str; 10] = [
    "medico_derivante",
    "institucion",
    "historia_clinica",
    "ciudad",
    "dominancia",
    "escolaridad",
    "diagnostico_inicial",
    "exon",
    "valor_mmse_moca1",
    "fecha_acv_1",
];

/// The field names scored for completeness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSets {
    pub critical: Vec<String>,
    pub secondary: Vec<String>,
}

impl FieldSets {
    pub fn new<C, S>(critical: C, secondary: S) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            critical: critical.into_iter().map(Into::into).collect(),
            secondary: secondary.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for FieldSets {
    fn default() -> Self {
        Self::new(CRITICAL_FIELDS, SECONDARY_FIELDS)
    }
}

/// Completeness bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionLevel {
    High,
    Medium,
    Low,
}

impl CompletionLevel {
    pub const HIGH_THRESHOLD: f64 = 80.0;
    pub const MEDIUM_THRESHOLD: f64 = 50.0;

    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= Self::HIGH_THRESHOLD {
            Self::High
        } else if percentage >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "Completo",
            Self::Medium => "Parcial",
            Self::Low => "Incompleto",
        }
    }
}

impl fmt::Display for CompletionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletenessScore {
    pub critical_complete: usize,
    pub critical_total: usize,
    pub critical_percentage: f64,
    pub secondary_complete: usize,
    pub secondary_total: usize,
    pub secondary_percentage: f64,
    /// Populated fields over all scored fields, both sets pooled.
    pub overall_percentage: f64,
    pub level: CompletionLevel,
}

impl CompletenessScore {
    pub fn for_record(record: &PatientRecord, fields: &FieldSets) -> Self {
        let critical_complete = populated_count(record, &fields.critical);
        let secondary_complete = populated_count(record, &fields.secondary);
        let critical_total = fields.critical.len();
        let secondary_total = fields.secondary.len();
        let overall_percentage = percentage(
            critical_complete + secondary_complete,
            critical_total + secondary_total,
        );
        Self {
            critical_complete,
            critical_total,
            critical_percentage: percentage(critical_complete, critical_total),
            secondary_complete,
            secondary_total,
            secondary_percentage: percentage(secondary_complete, secondary_total),
            overall_percentage,
            level: CompletionLevel::from_percentage(overall_percentage),
        }
    }
}

fn populated_count(record: &PatientRecord, names: &[String]) -> usize {
    names
        .iter()
        .filter(|name| record.field(name).is_populated())
        .count()
}

/// A record paired with its completeness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: PatientRecord,
    pub score: CompletenessScore,
}

/// Scores every record against the default field sets, least complete first.
pub fn score_completeness(records: &[PatientRecord]) -> Vec<ScoredRecord> {
    score_completeness_with(records, &FieldSets::default())
}

/// Scores every record against `fields`, least complete first.
///
/// Records with equal scores keep their input order.
pub fn score_completeness_with(records: &[PatientRecord], fields: &FieldSets) -> Vec<ScoredRecord> {
    let mut scored: Vec<ScoredRecord> = records
        .iter()
        .map(|record| ScoredRecord {
            record: record.clone(),
            score: CompletenessScore::for_record(record, fields),
        })
        .collect();
    scored.sort_by(|a, b| {
        a.score
            .overall_percentage
            .total_cmp(&b.score.overall_percentage)
    });
    debug!(
        records = scored.len(),
        critical_fields = fields.critical.len(),
        secondary_fields = fields.secondary.len(),
        "scored record completeness"
    );
    scored
}

/// Record counts per completeness level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessOverview {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl CompletenessOverview {
    pub fn from_scored(scored: &[ScoredRecord]) -> Self {
        let mut overview = Self {
            total: scored.len(),
            ..Self::default()
        };
        for entry in scored {
            match entry.score.level {
                CompletionLevel::High => overview.high += 1,
                CompletionLevel::Medium => overview.medium += 1,
                CompletionLevel::Low => overview.low += 1,
            }
        }
        overview
    }

    pub fn count(&self, level: CompletionLevel) -> usize {
        match level {
            CompletionLevel::High => self.high,
            CompletionLevel::Medium => self.medium,
            CompletionLevel::Low => self.low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_exact() {
        assert_eq!(CompletionLevel::from_percentage(80.0), CompletionLevel::High);
        assert_eq!(CompletionLevel::from_percentage(79.999), CompletionLevel::Medium);
        assert_eq!(CompletionLevel::from_percentage(50.0), CompletionLevel::Medium);
        assert_eq!(CompletionLevel::from_percentage(49.99), CompletionLevel::Low);
        assert_eq!(CompletionLevel::from_percentage(0.0), CompletionLevel::Low);
    }

    #[test]
    fn zero_codes_do_not_count_as_answered() {
        let record = PatientRecord::new(1_i64)
            .with_field("sexo", 1_i64)
            .with_field("antecedentes_familiares", 0_i64)
            .with_field("nombre_apellido", "");
        let score = CompletenessScore::for_record(&record, &FieldSets::default());
        assert_eq!(score.critical_complete, 1);
        assert_eq!(score.critical_total, 9);
        assert_eq!(score.secondary_complete, 0);
        assert_eq!(score.secondary_total, 10);
    }

    #[test]
    fn zero_and_blank_text_fields_are_missing() {
        let record = PatientRecord::new(1_i64)
            .with_field("historia_clinica", 0_i64)
            .with_field("ciudad", "   ")
            .with_field("fecha_acv_1", 0.0)
            .with_field("institucion", "Hospital de Clínicas");
        assert_eq!(record.medical_record, None);
        let score = CompletenessScore::for_record(&record, &FieldSets::default());
        assert_eq!(score.secondary_complete, 1);
    }

    #[test]
    fn overall_pools_both_sets() {
        let fields = FieldSets::new(["sexo", "provincia"], ["ciudad", "exon", "dominancia"]);
        let record = PatientRecord::new(1_i64)
            .with_field("sexo", 2_i64)
            .with_field("provincia", 5_i64)
            .with_field("ciudad", "Rosario")
            .with_field("exon", 4_i64);
        let score = CompletenessScore::for_record(&record, &fields);
        assert_eq!(score.critical_percentage, 100.0);
        assert!((score.secondary_percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(score.overall_percentage, 80.0);
        assert_eq!(score.level, CompletionLevel::High);
    }

    #[test]
    fn empty_field_sets_score_zero() {
        let fields = FieldSets::new(Vec::<String>::new(), Vec::<String>::new());
        let score = CompletenessScore::for_record(&PatientRecord::new(1_i64), &fields);
        assert_eq!(score.overall_percentage, 0.0);
        assert_eq!(score.level, CompletionLevel::Low);
    }

    #[test]
    fn sorted_worst_first_and_stable() {
        let complete = PatientRecord::new(1_i64)
            .with_field("sexo", 1_i64)
            .with_field("provincia", 1_i64);
        let blank_a = PatientRecord::new(2_i64);
        let blank_b = PatientRecord::new(3_i64);
        let scored = score_completeness(&[complete, blank_a, blank_b]);
        let ids: Vec<String> = scored
            .iter()
            .map(|entry| entry.record.record_id.to_string())
            .collect();
        assert_eq!(ids, ["2", "3", "1"]);

        let overview = CompletenessOverview::from_scored(&scored);
        assert_eq!(overview.total, 3);
        assert_eq!(overview.count(CompletionLevel::Low), 3);
    }
}
