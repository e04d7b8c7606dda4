//! Grouped statistics over a filtered cohort.

use cadasil_model::{
    AdditionalSymptom, DiagnosticMethod, Handedness, PENDING_GENETIC_RESULT, PatientRecord,
    RecordId, UNKNOWN_PROVINCE, VascularRiskFactor,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distribution::Distribution;

/// Label for records with no additional symptom flagged.
pub const NO_SPECIFIC_SYMPTOMS: &str = "Sin síntomas específicos";

/// Maximum number of symptom combinations reported.
const SYMPTOM_COMBINATION_LIMIT: usize = 10;

/// An inclusive age band. `max` is `None` for the open upper band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBand {
    pub label: &'static str,
    pub min: f64,
    pub max: Option<f64>,
}

impl AgeBand {
    pub fn contains(&self, age: f64) -> bool {
        age >= self.min && self.max.is_none_or(|max| age <= max)
    }
}

/// Fixed registry age bands. Ages below 18 fall in none of them.
pub const AGE_BANDS: [AgeBand; 5] = [
    AgeBand {
        label: "18-30",
        min: 18.0,
        max: Some(30.0),
    },
    AgeBand {
        label: "31-40",
        min: 31.0,
        max: Some(40.0),
    },
    AgeBand {
        label: "41-50",
        min: 41.0,
        max: Some(50.0),
    },
    AgeBand {
        label: "51-60",
        min: 51.0,
        max: Some(60.0),
    },
    AgeBand {
        label: "61+",
        min: 61.0,
        max: None,
    },
];

/// Count and share of one vascular risk factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorShare {
    pub label: String,
    pub count: usize,
    /// Percentage of the cohort, 0 for an empty cohort.
    pub percentage: f64,
}

/// Cohort split by how the diagnosis was confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneticConfirmation {
    pub total: usize,
    pub genetic: usize,
    pub skin_biopsy: usize,
    pub clinical: usize,
}

impl GeneticConfirmation {
    /// Share of the cohort confirmed genetically, 0 for an empty cohort.
    pub fn genetic_percentage(&self) -> f64 {
        percentage(self.genetic, self.total)
    }
}

/// One patient in the cognitive-progression series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitivePoint {
    pub record_id: RecordId,
    pub age: f64,
    pub first_score: f64,
    pub second_score: Option<f64>,
    /// `first_score - second_score` when a follow-up exists, else 0.
    pub decline: f64,
}

/// Youngest and oldest positive age in the cohort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgeSpan {
    pub min: f64,
    pub max: f64,
}

/// Everything the dashboard shows for a cohort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summaries {
    pub total: usize,
    /// Mean over positive ages, 0 when there are none.
    pub mean_age: f64,
    /// Mean over positive first cognitive scores, 0 when there are none.
    pub mean_first_score: f64,
    pub age_span: AgeSpan,
    pub sex: Distribution,
    pub province: Distribution,
    pub age_groups: Distribution,
    pub handedness: Distribution,
    pub exon: Distribution,
    pub symptom_combinations: Distribution,
    pub vascular_risk_factors: Vec<RiskFactorShare>,
    pub genetic_confirmation: GeneticConfirmation,
    pub cognitive_progression: Vec<CognitivePoint>,
}

/// Computes every summary dimension over an already filtered cohort.
pub fn summarize(records: &[PatientRecord]) -> Summaries {
    let total = records.len();
    let positive_ages: Vec<f64> = records
        .iter()
        .filter_map(|record| record.age)
        .filter(|age| *age > 0.0)
        .collect();
    let positive_scores: Vec<f64> = records
        .iter()
        .filter_map(|record| record.first_cognitive_score)
        .filter(|score| *score > 0.0)
        .collect();

    let summaries = Summaries {
        total,
        mean_age: mean(&positive_ages),
        mean_first_score: mean(&positive_scores),
        age_span: age_span(&positive_ages),
        sex: records.iter().map(PatientRecord::sex_label).collect(),
        province: province_distribution(records),
        age_groups: age_group_distribution(records),
        handedness: records
            .iter()
            .map(|record| {
                record
                    .handedness()
                    .map_or(Handedness::UNKNOWN_LABEL, Handedness::label)
            })
            .collect(),
        exon: exon_distribution(records),
        symptom_combinations: symptom_combinations(records),
        vascular_risk_factors: risk_factor_shares(records),
        genetic_confirmation: genetic_confirmation(records),
        cognitive_progression: cognitive_progression(records),
    };
    debug!(
        total,
        provinces = summaries.province.len(),
        progression_points = summaries.cognitive_progression.len(),
        "summarized cohort"
    );
    summaries
}

fn province_distribution(records: &[PatientRecord]) -> Distribution {
    records
        .iter()
        .map(|record| record.province_name().unwrap_or(UNKNOWN_PROVINCE))
        .collect::<Distribution>()
        .sorted_by_count()
}

fn age_group_distribution(records: &[PatientRecord]) -> Distribution {
    let mut groups = Distribution::with_labels(AGE_BANDS.iter().map(|band| band.label));
    for age in records.iter().filter_map(|record| record.age) {
        if let Some(band) = AGE_BANDS.iter().find(|band| band.contains(age)) {
            groups.add(band.label);
        }
    }
    groups
}

fn exon_distribution(records: &[PatientRecord]) -> Distribution {
    records
        .iter()
        .filter(|record| {
            record
                .genetic_result
                .as_deref()
                .is_some_and(|result| !result.is_empty() && result != PENDING_GENETIC_RESULT)
        })
        .map(|record| match record.exon {
            Some(exon) if exon != 0 => format!("Exón {exon}"),
            _ => "Exón Desconocido".to_string(),
        })
        .collect()
}

fn symptom_combinations(records: &[PatientRecord]) -> Distribution {
    records
        .iter()
        .map(|record| {
            let labels: Vec<&str> = AdditionalSymptom::ALL
                .into_iter()
                .filter(|symptom| record.has_symptom(*symptom))
                .map(AdditionalSymptom::label)
                .collect();
            if labels.is_empty() {
                NO_SPECIFIC_SYMPTOMS.to_string()
            } else {
                labels.join(" + ")
            }
        })
        .collect::<Distribution>()
        .sorted_by_count()
        .truncated(SYMPTOM_COMBINATION_LIMIT)
}

fn risk_factor_shares(records: &[PatientRecord]) -> Vec<RiskFactorShare> {
    VascularRiskFactor::ALL
        .into_iter()
        .map(|factor| {
            let count = records
                .iter()
                .filter(|record| record.has_risk_factor(factor))
                .count();
            RiskFactorShare {
                label: factor.label().to_string(),
                count,
                percentage: percentage(count, records.len()),
            }
        })
        .collect()
}

fn genetic_confirmation(records: &[PatientRecord]) -> GeneticConfirmation {
    let mut confirmation = GeneticConfirmation {
        total: records.len(),
        ..GeneticConfirmation::default()
    };
    for method in records.iter().filter_map(PatientRecord::diagnostic_method) {
        match method {
            DiagnosticMethod::Genetic => confirmation.genetic += 1,
            DiagnosticMethod::SkinBiopsy => confirmation.skin_biopsy += 1,
            DiagnosticMethod::Clinical => confirmation.clinical += 1,
        }
    }
    confirmation
}

fn cognitive_progression(records: &[PatientRecord]) -> Vec<CognitivePoint> {
    records
        .iter()
        .filter_map(|record| {
            let age = record.age.filter(|age| *age != 0.0)?;
            let first_score = record.first_cognitive_score.filter(|score| *score != 0.0)?;
            let second_score = record.second_cognitive_score.filter(|score| *score != 0.0);
            Some(CognitivePoint {
                record_id: record.record_id.clone(),
                age,
                first_score,
                second_score,
                decline: second_score.map_or(0.0, |second| first_score - second),
            })
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn age_span(ages: &[f64]) -> AgeSpan {
    let Some(first) = ages.first() else {
        return AgeSpan::default();
    };
    ages.iter().fold(
        AgeSpan {
            min: *first,
            max: *first,
        },
        |span, age| AgeSpan {
            min: span.min.min(*age),
            max: span.max.max(*age),
        },
    )
}

pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: i64) -> PatientRecord {
        PatientRecord::new(id)
    }

    #[test]
    fn age_bands_use_inclusive_integer_bounds() {
        let ages = [17.0, 18.0, 30.0, 30.5, 31.0, 60.0, 61.0, 88.0];
        let records: Vec<PatientRecord> = ages
            .iter()
            .zip(1_i64..)
            .map(|(age, id)| {
                let mut record = patient(id);
                record.age = Some(*age);
                record
            })
            .collect();
        let groups = summarize(&records).age_groups;
        assert_eq!(groups.count("18-30"), 2);
        assert_eq!(groups.count("31-40"), 1);
        assert_eq!(groups.count("41-50"), 0);
        assert_eq!(groups.count("51-60"), 1);
        assert_eq!(groups.count("61+"), 2);
        // 17 and 30.5 fall between bands
        assert_eq!(groups.total(), 6);
        assert_eq!(groups.len(), 5);
    }

    #[test]
    fn exon_skips_pending_and_missing_results() {
        let mut confirmed = patient(1);
        confirmed.genetic_result = Some("NM_000435.3(NOTCH3):c.397C>T".to_string());
        confirmed.exon = Some(4);
        let mut unknown_exon = patient(2);
        unknown_exon.genetic_result = Some("Pendiente".to_string());
        let mut pending = patient(3);
        pending.genetic_result = Some(PENDING_GENETIC_RESULT.to_string());
        pending.exon = Some(4);
        let untested = patient(4);

        let exon = summarize(&[confirmed, unknown_exon, pending, untested]).exon;
        assert_eq!(exon.count("Exón 4"), 1);
        assert_eq!(exon.count("Exón Desconocido"), 1);
        assert_eq!(exon.total(), 2);
    }

    #[test]
    fn symptom_combinations_follow_flag_order() {
        let mut both = patient(1);
        both.additional_symptoms[1] = Some(true);
        both.additional_symptoms[0] = Some(true);
        let mut none = patient(2);
        none.additional_symptoms[0] = Some(false);
        let combos = summarize(&[none, both.clone(), both]).symptom_combinations;
        assert_eq!(combos.buckets()[0].label, "ACV + Migraña");
        assert_eq!(combos.buckets()[0].count, 2);
        assert_eq!(combos.count(NO_SPECIFIC_SYMPTOMS), 1);
    }

    #[test]
    fn symptom_combinations_keep_top_ten() {
        let records: Vec<PatientRecord> = (0..32_i64)
            .map(|id| {
                let mut record = patient(id);
                for (bit, flag) in record.additional_symptoms.iter_mut().enumerate() {
                    *flag = Some(id & (1 << bit) != 0);
                }
                record
            })
            .collect();
        let combos = summarize(&records).symptom_combinations;
        assert_eq!(combos.len(), 10);
        assert_eq!(combos.buckets()[0].label, NO_SPECIFIC_SYMPTOMS);
    }

    #[test]
    fn empty_cohort_has_zero_shares() {
        let summaries = summarize(&[]);
        assert_eq!(summaries.total, 0);
        assert_eq!(summaries.mean_age, 0.0);
        assert_eq!(summaries.mean_first_score, 0.0);
        assert_eq!(summaries.vascular_risk_factors.len(), 5);
        assert!(
            summaries
                .vascular_risk_factors
                .iter()
                .all(|share| share.percentage == 0.0)
        );
        assert_eq!(summaries.genetic_confirmation.genetic_percentage(), 0.0);
        assert_eq!(summaries.age_groups.total(), 0);
    }

    #[test]
    fn cognitive_progression_treats_zero_follow_up_as_missing() {
        let mut declining = patient(1);
        declining.age = Some(52.0);
        declining.first_cognitive_score = Some(24.0);
        declining.second_cognitive_score = Some(16.0);
        let mut zero_follow_up = patient(2);
        zero_follow_up.age = Some(40.0);
        zero_follow_up.first_cognitive_score = Some(28.0);
        zero_follow_up.second_cognitive_score = Some(0.0);
        let mut no_age = patient(3);
        no_age.first_cognitive_score = Some(20.0);

        let points = summarize(&[declining, zero_follow_up, no_age]).cognitive_progression;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].decline, 8.0);
        assert_eq!(points[1].second_score, None);
        assert_eq!(points[1].decline, 0.0);
    }

    #[test]
    fn means_ignore_non_positive_values() {
        let mut a = patient(1);
        a.age = Some(40.0);
        a.first_cognitive_score = Some(0.0);
        let mut b = patient(2);
        b.age = Some(0.0);
        b.first_cognitive_score = Some(26.0);
        let mut c = patient(3);
        c.age = Some(60.0);
        let summaries = summarize(&[a, b, c]);
        assert_eq!(summaries.mean_age, 50.0);
        assert_eq!(summaries.mean_first_score, 26.0);
        assert_eq!(summaries.age_span, AgeSpan { min: 40.0, max: 60.0 });
    }
}
