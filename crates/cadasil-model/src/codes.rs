//! Registry code tables.
//!
//! REDCap stores coded answers as small integers. These tables map them to
//! the Spanish labels used throughout the registry's reports. Codes outside
//! a table never fail; callers fall back to an "unspecified" label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Genetic result recorded for positive patients whose report is still pending.
pub const PENDING_GENETIC_RESULT: &str = "Positivo, pendiente conseguir";

/// Default genetic result assigned to uploaded rows without one.
pub const UNREPORTED_GENETIC_RESULT: &str = "Pendiente";

/// Province names indexed by `code - 1`.
pub const PROVINCES: [&str; 24] = [
    "Buenos Aires",
    "Catamarca",
    "Chaco",
    "Chubut",
    "Córdoba",
    "Corrientes",
    "Entre Ríos",
    "Formosa",
    "Jujuy",
    "La Pampa",
    "La Rioja",
    "Mendoza",
    "Misiones",
    "Neuquén",
    "Río Negro",
    "Salta",
    "San Juan",
    "San Luis",
    "Santa Cruz",
    "Santa Fe",
    "Santiago del Estero",
    "Tierra del Fuego",
    "Tucumán",
    "CABA",
];

/// Label used in distributions for province codes outside the table.
pub const UNKNOWN_PROVINCE: &str = "Desconocida";

/// Looks up a province name by registry code (1-24).
pub fn province_name(code: i64) -> Option<&'static str> {
    let index = usize::try_from(code).ok()?.checked_sub(1)?;
    PROVINCES.get(index).copied()
}

/// Iterates over `(code, name)` pairs of the province table.
pub fn provinces() -> impl Iterator<Item = (i64, &'static str)> {
    PROVINCES
        .iter()
        .enumerate()
        .map(|(index, name)| (index as i64 + 1, *name))
}

/// Participant sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Label for records whose sex code is missing or unknown.
    pub const UNSPECIFIED_LABEL: &'static str = "No especificado";

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    pub const fn code(self) -> i64 {
        match self {
            Self::Male => 1,
            Self::Female => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Masculino",
            Self::Female => "Femenino",
        }
    }

    /// Single-letter form used in the patient table.
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sex {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "m" | "male" | "masculino" => Ok(Self::Male),
            "2" | "f" | "female" | "femenino" => Ok(Self::Female),
            _ => Err(ModelError::InvalidSelector {
                field: "sex",
                value: s.to_string(),
            }),
        }
    }
}

/// Dominant hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Right,
    Left,
    Ambidextrous,
}

impl Handedness {
    pub const UNKNOWN_LABEL: &'static str = "Desconocido";

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Right),
            2 => Some(Self::Left),
            3 => Some(Self::Ambidextrous),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Right => "Diestro",
            Self::Left => "Zurdo",
            Self::Ambidextrous => "Ambidiestro",
        }
    }
}

/// How the CADASIL diagnosis was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticMethod {
    Genetic,
    SkinBiopsy,
    Clinical,
}

impl DiagnosticMethod {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Genetic),
            2 => Some(Self::SkinBiopsy),
            3 => Some(Self::Clinical),
            _ => None,
        }
    }

    pub const fn code(self) -> i64 {
        match self {
            Self::Genetic => 1,
            Self::SkinBiopsy => 2,
            Self::Clinical => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Genetic => "Genético",
            Self::SkinBiopsy => "Biopsia",
            Self::Clinical => "Clínico",
        }
    }
}

/// Presenting symptom recorded at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitialSymptom {
    Stroke,
    Migraine,
    CognitiveDecline,
    Psychiatric,
    Seizures,
    Other,
    Asymptomatic,
    Dementia,
    Multiple,
}

impl InitialSymptom {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Stroke),
            2 => Some(Self::Migraine),
            3 => Some(Self::CognitiveDecline),
            4 => Some(Self::Psychiatric),
            5 => Some(Self::Seizures),
            6 => Some(Self::Other),
            7 => Some(Self::Asymptomatic),
            8 => Some(Self::Dementia),
            9 => Some(Self::Multiple),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Stroke => "ACV/TIA",
            Self::Migraine => "Migraña",
            Self::CognitiveDecline => "Deterioro Cognitivo",
            Self::Psychiatric => "Psiquiátrico",
            Self::Seizures => "Convulsiones",
            Self::Other => "Otros",
            Self::Asymptomatic => "Asintomático",
            Self::Dementia => "Demencia",
            Self::Multiple => "Múltiples",
        }
    }
}

/// Additional symptom checkboxes (`sintomas_adicionales___N`), in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdditionalSymptom {
    CerebrovascularEvent,
    Migraine,
    CognitiveDecline,
    Psychiatric,
    Seizures,
}

impl AdditionalSymptom {
    pub const ALL: [Self; 5] = [
        Self::CerebrovascularEvent,
        Self::Migraine,
        Self::CognitiveDecline,
        Self::Psychiatric,
        Self::Seizures,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CerebrovascularEvent => "ACV",
            Self::Migraine => "Migraña",
            Self::CognitiveDecline => "Deterioro Cognitivo",
            Self::Psychiatric => "Psiquiátrico",
            Self::Seizures => "Convulsiones",
        }
    }

    pub fn field_name(self) -> String {
        format!("sintomas_adicionales___{}", self.index() + 1)
    }
}

/// Vascular risk factor checkboxes (`factores_riesgo___N`), in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VascularRiskFactor {
    Hypertension,
    Diabetes,
    Dyslipidemia,
    Smoking,
    Obesity,
}

impl VascularRiskFactor {
    pub const ALL: [Self; 5] = [
        Self::Hypertension,
        Self::Diabetes,
        Self::Dyslipidemia,
        Self::Smoking,
        Self::Obesity,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hypertension => "Hipertensión",
            Self::Diabetes => "Diabetes",
            Self::Dyslipidemia => "Dislipidemia",
            Self::Smoking => "Tabaquismo",
            Self::Obesity => "Obesidad",
        }
    }

    pub fn field_name(self) -> String {
        format!("factores_riesgo___{}", self.index() + 1)
    }
}

/// Display classification of the free-text genetic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneticStatus {
    /// A NOTCH3 variant is named in the result.
    Notch3Positive,
    Positive,
    Pending,
    Unavailable,
}

impl GeneticStatus {
    pub fn classify(result: Option<&str>) -> Self {
        match result {
            Some(text) if text.contains("NOTCH3") => Self::Notch3Positive,
            Some(text) if text.contains("Positivo") => Self::Positive,
            Some(text) if text.contains("Pendiente") => Self::Pending,
            _ => Self::Unavailable,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Notch3Positive => "Positivo (NOTCH3)",
            Self::Positive => "Positivo",
            Self::Pending => "Pendiente",
            Self::Unavailable => "N/A",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn province_table_covers_codes_1_to_24() {
        assert_eq!(province_name(1), Some("Buenos Aires"));
        assert_eq!(province_name(20), Some("Santa Fe"));
        assert_eq!(province_name(24), Some("CABA"));
        assert_eq!(province_name(0), None);
        assert_eq!(province_name(25), None);
        assert_eq!(province_name(-3), None);
        assert_eq!(provinces().count(), 24);
    }

    #[test]
    fn sex_parses_codes_and_names() {
        assert_eq!("masculino".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("2".parse::<Sex>().unwrap(), Sex::Female);
        assert!("x".parse::<Sex>().is_err());
        assert_eq!(Sex::from_code(3), None);
    }

    #[test]
    fn checkbox_field_names_follow_redcap_layout() {
        assert_eq!(
            AdditionalSymptom::CerebrovascularEvent.field_name(),
            "sintomas_adicionales___1"
        );
        assert_eq!(VascularRiskFactor::Obesity.field_name(), "factores_riesgo___5");
    }

    #[test]
    fn genetic_status_prefers_notch3() {
        assert_eq!(
            GeneticStatus::classify(Some("NM_000435.3(NOTCH3):c.751T>A (p.Cys251Ser)")),
            GeneticStatus::Notch3Positive
        );
        assert_eq!(
            GeneticStatus::classify(Some(PENDING_GENETIC_RESULT)),
            GeneticStatus::Positive
        );
        assert_eq!(
            GeneticStatus::classify(Some("Pendiente")),
            GeneticStatus::Pending
        );
        assert_eq!(GeneticStatus::classify(None), GeneticStatus::Unavailable);
    }
}
