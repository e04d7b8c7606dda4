//! The registry patient record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codes::{
    AdditionalSymptom, DiagnosticMethod, Handedness, InitialSymptom, Sex, VascularRiskFactor,
    province_name,
};
use crate::error::{ModelError, Result};
use crate::value::{FieldValue, RawRecord};

/// REDCap field name holding the record identifier.
pub const RECORD_ID_FIELD: &str = "record_id";

/// REDCap marker for rows that belong to a repeating instrument.
pub const REPEAT_INSTRUMENT_FIELD: &str = "redcap_repeat_instrument";

/// Registry record identifier. Integer in most exports, text in some.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(id) => Some(Self::Int(*id)),
            FieldValue::Float(id) if id.fract() == 0.0 => Some(Self::Int(*id as i64)),
            // Canonical integer text ("12" but not "012") is the same id as 12.
            FieldValue::Text(text) => match text.trim().parse::<i64>() {
                Ok(id) if id.to_string() == text.trim() => Some(Self::Int(id)),
                _ => value.as_text().map(Self::Text),
            },
            other => other.as_text().map(Self::Text),
        }
    }

    pub fn to_field(&self) -> FieldValue {
        match self {
            Self::Int(id) => FieldValue::Int(*id),
            Self::Text(id) => FieldValue::Text(id.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One registry participant.
///
/// Coded answers keep their raw integer code so that a missing answer stays
/// distinct from a zero code; the typed accessors decode them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub record_id: RecordId,

    #[serde(rename = "nombre_apellido", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "medico_derivante", default, skip_serializing_if = "Option::is_none")]
    pub referring_physician: Option<String>,
    #[serde(rename = "institucion", default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(rename = "historia_clinica", default, skip_serializing_if = "Option::is_none")]
    pub medical_record: Option<String>,

    #[serde(rename = "edad_ingresada", default)]
    pub age: Option<f64>,
    #[serde(rename = "edad_inicio", default, skip_serializing_if = "Option::is_none")]
    pub onset_age: Option<f64>,
    #[serde(rename = "sexo", default)]
    pub sex: Option<i64>,
    #[serde(rename = "provincia", default)]
    pub province: Option<i64>,
    #[serde(rename = "ciudad", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "direccion_aproximada", default, skip_serializing_if = "Option::is_none")]
    pub approximate_address: Option<String>,
    #[serde(rename = "fecha_nacimiento", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(rename = "dominancia", default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<i64>,
    #[serde(rename = "escolaridad", default, skip_serializing_if = "Option::is_none")]
    pub schooling: Option<i64>,

    #[serde(rename = "sintoma_inicial", default)]
    pub initial_symptom: Option<i64>,
    #[serde(rename = "diagnostico_inicial", default, skip_serializing_if = "Option::is_none")]
    pub initial_diagnosis: Option<i64>,
    #[serde(rename = "metodo_diagnostico", default)]
    pub diagnostic_method: Option<i64>,
    #[serde(rename = "antecedentes_familiares", default)]
    pub family_history: Option<i64>,
    #[serde(rename = "valor_mmse_moca1", default)]
    pub first_cognitive_score: Option<f64>,
    #[serde(rename = "valor_mmse_moca2", default)]
    pub second_cognitive_score: Option<f64>,
    #[serde(rename = "resultado_genetico", default)]
    pub genetic_result: Option<String>,
    #[serde(default)]
    pub exon: Option<i64>,
    #[serde(rename = "fecha_acv_1", default, skip_serializing_if = "Option::is_none")]
    pub first_stroke_date: Option<String>,

    /// `sintomas_adicionales___1..5`, in [`AdditionalSymptom::ALL`] order.
    #[serde(skip)]
    pub additional_symptoms: [Option<bool>; 5],
    /// `factores_riesgo___1..5`, in [`VascularRiskFactor::ALL`] order.
    #[serde(skip)]
    pub risk_factors: [Option<bool>; 5],

    /// Columns not modelled above, kept by their export name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl PatientRecord {
    /// Creates a record with only an identifier set.
    pub fn new(record_id: impl Into<RecordId>) -> Self {
        Self {
            record_id: record_id.into(),
            full_name: None,
            referring_physician: None,
            institution: None,
            medical_record: None,
            age: None,
            onset_age: None,
            sex: None,
            province: None,
            city: None,
            approximate_address: None,
            birth_date: None,
            handedness: None,
            schooling: None,
            initial_symptom: None,
            initial_diagnosis: None,
            diagnostic_method: None,
            family_history: None,
            first_cognitive_score: None,
            second_cognitive_score: None,
            genetic_result: None,
            exon: None,
            first_stroke_date: None,
            additional_symptoms: [None; 5],
            risk_factors: [None; 5],
            extra: BTreeMap::new(),
        }
    }

    /// Builds a record from a raw export row.
    ///
    /// Values that do not coerce to the expected type are dropped rather
    /// than rejected; only a missing `record_id` is an error.
    pub fn from_fields(fields: &RawRecord) -> Result<Self> {
        let record_id = fields
            .get(RECORD_ID_FIELD)
            .and_then(RecordId::from_field)
            .ok_or(ModelError::MissingIdentifier)?;
        let mut record = Self::new(record_id);
        for (name, value) in fields {
            if name != RECORD_ID_FIELD {
                record.set_field(name, value);
            }
        }
        Ok(record)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) {
        match name {
            "nombre_apellido" => self.full_name = answered_text(value),
            "medico_derivante" => self.referring_physician = answered_text(value),
            "institucion" => self.institution = answered_text(value),
            "historia_clinica" => self.medical_record = answered_text(value),
            "edad_ingresada" => self.age = value.as_f64(),
            "edad_inicio" => self.onset_age = value.as_f64(),
            "sexo" => self.sex = value.as_i64(),
            "provincia" => self.province = value.as_i64(),
            "ciudad" => self.city = answered_text(value),
            "direccion_aproximada" => self.approximate_address = answered_text(value),
            "fecha_nacimiento" => self.birth_date = answered_text(value),
            "dominancia" => self.handedness = value.as_i64(),
            "escolaridad" => self.schooling = value.as_i64(),
            "sintoma_inicial" => self.initial_symptom = value.as_i64(),
            "diagnostico_inicial" => self.initial_diagnosis = value.as_i64(),
            "metodo_diagnostico" => self.diagnostic_method = value.as_i64(),
            "antecedentes_familiares" => self.family_history = value.as_i64(),
            "valor_mmse_moca1" => self.first_cognitive_score = value.as_f64(),
            "valor_mmse_moca2" => self.second_cognitive_score = value.as_f64(),
            "resultado_genetico" => self.genetic_result = answered_text(value),
            "exon" => self.exon = value.as_i64(),
            "fecha_acv_1" => self.first_stroke_date = answered_text(value),
            other => {
                if let Some(index) = checkbox_index(other, "sintomas_adicionales___") {
                    self.additional_symptoms[index] = value.as_flag();
                } else if let Some(index) = checkbox_index(other, "factores_riesgo___") {
                    self.risk_factors[index] = value.as_flag();
                } else if !value.is_null() {
                    self.extra.insert(other.to_string(), value.clone());
                }
            }
        }
    }

    /// Resolves a field by its export name.
    ///
    /// Unknown names resolve through `extra`, and finally to `Null`.
    pub fn field(&self, name: &str) -> FieldValue {
        match name {
            RECORD_ID_FIELD => self.record_id.to_field(),
            "nombre_apellido" => self.full_name.clone().into(),
            "medico_derivante" => self.referring_physician.clone().into(),
            "institucion" => self.institution.clone().into(),
            "historia_clinica" => self.medical_record.clone().into(),
            "edad_ingresada" => self.age.into(),
            "edad_inicio" => self.onset_age.into(),
            "sexo" => self.sex.into(),
            "provincia" => self.province.into(),
            "ciudad" => self.city.clone().into(),
            "direccion_aproximada" => self.approximate_address.clone().into(),
            "fecha_nacimiento" => self.birth_date.clone().into(),
            "dominancia" => self.handedness.into(),
            "escolaridad" => self.schooling.into(),
            "sintoma_inicial" => self.initial_symptom.into(),
            "diagnostico_inicial" => self.initial_diagnosis.into(),
            "metodo_diagnostico" => self.diagnostic_method.into(),
            "antecedentes_familiares" => self.family_history.into(),
            "valor_mmse_moca1" => self.first_cognitive_score.into(),
            "valor_mmse_moca2" => self.second_cognitive_score.into(),
            "resultado_genetico" => self.genetic_result.clone().into(),
            "exon" => self.exon.into(),
            "fecha_acv_1" => self.first_stroke_date.clone().into(),
            other => {
                if let Some(index) = checkbox_index(other, "sintomas_adicionales___") {
                    flag_field(self.additional_symptoms[index])
                } else if let Some(index) = checkbox_index(other, "factores_riesgo___") {
                    flag_field(self.risk_factors[index])
                } else {
                    self.extra.get(other).cloned().unwrap_or_default()
                }
            }
        }
    }

    /// Flattened name→value map, including checkbox columns.
    ///
    /// This is the shape schema-agnostic consumers such as the table see.
    pub fn to_fields(&self) -> RawRecord {
        let mut fields = self.extra.clone();
        for name in MODELLED_FIELDS {
            let value = self.field(name);
            if !value.is_null() {
                fields.insert((*name).to_string(), value);
            }
        }
        for symptom in AdditionalSymptom::ALL {
            let value = flag_field(self.additional_symptoms[symptom.index()]);
            if !value.is_null() {
                fields.insert(symptom.field_name(), value);
            }
        }
        for factor in VascularRiskFactor::ALL {
            let value = flag_field(self.risk_factors[factor.index()]);
            if !value.is_null() {
                fields.insert(factor.field_name(), value);
            }
        }
        fields
    }

    pub fn sex(&self) -> Option<Sex> {
        self.sex.and_then(Sex::from_code)
    }

    pub fn sex_label(&self) -> &'static str {
        self.sex().map_or(Sex::UNSPECIFIED_LABEL, Sex::label)
    }

    pub fn province_name(&self) -> Option<&'static str> {
        self.province.and_then(province_name)
    }

    pub fn handedness(&self) -> Option<Handedness> {
        self.handedness.and_then(Handedness::from_code)
    }

    pub fn initial_symptom(&self) -> Option<InitialSymptom> {
        self.initial_symptom.and_then(InitialSymptom::from_code)
    }

    pub fn diagnostic_method(&self) -> Option<DiagnosticMethod> {
        self.diagnostic_method.and_then(DiagnosticMethod::from_code)
    }

    pub fn has_symptom(&self, symptom: AdditionalSymptom) -> bool {
        self.additional_symptoms[symptom.index()] == Some(true)
    }

    pub fn has_risk_factor(&self, factor: VascularRiskFactor) -> bool {
        self.risk_factors[factor.index()] == Some(true)
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        if name == RECORD_ID_FIELD {
            if let Some(id) = RecordId::from_field(&value) {
                self.record_id = id;
            }
        } else {
            self.set_field(name, &value);
        }
        self
    }
}

const MODELLED_FIELDS: &[&str] = &[
    RECORD_ID_FIELD,
    "nombre_apellido",
    "medico_derivante",
    "institucion",
    "historia_clinica",
    "edad_ingresada",
    "edad_inicio",
    "sexo",
    "provincia",
    "ciudad",
    "direccion_aproximada",
    "fecha_nacimiento",
    "dominancia",
    "escolaridad",
    "sintoma_inicial",
    "diagnostico_inicial",
    "metodo_diagnostico",
    "antecedentes_familiares",
    "valor_mmse_moca1",
    "valor_mmse_moca2",
    "resultado_genetico",
    "exon",
    "fecha_acv_1",
];

fn checkbox_index(name: &str, prefix: &str) -> Option<usize> {
    let number: usize = name.strip_prefix(prefix)?.parse().ok()?;
    (1..=5).contains(&number).then(|| number - 1)
}

/// Text for a free-text field; unanswered values (zero, blank) become `None`.
fn answered_text(value: &FieldValue) -> Option<String> {
    if value.is_populated() {
        value.as_text()
    } else {
        None
    }
}

fn flag_field(flag: Option<bool>) -> FieldValue {
    flag.map_or(FieldValue::Null, |set| FieldValue::Int(i64::from(set)))
}
