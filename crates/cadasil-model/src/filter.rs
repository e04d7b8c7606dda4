//! Cohort filter state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codes::Sex;
use crate::error::{ModelError, Result};

/// A filter selector: either no constraint or one specific value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Selector<T> {
    /// True when the selector is `All` or equals `value`.
    pub fn accepts(&self, value: Option<&T>) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => value == Some(expected),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl Selector<i64> {
    /// Parses `all` or an integer code.
    pub fn parse_code(field: &'static str, text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.is_empty() {
            return Ok(Self::All);
        }
        trimmed
            .parse::<i64>()
            .map(Self::Only)
            .map_err(|_| ModelError::InvalidSelector {
                field,
                value: text.to_string(),
            })
    }

    /// Parses `all`, a 0/1 code, or a yes/no word.
    pub fn parse_yes_no(field: &'static str, text: &str) -> Result<Self> {
        match text.trim().to_lowercase().as_str() {
            "si" | "sí" | "yes" | "y" => Ok(Self::Only(1)),
            "no" | "n" => Ok(Self::Only(0)),
            _ => Self::parse_code(field, text),
        }
    }
}

impl FromStr for Selector<Sex> {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.is_empty() {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(value) => write!(f, "{value}"),
        }
    }
}

/// Inclusive age bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: f64,
    pub max: f64,
}

impl AgeRange {
    pub const DEFAULT_MIN: f64 = 0.0;
    pub const DEFAULT_MAX: f64 = 100.0;

    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min > max {
            return Err(ModelError::InvertedAgeRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, age: f64) -> bool {
        age >= self.min && age <= self.max
    }
}

impl Default for AgeRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// The user-selected inclusion constraints applied before any summary.
///
/// `FilterState::default()` is the reset state: full age range, every
/// selector set to `All`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub age_range: AgeRange,
    pub sex: Selector<Sex>,
    pub province: Selector<i64>,
    pub symptom: Selector<i64>,
    pub diagnosis_method: Selector<i64>,
    pub family_history: Selector<i64>,
}

impl FilterState {
    #[must_use]
    pub fn with_age_range(mut self, range: AgeRange) -> Self {
        self.age_range = range;
        self
    }

    #[must_use]
    pub fn with_sex(mut self, sex: Selector<Sex>) -> Self {
        self.sex = sex;
        self
    }

    #[must_use]
    pub fn with_province(mut self, province: Selector<i64>) -> Self {
        self.province = province;
        self
    }

    #[must_use]
    pub fn with_symptom(mut self, symptom: Selector<i64>) -> Self {
        self.symptom = symptom;
        self
    }

    #[must_use]
    pub fn with_diagnosis_method(mut self, method: Selector<i64>) -> Self {
        self.diagnosis_method = method;
        self
    }

    #[must_use]
    pub fn with_family_history(mut self, history: Selector<i64>) -> Self {
        self.family_history = history;
        self
    }

    /// True when no constraint narrows the default state.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
