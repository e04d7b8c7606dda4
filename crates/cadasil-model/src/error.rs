use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("record has no record_id")]
    MissingIdentifier,
    #[error("invalid {field} selector '{value}'")]
    InvalidSelector { field: &'static str, value: String },
    #[error("age range minimum {min} exceeds maximum {max}")]
    InvertedAgeRange { min: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
