//! Error types for registry ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading registry records.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Failed to read an export file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Delimited Text Errors ===
    /// Delimited text could not be parsed.
    #[error("failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Input had no header row.
    #[error("{origin} is empty")]
    EmptyInput { origin: String },

    /// A required column is absent from the header row.
    #[error("required column '{column}' not found in {origin}")]
    MissingColumn { column: String, origin: String },

    // === Data Source Errors ===
    /// Credentials or endpoint missing, or left at a placeholder value.
    #[error("{service} is not configured: {reason}")]
    NotConfigured {
        service: &'static str,
        reason: String,
    },

    /// Service answered with a non-success status.
    #[error("{service} returned HTTP {status}: {message}")]
    Http {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Request could not be sent or completed.
    #[error("{service} request failed: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("could not decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
