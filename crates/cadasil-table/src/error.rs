use thiserror::Error;

/// Table configuration errors. These indicate a caller bug and are
/// reported instead of rendering an empty table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table has no columns defined")]
    NoColumns,
    #[error("table data must be a list of records")]
    NotAList,
    #[error("row {index} is not a record")]
    InvalidRow { index: usize },
}

pub type Result<T> = std::result::Result<T, TableError>;
