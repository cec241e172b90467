//! Error types for rolltable.

use thiserror::Error;

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors raised while building, reading or transforming tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    /// A column's length disagrees with the table's row count.
    #[error("column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("type mismatch in column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("column '{0}' is not nullable")]
    NullNotAllowed(String),

    #[error("missing value for column '{0}'")]
    MissingValue(String),

    #[error("row {index} out of range [0, {len})")]
    RowOutOfRange { index: usize, len: usize },

    /// Invalid parameter value (window size, bin count).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("table has no columns")]
    EmptyTable,

    /// Every value in the column is the same, so equal-width bins have zero width.
    #[error("column '{column}' is constant ({value}); cannot split into bins")]
    DegenerateRange { column: String, value: f64 },

    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),

    /// CSV, JSON or pipeline configuration could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Parse(err.to_string())
    }
}
