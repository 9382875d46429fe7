//! Error types for qpcr_stats

use thiserror::Error;

/// Fatal errors that abort a qPCR analysis run
///
/// Recoverable conditions (a skipped comparison, an undefined fold change)
/// are not errors; they are collected in [`crate::diagnostics::Warnings`].
#[derive(Error, Debug)]
pub enum QpcrError {
    #[error("Schema error: missing required column(s) {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Reference gene '{gene}' not found in data")]
    ReferenceGeneNotFound { gene: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for qPCR operations
pub type Result<T> = std::result::Result<T, QpcrError>;
