//! Error handling for assay processing operations.
//!
//! Provides error types with enough context (assay type, file line, column)
//! to locate a failing cell in the uploaded export.

use crate::models::AssayType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Unsupported file format '.{extension}' for file: {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("File contains no header row: {path}")]
    EmptyDataset { path: PathBuf },

    #[error("Schema error{}: {reason}", assay_context(.assay))]
    Schema {
        assay: Option<AssayType>,
        reason: String,
    },

    #[error("Validation error in {assay} data: {reason}")]
    Validation { assay: AssayType, reason: String },

    #[error("Row fault in {assay} data at line {line}, column '{column}': {reason}")]
    RowFault {
        assay: AssayType,
        line: usize,
        column: String,
        reason: String,
    },

    #[error("Insufficient data for {assay}: {count} stored value(s), at least 2 required")]
    InsufficientData { assay: AssayType, count: usize },

    #[error("Cannot summarize {assay}: {non_finite} of {count} stored value(s) are not finite")]
    NonFiniteValues {
        assay: AssayType,
        count: usize,
        non_finite: usize,
    },

    #[error("Unknown assay type: {name}")]
    UnknownAssayType { name: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Timestamp parsing failed for value '{value}': {source}")]
    TimestampParsing {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

fn assay_context(assay: &Option<AssayType>) -> String {
    match assay {
        Some(assay) => format!(" in {assay} data"),
        None => String::new(),
    }
}

impl AssayError {
    /// Create a schema error tied to an assay layout
    pub fn schema(assay: AssayType, reason: impl Into<String>) -> Self {
        Self::Schema {
            assay: Some(assay),
            reason: reason.into(),
        }
    }

    /// Create a validation error for unusable control measurements
    pub fn validation(assay: AssayType, reason: impl Into<String>) -> Self {
        Self::Validation {
            assay,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error means "not enough usable stored values to summarize"
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::NonFiniteValues { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AssayError>;
