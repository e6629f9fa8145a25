//! Core data structures and types for assay processing.
//!
//! Defines the in-memory tabular dataset produced by the loader, the assay
//! types, and the result records produced by the calculators.

use crate::constants::{TNS_NAME, ZETA_POTENTIAL_NAME};
use crate::error::{AssayError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Assay types supported by the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssayType {
    #[serde(rename = "TNS")]
    Tns,
    #[serde(rename = "Zeta Potential")]
    ZetaPotential,
}

impl AssayType {
    pub const ALL: [AssayType; 2] = [AssayType::Tns, AssayType::ZetaPotential];

    /// Name stored in the `experiment_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            AssayType::Tns => TNS_NAME,
            AssayType::ZetaPotential => ZETA_POTENTIAL_NAME,
        }
    }
}

impl fmt::Display for AssayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssayType {
    type Err = AssayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tns" => Ok(AssayType::Tns),
            "zeta potential" | "zeta" | "zeta-potential" | "zeta_potential" => {
                Ok(AssayType::ZetaPotential)
            }
            _ => Err(AssayError::UnknownAssayType {
                name: s.to_string(),
            }),
        }
    }
}

/// A single cell of an uploaded table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// Interpret the cell as a finite number.
    ///
    /// This is the only numeric coercion used by the calculators: text is
    /// trimmed and parsed, anything that cannot be read as a finite value
    /// becomes `None` and each calculator decides what that means.
    pub fn coerce_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Missing => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Interpret the cell as a non-blank label
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                Some(format!("{}", *v as i64))
            }
            Cell::Number(v) if v.is_finite() => Some(v.to_string()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Missing => write!(f, "<missing>"),
        }
    }
}

/// An uploaded table: named columns and ordered rows of cells
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TabularDataset {
    /// Build a dataset; rows shorter than the header are padded with
    /// `Missing`, longer rows are truncated to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact (trimmed) name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

/// Spreadsheet line of a data row: the header occupies line 1
pub fn line_number(row_index: usize) -> usize {
    row_index + 2
}

/// One calculated result for one formulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub experiment_type: AssayType,
    pub formulation_id: String,
    pub calculated_value: f64,
    pub valid: bool,
}

/// A result record as returned by the store, with identity and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    #[serde(flatten)]
    pub record: ResultRecord,
    pub timestamp: NaiveDateTime,
}

/// A treatment row that produced no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: usize,
    pub formulation_id: String,
    pub column: String,
    pub reason: String,
}

/// Output of one calculator run over one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub assay: AssayType,
    pub records: Vec<ResultRecord>,
    pub skipped: Vec<SkippedRow>,
    /// Batch-wide control mean, for assays that use one
    pub control_mean: Option<f64>,
}

impl Calculation {
    pub fn valid_count(&self) -> usize {
        self.records.iter().filter(|r| r.valid).count()
    }
}
