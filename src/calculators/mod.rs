//! Assay calculators
//!
//! Each assay type has a calculator that reads its layout out of a
//! [`TabularDataset`](crate::models::TabularDataset) and evaluates one ratio
//! per formulation. Calculators never decide how a bad row is handled; they
//! report it as a [`RowFault`] and declare a [`RowFaultPolicy`], and the
//! shared [`engine`] applies that policy.
//!
//! - [`tns`] - fixed column regions, one formulation per row, aborts on a bad row
//! - [`zeta`] - labelled rows with a batch-wide control mean, skips a bad row
//! - [`engine`] - policy application and record construction
//!
//! # Example Usage
//!
//! ```rust
//! use assay_processor::calculators::{calculator_for, engine};
//! use assay_processor::config::CalculatorConfig;
//! use assay_processor::models::{AssayType, Cell, TabularDataset};
//!
//! # fn example() -> assay_processor::error::Result<()> {
//! let dataset = TabularDataset::new(
//!     vec!["Sample Name".to_string(), "Zeta Potential (mV)".to_string()],
//!     vec![
//!         vec![Cell::Text("STD1".to_string()), Cell::Number(-12.0)],
//!         vec![Cell::Text("F1".to_string()), Cell::Number(-6.0)],
//!     ],
//! );
//!
//! let calculator = calculator_for(AssayType::ZetaPotential, &CalculatorConfig::default());
//! let calculation = engine::run(calculator.as_ref(), &dataset)?;
//! assert_eq!(calculation.records[0].calculated_value, 0.5);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod engine;
pub mod tns;
pub mod zeta;

#[cfg(test)]
pub mod tests;

use crate::config::CalculatorConfig;
use crate::error::Result;
use crate::models::{AssayType, TabularDataset};

pub use tns::TnsCalculator;
pub use zeta::ZetaPotentialCalculator;

/// How a calculator reacts to a row it cannot evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFaultPolicy {
    /// The first bad row fails the whole batch
    AbortOnRowFault,
    /// Bad rows are reported and left out; the rest of the batch is kept
    SkipOnRowFault,
}

/// Why one row could not be evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct RowFault {
    pub column: String,
    pub reason: String,
}

impl RowFault {
    pub fn new(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Evaluation of one data row
#[derive(Debug, Clone, PartialEq)]
pub struct RowEvaluation {
    /// Zero-based index into the dataset rows
    pub row_index: usize,
    /// Formulation label, or a placeholder when the row has none
    pub formulation_id: String,
    pub outcome: std::result::Result<f64, RowFault>,
}

/// Everything a calculator extracted from one dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub rows: Vec<RowEvaluation>,
    pub control_mean: Option<f64>,
}

/// Assay-specific interpretation of a dataset
pub trait AssayCalculator {
    fn assay_type(&self) -> AssayType;

    fn row_fault_policy(&self) -> RowFaultPolicy;

    /// Check the layout and evaluate every sample row.
    ///
    /// Layout problems and unusable controls are returned as errors; problems
    /// confined to one row are returned inside the evaluation.
    fn evaluate(&self, dataset: &TabularDataset) -> Result<Evaluation>;

    /// Validity predicate applied to a calculated value
    fn is_valid(&self, calculated_value: f64) -> bool;
}

/// Calculator for an assay type
pub fn calculator_for(assay: AssayType, config: &CalculatorConfig) -> Box<dyn AssayCalculator> {
    match assay {
        AssayType::Tns => Box::new(TnsCalculator::new(config.tns.clone())),
        AssayType::ZetaPotential => Box::new(ZetaPotentialCalculator::new(config.zeta.clone())),
    }
}

/// Arithmetic mean, `None` for an empty slice
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
