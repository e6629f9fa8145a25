//! Shared calculation driver
//!
//! Turns a calculator's [`Evaluation`] into result records, applying the
//! calculator's declared row-fault policy.

use super::{AssayCalculator, RowFault, RowFaultPolicy};
use crate::error::{AssayError, Result};
use crate::models::{Calculation, ResultRecord, SkippedRow, TabularDataset, line_number};
use tracing::{debug, warn};

/// Run a calculator over a dataset
pub fn run(calculator: &dyn AssayCalculator, dataset: &TabularDataset) -> Result<Calculation> {
    let assay = calculator.assay_type();
    let policy = calculator.row_fault_policy();
    let evaluation = calculator.evaluate(dataset)?;

    let mut records = Vec::with_capacity(evaluation.rows.len());
    let mut skipped = Vec::new();

    for row in evaluation.rows {
        let line = line_number(row.row_index);
        match row.outcome.and_then(finite_ratio) {
            Ok(calculated_value) => {
                let valid = calculator.is_valid(calculated_value);
                debug!(
                    "{} line {}: {} -> {:.4} (valid: {})",
                    assay, line, row.formulation_id, calculated_value, valid
                );
                records.push(ResultRecord {
                    experiment_type: assay,
                    formulation_id: row.formulation_id,
                    calculated_value,
                    valid,
                });
            }
            Err(fault) => match policy {
                RowFaultPolicy::AbortOnRowFault => {
                    return Err(AssayError::RowFault {
                        assay,
                        line,
                        column: fault.column,
                        reason: fault.reason,
                    });
                }
                RowFaultPolicy::SkipOnRowFault => {
                    warn!(
                        "Skipping {} line {} ({}): column '{}': {}",
                        assay, line, row.formulation_id, fault.column, fault.reason
                    );
                    skipped.push(SkippedRow {
                        line,
                        formulation_id: row.formulation_id,
                        column: fault.column,
                        reason: fault.reason,
                    });
                }
            },
        }
    }

    Ok(Calculation {
        assay,
        records,
        skipped,
        control_mean: evaluation.control_mean,
    })
}

/// An overflowing ratio is a fault on the row, never a stored value
fn finite_ratio(calculated_value: f64) -> std::result::Result<f64, RowFault> {
    if calculated_value.is_finite() {
        Ok(calculated_value)
    } else {
        Err(RowFault::new(
            "calculated value",
            format!("ratio {} is not finite", calculated_value),
        ))
    }
}
