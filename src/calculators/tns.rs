//! TNS fluorescence-ratio calculator
//!
//! One formulation per data row. Column 0 names the formulation, the
//! treatment region holds triplicate readings and the control region holds
//! the row's own control readings:
//!
//! ```text
//! calculated_value = mean(treatment) / mean(control)
//! valid            = calculated_value > threshold
//! ```

use super::{AssayCalculator, Evaluation, RowEvaluation, RowFault, RowFaultPolicy, mean};
use crate::config::TnsConfig;
use crate::constants::tns::FORMULATION_COLUMN;
use crate::error::{AssayError, Result};
use crate::models::{AssayType, Cell, TabularDataset};
use std::ops::Range;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct TnsCalculator {
    config: TnsConfig,
}

impl TnsCalculator {
    pub fn new(config: TnsConfig) -> Self {
        Self { config }
    }

    fn evaluate_row(
        &self,
        dataset: &TabularDataset,
        row: &[Cell],
    ) -> std::result::Result<f64, RowFault> {
        let treatment = read_region(dataset, row, &self.config.treatment_columns)?;
        let control = read_region(dataset, row, &self.config.control_columns)?;

        // Regions are checked non-empty in evaluate(), so both means exist
        let avg_formulation = mean(&treatment).unwrap_or(f64::NAN);
        let avg_control = mean(&control).unwrap_or(f64::NAN);

        if avg_control == 0.0 {
            return Err(RowFault::new(
                region_label(dataset, &self.config.control_columns),
                "control mean is zero, ratio is undefined",
            ));
        }

        Ok(avg_formulation / avg_control)
    }
}

impl AssayCalculator for TnsCalculator {
    fn assay_type(&self) -> AssayType {
        AssayType::Tns
    }

    fn row_fault_policy(&self) -> RowFaultPolicy {
        RowFaultPolicy::AbortOnRowFault
    }

    fn evaluate(&self, dataset: &TabularDataset) -> Result<Evaluation> {
        if self.config.treatment_columns.is_empty() || self.config.control_columns.is_empty() {
            return Err(AssayError::configuration(
                "TNS treatment and control regions must not be empty",
            ));
        }

        let required = self.config.required_columns();
        if dataset.column_count() < required {
            return Err(AssayError::schema(
                AssayType::Tns,
                format!(
                    "expected at least {} columns, found {}",
                    required,
                    dataset.column_count()
                ),
            ));
        }

        let skip = self.config.skip_leading_rows;
        if skip > 0 {
            debug!("Dropping {} leading TNS data row(s)", skip);
        }

        let rows = dataset
            .rows()
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(row_index, row)| {
                let id_cell = &row[FORMULATION_COLUMN];
                let (formulation_id, outcome) = match id_cell.as_label() {
                    Some(id) => (id, self.evaluate_row(dataset, row)),
                    None => (
                        String::from("<unnamed>"),
                        Err(RowFault::new(
                            dataset.columns()[FORMULATION_COLUMN].clone(),
                            "formulation identifier is missing",
                        )),
                    ),
                };
                RowEvaluation {
                    row_index,
                    formulation_id,
                    outcome,
                }
            })
            .collect();

        Ok(Evaluation {
            rows,
            control_mean: None,
        })
    }

    fn is_valid(&self, calculated_value: f64) -> bool {
        calculated_value > self.config.valid_threshold
    }
}

/// Read every cell of a region as a number; the first non-numeric cell is a fault
fn read_region(
    dataset: &TabularDataset,
    row: &[Cell],
    region: &Range<usize>,
) -> std::result::Result<Vec<f64>, RowFault> {
    region
        .clone()
        .map(|column| {
            let cell = &row[column];
            cell.coerce_number().ok_or_else(|| {
                let reason = match cell {
                    Cell::Missing => "value is missing".to_string(),
                    other => format!("value '{}' is not numeric", other),
                };
                RowFault::new(dataset.columns()[column].clone(), reason)
            })
        })
        .collect()
}

fn region_label(dataset: &TabularDataset, region: &Range<usize>) -> String {
    let columns = dataset.columns();
    format!("{}..{}", columns[region.start], columns[region.end - 1])
}
