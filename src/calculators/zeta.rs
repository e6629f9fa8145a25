//! Zeta Potential calculator
//!
//! Rows are grouped by content, not position: a row whose sample name starts
//! with the control prefix is a standard, every other named row is a
//! formulation. All formulations are normalized against the mean of the
//! standards:
//!
//! ```text
//! calculated_value = zeta / mean(zeta of control rows)
//! valid            = calculated_value > threshold
//! ```
//!
//! Instrument exports carry the odd blank or garbled reading. A formulation
//! row without a usable reading is reported and left out; the rest of the
//! batch still produces results.

use super::{AssayCalculator, Evaluation, RowEvaluation, RowFault, RowFaultPolicy, mean};
use crate::config::ZetaConfig;
use crate::error::{AssayError, Result};
use crate::models::{AssayType, Cell, TabularDataset};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ZetaPotentialCalculator {
    config: ZetaConfig,
}

/// A named row with its coerced reading
struct Reading<'a> {
    row_index: usize,
    sample: String,
    zeta: Option<f64>,
    raw: &'a Cell,
}

impl ZetaPotentialCalculator {
    pub fn new(config: ZetaConfig) -> Self {
        Self { config }
    }

    fn locate_column(&self, dataset: &TabularDataset, name: &str) -> Result<usize> {
        dataset.column_index(name).ok_or_else(|| {
            AssayError::schema(
                AssayType::ZetaPotential,
                format!(
                    "required column '{}' not found in [{}]",
                    name,
                    dataset.columns().join(", ")
                ),
            )
        })
    }

    fn is_control(&self, sample: &str) -> bool {
        sample.starts_with(&self.config.control_prefix)
    }

    /// Mean of the control readings; fails when the controls cannot normalize anything
    fn control_mean(&self, readings: &[Reading<'_>]) -> Result<f64> {
        let controls: Vec<&Reading<'_>> =
            readings.iter().filter(|r| self.is_control(&r.sample)).collect();

        if controls.is_empty() {
            return Err(AssayError::validation(
                AssayType::ZetaPotential,
                format!(
                    "no control rows found (sample names starting with '{}')",
                    self.config.control_prefix
                ),
            ));
        }

        let values: Vec<f64> = controls.iter().filter_map(|r| r.zeta).collect();
        if values.len() < controls.len() {
            debug!(
                "{} of {} control readings are not numeric and were ignored",
                controls.len() - values.len(),
                controls.len()
            );
        }

        let avg_control = mean(&values).ok_or_else(|| {
            AssayError::validation(
                AssayType::ZetaPotential,
                format!(
                    "all {} control readings in '{}' are missing or non-numeric",
                    controls.len(),
                    self.config.zeta_column
                ),
            )
        })?;

        if avg_control == 0.0 {
            return Err(AssayError::validation(
                AssayType::ZetaPotential,
                "control mean is zero, readings cannot be normalized",
            ));
        }

        Ok(avg_control)
    }
}

impl AssayCalculator for ZetaPotentialCalculator {
    fn assay_type(&self) -> AssayType {
        AssayType::ZetaPotential
    }

    fn row_fault_policy(&self) -> RowFaultPolicy {
        RowFaultPolicy::SkipOnRowFault
    }

    fn evaluate(&self, dataset: &TabularDataset) -> Result<Evaluation> {
        let sample_idx = self.locate_column(dataset, &self.config.sample_column)?;
        let zeta_idx = self.locate_column(dataset, &self.config.zeta_column)?;

        let readings: Vec<Reading<'_>> = dataset
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(row_index, row)| {
                let sample = row[sample_idx].as_label()?;
                let raw = &row[zeta_idx];
                Some(Reading {
                    row_index,
                    sample,
                    zeta: raw.coerce_number(),
                    raw,
                })
            })
            .collect();

        let dropped = dataset.row_count() - readings.len();
        if dropped > 0 {
            debug!("Dropped {} row(s) without a sample name", dropped);
        }

        let avg_control = self.control_mean(&readings)?;
        debug!("Zeta Potential control mean: {:.4}", avg_control);

        let rows = readings
            .into_iter()
            .filter(|r| !self.is_control(&r.sample))
            .map(|r| {
                let outcome = match r.zeta {
                    Some(zeta) => Ok(zeta / avg_control),
                    None => Err(RowFault::new(
                        self.config.zeta_column.clone(),
                        match r.raw {
                            Cell::Missing => "reading is missing".to_string(),
                            other => format!("reading '{}' is not numeric", other),
                        },
                    )),
                };
                RowEvaluation {
                    row_index: r.row_index,
                    formulation_id: r.sample,
                    outcome,
                }
            })
            .collect();

        Ok(Evaluation {
            rows,
            control_mean: Some(avg_control),
        })
    }

    fn is_valid(&self, calculated_value: f64) -> bool {
        calculated_value > self.config.valid_threshold
    }
}
