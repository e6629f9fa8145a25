//! Assay type detection from column layout.
//!
//! Classification looks only at column headers. A Zeta Potential export is
//! recognised by a marker column; anything wide enough for the fixed TNS
//! regions is TNS; everything else is reported as unrecognized and the
//! caller decides what to do with it.

use crate::config::{ClassifierConfig, TnsConfig};
use crate::error::{AssayError, Result};
use crate::models::{AssayType, TabularDataset};
use tracing::{debug, warn};

/// Outcome of inspecting a dataset's headers
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Classified(AssayType),
    Unrecognized { columns: Vec<String> },
}

/// Header-based classifier for uploaded exports
#[derive(Debug, Clone)]
pub struct AssayClassifier {
    marker_columns: Vec<String>,
    marker_substring: String,
    tns_required_columns: usize,
    fallback_to_tns: bool,
}

impl Default for AssayClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default(), &TnsConfig::default())
    }
}

impl AssayClassifier {
    pub fn new(config: &ClassifierConfig, tns: &TnsConfig) -> Self {
        Self {
            marker_columns: config.marker_columns.clone(),
            marker_substring: config.marker_substring.clone(),
            tns_required_columns: tns.required_columns(),
            fallback_to_tns: config.fallback_to_tns,
        }
    }

    /// Classify a dataset from its column headers
    pub fn classify(&self, dataset: &TabularDataset) -> Classification {
        let columns = dataset.columns();

        if let Some(marker) = columns.iter().find(|c| self.is_zeta_marker(c)) {
            debug!("Zeta Potential marker column found: '{}'", marker);
            return Classification::Classified(AssayType::ZetaPotential);
        }

        if columns.len() >= self.tns_required_columns {
            return Classification::Classified(AssayType::Tns);
        }

        Classification::Unrecognized {
            columns: columns.to_vec(),
        }
    }

    /// Classify and resolve an unrecognized layout.
    ///
    /// Unrecognized layouts are a schema error unless the TNS fallback is
    /// enabled, in which case they are processed as TNS with a warning.
    pub fn detect_assay_type(&self, dataset: &TabularDataset) -> Result<AssayType> {
        match self.classify(dataset) {
            Classification::Classified(assay) => Ok(assay),
            Classification::Unrecognized { columns } if self.fallback_to_tns => {
                warn!(
                    "Unrecognized column layout ({} columns), falling back to TNS",
                    columns.len()
                );
                Ok(AssayType::Tns)
            }
            Classification::Unrecognized { columns } => Err(AssayError::Schema {
                assay: None,
                reason: format!(
                    "unrecognized column layout: no Zeta Potential marker and {} columns \
                     (TNS needs at least {}): [{}]",
                    columns.len(),
                    self.tns_required_columns,
                    columns.join(", ")
                ),
            }),
        }
    }

    fn is_zeta_marker(&self, column: &str) -> bool {
        let column = column.trim();
        self.marker_columns.iter().any(|m| m == column)
            || (!self.marker_substring.is_empty() && column.contains(&self.marker_substring))
    }
}
