//! Upload and reporting pipeline.
//!
//! Ties the loader, classifier, calculators and store together:
//!
//! ```text
//! file -> load -> classify -> calculate -> append_batch
//! store -> query_by_type -> summarize
//! ```
//!
//! Each upload is one batch. A batch that fails anywhere before the store
//! commits leaves nothing behind.

#[cfg(test)]
pub mod tests;

use crate::calculators::{calculator_for, engine};
use crate::classifier::AssayClassifier;
use crate::config::{AssayConfig, CalculatorConfig};
use crate::error::Result;
use crate::loader::load_dataset;
use crate::models::{AssayType, ResultRecord, SkippedRow, StoredResult, TabularDataset};
use crate::stats::{self, SummaryStatistics};
use crate::store::ResultStore;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Outcome of processing one uploaded export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReport {
    /// File path or caller-supplied label
    pub source: String,
    pub assay: AssayType,
    /// Records written to the store (zero in dry-run mode)
    pub records_stored: usize,
    pub valid_count: usize,
    /// Treatment rows left out under the skip policy
    pub skipped: Vec<SkippedRow>,
    pub control_mean: Option<f64>,
    pub dry_run: bool,
    pub processing_time_ms: u64,
    pub records: Vec<ResultRecord>,
}

/// Summary statistics for one stored assay type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub assay: AssayType,
    pub statistics: SummaryStatistics,
}

/// Processor bound to one result store
pub struct AssayProcessor<S: ResultStore> {
    store: S,
    classifier: AssayClassifier,
    calculators: CalculatorConfig,
    dry_run: bool,
}

impl<S: ResultStore> AssayProcessor<S> {
    pub fn new(store: S, config: &AssayConfig) -> Self {
        Self {
            store,
            classifier: AssayClassifier::new(&config.classifier, &config.calculators.tns),
            calculators: config.calculators.clone(),
            dry_run: config.dry_run,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Load, classify, calculate and store one export file
    pub fn process_file(&mut self, path: &Path) -> Result<UploadReport> {
        let start_time = Instant::now();
        info!("Processing {}", path.display());

        let dataset = load_dataset(path)?;
        self.process(&dataset, path.display().to_string(), start_time)
    }

    /// Same as [`process_file`](Self::process_file) for a dataset already in memory
    pub fn process_dataset(
        &mut self,
        dataset: &TabularDataset,
        source: &str,
    ) -> Result<UploadReport> {
        self.process(dataset, source.to_string(), Instant::now())
    }

    fn process(
        &mut self,
        dataset: &TabularDataset,
        source: String,
        start_time: Instant,
    ) -> Result<UploadReport> {
        let assay = self.classifier.detect_assay_type(dataset)?;
        debug!("{} classified as {}", source, assay);

        let calculator = calculator_for(assay, &self.calculators);
        let calculation = engine::run(calculator.as_ref(), dataset)?;

        let records_stored = if self.dry_run {
            info!(
                "Dry run: {} {} record(s) from {} not stored",
                calculation.records.len(),
                assay,
                source
            );
            0
        } else {
            self.store.append_batch(&calculation.records)?
        };

        let report = UploadReport {
            valid_count: calculation.valid_count(),
            source,
            assay,
            records_stored,
            skipped: calculation.skipped,
            control_mean: calculation.control_mean,
            dry_run: self.dry_run,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            records: calculation.records,
        };

        info!(
            "{}: {} {} record(s) stored, {} valid, {} skipped",
            report.source,
            report.records_stored,
            report.assay,
            report.valid_count,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Summary statistics over every stored value of one assay type
    pub fn summarize(&self, assay: AssayType) -> Result<SummaryReport> {
        let values = self.store.query_by_type(assay)?;
        let statistics = stats::summarize(assay, &values)?;
        Ok(SummaryReport { assay, statistics })
    }

    /// Stored rows of one assay type
    pub fn results(&self, assay: AssayType) -> Result<Vec<StoredResult>> {
        self.store.results_by_type(assay)
    }

    /// Assay types present in the store
    pub fn experiment_types(&self) -> Result<Vec<AssayType>> {
        self.store.experiment_types()
    }
}
