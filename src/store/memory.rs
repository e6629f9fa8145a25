//! In-process result store

use super::ResultStore;
use crate::error::Result;
use crate::models::{AssayType, ResultRecord, StoredResult};
use chrono::Utc;

/// Result store held in memory; contents are lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    results: Vec<StoredResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    fn next_id(&self) -> i64 {
        self.results.last().map_or(1, |r| r.id + 1)
    }
}

impl ResultStore for MemoryStore {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        let stored = StoredResult {
            id: self.next_id(),
            record: record.clone(),
            timestamp: Utc::now().naive_utc(),
        };
        self.results.push(stored);
        Ok(())
    }

    fn append_batch(&mut self, records: &[ResultRecord]) -> Result<usize> {
        for record in records {
            self.append(record)?;
        }
        Ok(records.len())
    }

    fn query_by_type(&self, assay: AssayType) -> Result<Vec<f64>> {
        Ok(self
            .results
            .iter()
            .filter(|r| r.record.experiment_type == assay)
            .map(|r| r.record.calculated_value)
            .collect())
    }

    fn results_by_type(&self, assay: AssayType) -> Result<Vec<StoredResult>> {
        Ok(self
            .results
            .iter()
            .filter(|r| r.record.experiment_type == assay)
            .cloned()
            .collect())
    }

    fn experiment_types(&self) -> Result<Vec<AssayType>> {
        let mut types = Vec::new();
        for result in &self.results {
            if !types.contains(&result.record.experiment_type) {
                types.push(result.record.experiment_type);
            }
        }
        Ok(types)
    }
}
