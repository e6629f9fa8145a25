//! Result persistence.
//!
//! The processor only talks to [`ResultStore`]; the backing implementation
//! owns any concurrency control it needs.
//!
//! - [`sqlite`] - the `results` table in a SQLite database file
//! - [`memory`] - in-process store for dry runs and tests

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::models::{AssayType, ResultRecord, StoredResult};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistent collection of result records
pub trait ResultStore {
    /// Append one record
    fn append(&mut self, record: &ResultRecord) -> Result<()>;

    /// Append a batch of records atomically, returning how many were stored.
    ///
    /// Either every record is stored or none is.
    fn append_batch(&mut self, records: &[ResultRecord]) -> Result<usize>;

    /// Calculated values of one assay type in insertion order
    fn query_by_type(&self, assay: AssayType) -> Result<Vec<f64>>;

    /// Stored rows of one assay type in insertion order
    fn results_by_type(&self, assay: AssayType) -> Result<Vec<StoredResult>>;

    /// Distinct stored assay types, in the order they were first stored
    fn experiment_types(&self) -> Result<Vec<AssayType>>;
}
