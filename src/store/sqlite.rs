//! SQLite result store
//!
//! Stores results in the `results` table, one row per formulation. Writers
//! take an immediate transaction so concurrent uploads into the same file
//! are serialized by SQLite; a busy timeout bounds how long a writer waits
//! for the lock.

use super::ResultStore;
use crate::constants::{CREATE_RESULTS_TABLE, SQLITE_TIMESTAMP_FORMAT};
use crate::error::{AssayError, Result};
use crate::models::{AssayType, ResultRecord, StoredResult};
use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior, params};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const INSERT_RESULT: &str = "INSERT INTO results \
     (experiment_type, formulation_id, calculated_value, valid) \
     VALUES (?1, ?2, ?3, ?4)";

const SELECT_VALUES_BY_TYPE: &str = "SELECT calculated_value FROM results \
     WHERE experiment_type = ?1 AND calculated_value IS NOT NULL \
     ORDER BY id";

const SELECT_RESULTS_BY_TYPE: &str = "SELECT id, experiment_type, formulation_id, \
     calculated_value, valid, timestamp FROM results \
     WHERE experiment_type = ?1 AND calculated_value IS NOT NULL \
     ORDER BY id";

const SELECT_EXPERIMENT_TYPES: &str = "SELECT experiment_type FROM results \
     WHERE experiment_type IS NOT NULL \
     GROUP BY experiment_type ORDER BY MIN(id)";

/// Row as it comes out of SQLite, before the text columns are interpreted
struct RawResult {
    id: i64,
    experiment_type: String,
    formulation_id: Option<String>,
    calculated_value: f64,
    valid: Option<bool>,
    timestamp: String,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the results table exists
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening result database {}", path.display());
        let conn = Connection::open(path)?;
        Self::initialize(conn, busy_timeout)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?, Duration::ZERO)
    }

    fn initialize(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(CREATE_RESULTS_TABLE)?;
        Ok(Self { conn })
    }

    fn into_stored(raw: RawResult) -> Result<StoredResult> {
        let experiment_type = raw.experiment_type.parse::<AssayType>()?;
        let timestamp = NaiveDateTime::parse_from_str(&raw.timestamp, SQLITE_TIMESTAMP_FORMAT)
            .map_err(|source| AssayError::TimestampParsing {
                value: raw.timestamp.clone(),
                source,
            })?;

        Ok(StoredResult {
            id: raw.id,
            record: ResultRecord {
                experiment_type,
                formulation_id: raw.formulation_id.unwrap_or_default(),
                calculated_value: raw.calculated_value,
                valid: raw.valid.unwrap_or(false),
            },
            timestamp,
        })
    }
}

impl ResultStore for SqliteStore {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        self.append_batch(std::slice::from_ref(record))?;
        Ok(())
    }

    fn append_batch(&mut self, records: &[ResultRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare_cached(INSERT_RESULT)?;
            for record in records {
                stmt.execute(params![
                    record.experiment_type.as_str(),
                    record.formulation_id,
                    record.calculated_value,
                    record.valid,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Committed {} result row(s)", records.len());
        Ok(records.len())
    }

    fn query_by_type(&self, assay: AssayType) -> Result<Vec<f64>> {
        let mut stmt = self.conn.prepare_cached(SELECT_VALUES_BY_TYPE)?;
        let values = stmt
            .query_map([assay.as_str()], |row| row.get::<_, f64>(0))?
            .collect::<rusqlite::Result<Vec<f64>>>()?;
        Ok(values)
    }

    fn results_by_type(&self, assay: AssayType) -> Result<Vec<StoredResult>> {
        let mut stmt = self.conn.prepare_cached(SELECT_RESULTS_BY_TYPE)?;
        let raw = stmt
            .query_map([assay.as_str()], |row| {
                Ok(RawResult {
                    id: row.get(0)?,
                    experiment_type: row.get(1)?,
                    formulation_id: row.get(2)?,
                    calculated_value: row.get(3)?,
                    valid: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<RawResult>>>()?;

        raw.into_iter().map(Self::into_stored).collect()
    }

    fn experiment_types(&self) -> Result<Vec<AssayType>> {
        let mut stmt = self.conn.prepare_cached(SELECT_EXPERIMENT_TYPES)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        names.iter().map(|name| name.parse::<AssayType>()).collect()
    }
}
