//! Application constants for the assay processor
//!
//! This module contains the layout constants, default thresholds and
//! persisted names used throughout the application.

// =============================================================================
// Assay Type Names
// =============================================================================

/// Persisted name of the TNS fluorescence-ratio assay
pub const TNS_NAME: &str = "TNS";

/// Persisted name of the Zeta Potential assay
pub const ZETA_POTENTIAL_NAME: &str = "Zeta Potential";

// =============================================================================
// TNS Layout
// =============================================================================

/// TNS layout: fixed column regions addressed by zero-based index
pub mod tns {
    /// Column holding the formulation identifier
    pub const FORMULATION_COLUMN: usize = 0;

    /// Triplicate treatment readings, half-open range [1, 4)
    pub const TREATMENT_START: usize = 1;
    pub const TREATMENT_END: usize = 4;

    /// Control readings, half-open range [8, 12)
    pub const CONTROL_START: usize = 8;
    pub const CONTROL_END: usize = 12;

    /// A formulation passes when its ratio exceeds this value
    pub const VALID_THRESHOLD: f64 = 10.0;
}

// =============================================================================
// Zeta Potential Layout
// =============================================================================

/// Zeta Potential layout: labelled columns and control prefix
pub mod zeta {
    pub const SAMPLE_COLUMN: &str = "Sample Name";

    pub const ZETA_COLUMN: &str = "Zeta Potential (mV)";

    /// Sample names starting with this prefix are control (standard) rows
    pub const CONTROL_PREFIX: &str = "STD";

    /// A formulation passes when its ratio exceeds this value
    pub const VALID_THRESHOLD: f64 = 0.0;
}

// =============================================================================
// Classification
// =============================================================================

/// Columns whose presence marks a Zeta Potential export
pub const ZETA_MARKER_COLUMNS: &[&str] = &["Measurement Type", "Zeta Potential (mV)"];

/// Any column name containing this substring marks a Zeta Potential export
pub const ZETA_MARKER_SUBSTRING: &str = "STD";

// =============================================================================
// File Formats
// =============================================================================

/// Extensions accepted as comma-delimited text
pub const CSV_EXTENSIONS: &[&str] = &["csv"];

/// Extensions accepted as spreadsheet workbooks (first worksheet is read)
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Glob patterns used when an upload path is a directory
pub const UPLOAD_FILE_PATTERNS: &[&str] = &["*.csv", "*.xlsx", "*.xls"];

// =============================================================================
// Storage
// =============================================================================

/// Application directory name under the platform data/config directories
pub const APP_DIR_NAME: &str = "assay-processor";

/// Default SQLite database file name
pub const DATABASE_FILE_NAME: &str = "results.db";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "ASSAY_DATABASE";

/// How long a writer waits for a locked database before failing
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// SQLite CURRENT_TIMESTAMP text format
pub const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Results table definition, matching the layout existing databases use
pub const CREATE_RESULTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    experiment_type TEXT,
    formulation_id TEXT,
    calculated_value REAL,
    valid BOOLEAN,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
)";

// =============================================================================
// Reporting
// =============================================================================

/// Shown instead of statistics when fewer than two values are stored
pub const INSUFFICIENT_DATA_MESSAGE: &str = "insufficient data for this assay type";
