//! Configuration management and validation.
//!
//! Provides configuration structures for the classifier, the per-assay
//! calculators and the result store, with layered loading
//! (defaults -> JSON file -> environment -> command line).

use crate::constants::{
    self, APP_DIR_NAME, CONFIG_FILE_NAME, DATABASE_ENV_VAR, DATABASE_FILE_NAME,
    DEFAULT_BUSY_TIMEOUT_MS,
};
use crate::error::{AssayError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Columns whose presence marks a Zeta Potential export
    pub marker_columns: Vec<String>,

    /// Any column name containing this substring marks a Zeta Potential export
    pub marker_substring: String,

    /// Treat unrecognized layouts as TNS instead of rejecting them
    pub fallback_to_tns: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            marker_columns: constants::ZETA_MARKER_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            marker_substring: constants::ZETA_MARKER_SUBSTRING.to_string(),
            fallback_to_tns: false,
        }
    }
}

/// TNS calculator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TnsConfig {
    /// Treatment readings, half-open column range
    pub treatment_columns: Range<usize>,

    /// Control readings, half-open column range
    pub control_columns: Range<usize>,

    /// Ratio above which a formulation is valid
    pub valid_threshold: f64,

    /// Data rows to drop below the header (units or sub-header rows)
    pub skip_leading_rows: usize,
}

impl Default for TnsConfig {
    fn default() -> Self {
        Self {
            treatment_columns: constants::tns::TREATMENT_START..constants::tns::TREATMENT_END,
            control_columns: constants::tns::CONTROL_START..constants::tns::CONTROL_END,
            valid_threshold: constants::tns::VALID_THRESHOLD,
            skip_leading_rows: 0,
        }
    }
}

impl TnsConfig {
    /// Number of columns a TNS export must have
    pub fn required_columns(&self) -> usize {
        (constants::tns::FORMULATION_COLUMN + 1)
            .max(self.treatment_columns.end)
            .max(self.control_columns.end)
    }
}

/// Zeta Potential calculator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZetaConfig {
    pub sample_column: String,
    pub zeta_column: String,

    /// Sample names starting with this prefix are control rows
    pub control_prefix: String,

    /// Ratio above which a formulation is valid
    pub valid_threshold: f64,
}

impl Default for ZetaConfig {
    fn default() -> Self {
        Self {
            sample_column: constants::zeta::SAMPLE_COLUMN.to_string(),
            zeta_column: constants::zeta::ZETA_COLUMN.to_string(),
            control_prefix: constants::zeta::CONTROL_PREFIX.to_string(),
            valid_threshold: constants::zeta::VALID_THRESHOLD,
        }
    }
}

/// Calculator settings for both assays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub tns: TnsConfig,
    pub zeta: ZetaConfig,
}

/// Global configuration for assay processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssayConfig {
    /// SQLite database holding the results table
    pub database_path: PathBuf,

    /// Milliseconds a writer waits on a locked database
    pub busy_timeout_ms: u64,

    /// Calculate and report without persisting anything
    pub dry_run: bool,

    pub classifier: ClassifierConfig,

    pub calculators: CalculatorConfig,
}

impl Default for AssayConfig {
    fn default() -> Self {
        Self {
            database_path: Self::default_database_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            dry_run: false,
            classifier: ClassifierConfig::default(),
            calculators: CalculatorConfig::default(),
        }
    }
}

impl AssayConfig {
    /// Default database location under the platform data directory
    pub fn default_database_path() -> PathBuf {
        match dirs::data_dir() {
            Some(dir) => dir.join(APP_DIR_NAME).join(DATABASE_FILE_NAME),
            None => PathBuf::from(DATABASE_FILE_NAME),
        }
    }

    /// Default configuration file location under the platform config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load a configuration file (JSON). Missing sections take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            AssayError::configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Layered load: defaults, then the config file if one is given or
    /// exists at the default location, then environment overrides.
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let default_path = Self::default_config_path().filter(|p| p.exists());
        let mut config = match config_file.or(default_path.as_deref()) {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        if let Ok(database) = std::env::var(DATABASE_ENV_VAR) {
            if !database.trim().is_empty() {
                debug!("Database path overridden by {}", DATABASE_ENV_VAR);
                config.database_path = PathBuf::from(database);
            }
        }

        Ok(config)
    }

    /// Set the database path
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Classify unrecognized layouts as TNS
    pub fn with_fallback_to_tns(mut self) -> Self {
        self.classifier.fallback_to_tns = true;
        self
    }

    /// Drop leading data rows from TNS exports
    pub fn with_tns_skip_leading_rows(mut self, rows: usize) -> Self {
        self.calculators.tns.skip_leading_rows = rows;
        self
    }

    /// Reject settings the calculators cannot work with
    pub fn validate(&self) -> Result<()> {
        let tns = &self.calculators.tns;
        for (name, range) in [
            ("treatment_columns", &tns.treatment_columns),
            ("control_columns", &tns.control_columns),
        ] {
            if range.is_empty() {
                return Err(AssayError::configuration(format!(
                    "TNS {} range {:?} is empty",
                    name, range
                )));
            }
            if range.contains(&constants::tns::FORMULATION_COLUMN) {
                return Err(AssayError::configuration(format!(
                    "TNS {} range {:?} overlaps the formulation column",
                    name, range
                )));
            }
        }
        if !tns.valid_threshold.is_finite() {
            return Err(AssayError::configuration("TNS valid_threshold must be finite"));
        }

        let zeta = &self.calculators.zeta;
        if zeta.sample_column.trim().is_empty() || zeta.zeta_column.trim().is_empty() {
            return Err(AssayError::configuration(
                "Zeta Potential column names must not be empty",
            ));
        }
        if zeta.control_prefix.is_empty() {
            return Err(AssayError::configuration(
                "Zeta Potential control prefix must not be empty",
            ));
        }
        if !zeta.valid_threshold.is_finite() {
            return Err(AssayError::configuration(
                "Zeta Potential valid_threshold must be finite",
            ));
        }

        if self.classifier.marker_columns.is_empty()
            && self.classifier.marker_substring.is_empty()
        {
            return Err(AssayError::configuration(
                "Classifier needs at least one Zeta Potential marker",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_assay_layouts() {
        let config = AssayConfig::default();
        assert_eq!(config.calculators.tns.treatment_columns, 1..4);
        assert_eq!(config.calculators.tns.control_columns, 8..12);
        assert_eq!(config.calculators.tns.required_columns(), 12);
        assert_eq!(config.calculators.tns.valid_threshold, 10.0);
        assert_eq!(config.calculators.zeta.control_prefix, "STD");
        assert_eq!(config.calculators.zeta.valid_threshold, 0.0);
        assert!(!config.classifier.fallback_to_tns);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"database_path": "/tmp/lab.db", "calculators": {{"zeta": {{"control_prefix": "CTRL"}}}}}}"#
        )
        .unwrap();

        let config = AssayConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/lab.db"));
        assert_eq!(config.calculators.zeta.control_prefix, "CTRL");
        assert_eq!(config.calculators.zeta.sample_column, "Sample Name");
        assert_eq!(config.calculators.tns.control_columns, 8..12);
    }

    #[test]
    fn test_malformed_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let result = AssayConfig::from_file(file.path());
        assert!(matches!(result, Err(AssayError::Configuration { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = AssayConfig::default();
        config.calculators.tns.control_columns = 8..8;
        assert!(config.validate().is_err());

        let mut config = AssayConfig::default();
        config.calculators.tns.treatment_columns = 0..3;
        assert!(config.validate().is_err());

        let mut config = AssayConfig::default();
        config.calculators.zeta.control_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = AssayConfig::default()
            .with_database_path("lab.db")
            .with_dry_run()
            .with_fallback_to_tns()
            .with_tns_skip_leading_rows(1);
        assert_eq!(config.database_path, PathBuf::from("lab.db"));
        assert!(config.dry_run);
        assert!(config.classifier.fallback_to_tns);
        assert_eq!(config.calculators.tns.skip_leading_rows, 1);
    }
}
