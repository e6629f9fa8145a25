//! Assay Processor Library
//!
//! Calculates results for laboratory assay exports and keeps them in a
//! results store for later reporting.
//!
//! This library provides tools for:
//! - Loading CSV and Excel exports into a uniform tabular form
//! - Classifying an export as TNS or Zeta Potential from its column layout
//! - Normalizing every formulation against its controls and flagging validity
//! - Storing results in SQLite with all-or-nothing batches
//! - Summarizing stored results per assay type

pub mod calculators;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod models;
pub mod processor;
pub mod stats;
pub mod store;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::AssayConfig;
pub use error::{AssayError, Result};
pub use models::{AssayType, ResultRecord};
pub use processor::{AssayProcessor, UploadReport};
