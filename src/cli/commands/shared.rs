//! Shared components for CLI commands
//!
//! Logging setup, configuration loading, store opening and input discovery
//! used by more than one command.

use crate::cli::args::CommonArgs;
use crate::config::AssayConfig;
use crate::constants::UPLOAD_FILE_PATTERNS;
use crate::error::Result;
use crate::store::SqliteStore;
use anyhow::Context;
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters reported back to `main`
#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub records_stored: usize,
    pub processing_time: Duration,
}

impl CommandStats {
    /// Any failed file makes the run exit non-zero
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("assay_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(args: &CommonArgs) -> Result<AssayConfig> {
    match &args.config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => debug!("No config file given, trying the default location"),
    }

    let mut config = AssayConfig::load_layered(args.config_file.as_deref())?;
    if let Some(database) = &args.database {
        config = config.with_database_path(database);
    }

    config.validate()?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Open the configured SQLite database
pub fn open_store(config: &AssayConfig) -> Result<SqliteStore> {
    SqliteStore::open(
        &config.database_path,
        Duration::from_millis(config.busy_timeout_ms),
    )
}

/// Expand upload arguments into a sorted list of files.
///
/// Directories are searched for the upload patterns (case-insensitive);
/// anything else is passed through so that a bad path is reported as a
/// failed upload rather than silently dropped.
pub fn expand_upload_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::default()
    };

    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = directory_matches(path, options)?;
        if found.is_empty() {
            warn!("No assay exports found in {}", path.display());
        }
        files.append(&mut found);
    }

    files.sort();
    files.dedup();
    debug!("Expanded {} argument(s) into {} file(s)", paths.len(), files.len());
    Ok(files)
}

fn directory_matches(dir: &Path, options: MatchOptions) -> anyhow::Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let mut found = Vec::new();

    for pattern in UPLOAD_FILE_PATTERNS {
        let full_pattern = format!("{}/{}", escaped, pattern);
        let entries = glob::glob_with(&full_pattern, options)
            .with_context(|| format!("Invalid search pattern '{}'", full_pattern))?;

        for entry in entries {
            let file = entry
                .with_context(|| format!("Failed to read directory {}", dir.display()))?;
            if file.is_file() {
                found.push(file);
            }
        }
    }

    Ok(found)
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
