//! Command-line argument definitions for the assay processor
//!
//! This module defines the complete CLI interface using the clap derive API.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the assay processor
///
/// Calculates TNS and Zeta Potential results from instrument exports and
/// keeps them in a SQLite results database.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assay-processor",
    version,
    about = "Calculate and store TNS and Zeta Potential assay results",
    long_about = "Processes assay exports (CSV or Excel) from TNS fluorescence and Zeta Potential \
                  instruments. Each upload is classified by its column layout, every formulation \
                  is normalized against its controls and flagged valid or invalid, and the results \
                  are appended to a SQLite database for later reporting."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process one or more assay exports and store the results
    Upload(UploadArgs),
    /// Show stored results and summary statistics for one assay type
    Results(ResultsArgs),
    /// Show summary statistics for one or every stored assay type
    Summary(SummaryArgs),
    /// List the assay types present in the database
    Types(TypesArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct CommonArgs {
    /// SQLite database holding the results table
    ///
    /// Overrides the config file and the ASSAY_DATABASE environment variable.
    #[arg(long = "database", value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// JSON configuration file for thresholds and layouts. If not specified,
    /// looks for <config dir>/assay-processor/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Output format for results
    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except warnings and errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the upload command
#[derive(Debug, Clone, Parser)]
pub struct UploadArgs {
    /// Export files or directories to process
    ///
    /// Directories are searched (non-recursively) for .csv, .xlsx and .xls files.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Calculate and report without writing to the database
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Process exports with an unrecognized layout as TNS
    #[arg(long = "fallback-to-tns")]
    pub fallback_to_tns: bool,

    /// Data rows to drop below the header of TNS exports
    #[arg(long = "tns-skip-rows", value_name = "COUNT")]
    pub tns_skip_rows: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the results command
#[derive(Debug, Clone, Parser)]
pub struct ResultsArgs {
    /// Assay type, e.g. "TNS" or "Zeta Potential"
    #[arg(value_name = "TYPE")]
    pub assay: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the summary command
#[derive(Debug, Clone, Parser)]
pub struct SummaryArgs {
    /// Assay type to summarize; every stored type when omitted
    #[arg(value_name = "TYPE")]
    pub assay: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the types command
#[derive(Debug, Clone, Parser)]
pub struct TypesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Commands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::Upload(args) => &args.common,
            Commands::Results(args) => &args.common,
            Commands::Summary(args) => &args.common,
            Commands::Types(args) => &args.common,
        }
    }
}

impl CommonArgs {
    /// Get log level based on verbosity and quiet flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}
