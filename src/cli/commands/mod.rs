//! Command implementations for the assay processor CLI
//!
//! Each command is implemented in its own module:
//! - `upload`: process exports and store their results
//! - `report`: stored results, summary statistics and type listing

pub mod report;
pub mod shared;
pub mod upload;

pub use shared::CommandStats;

use crate::cli::args::Commands;

/// Dispatch to the handler for a subcommand
pub fn run(command: Commands) -> anyhow::Result<CommandStats> {
    match command {
        Commands::Upload(args) => upload::run_upload(args),
        Commands::Results(args) => report::run_results(args),
        Commands::Summary(args) => report::run_summary(args),
        Commands::Types(args) => report::run_types(args),
    }
}
