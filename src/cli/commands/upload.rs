//! Upload command implementation
//!
//! Processes every export named on the command line, one batch per file.
//! A failing file is reported and counted; the remaining files are still
//! processed.

use super::shared::{
    CommandStats, create_progress_bar, expand_upload_paths, load_configuration, open_store,
    setup_logging,
};
use crate::cli::args::{OutputFormat, UploadArgs};
use crate::config::AssayConfig;
use crate::error::AssayError;
use crate::processor::{AssayProcessor, UploadReport};
use crate::store::{MemoryStore, ResultStore};
use colored::*;
use indicatif::HumanDuration;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

/// Result of one file in a multi-file upload
#[derive(Debug)]
pub enum FileOutcome {
    Processed(UploadReport),
    Failed { path: PathBuf, error: AssayError },
}

/// Upload command runner
pub fn run_upload(args: UploadArgs) -> anyhow::Result<CommandStats> {
    let start_time = Instant::now();

    setup_logging(&args.common)?;
    debug!("Command line arguments: {:?}", args);

    let config = apply_upload_overrides(load_configuration(&args.common)?, &args);
    let files = expand_upload_paths(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No assay exports found in the given paths");
    }
    info!("Uploading {} file(s)", files.len());

    let show_progress = args.common.show_progress() && files.len() > 1;
    let (outcomes, dry_run) = if config.dry_run {
        let mut processor = AssayProcessor::new(MemoryStore::new(), &config);
        let outcomes = process_files(&mut processor, &files, show_progress);
        (outcomes, processor.is_dry_run())
    } else {
        let mut processor = AssayProcessor::new(open_store(&config)?, &config);
        let outcomes = process_files(&mut processor, &files, show_progress);
        (outcomes, processor.is_dry_run())
    };

    let mut stats = collect_stats(&outcomes);
    stats.processing_time = start_time.elapsed();

    match args.common.output_format {
        OutputFormat::Human => print_human_report(&outcomes, &stats, &config, dry_run),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&upload_json(&outcomes))?),
    }

    Ok(stats)
}

/// Apply upload flags on top of the layered configuration
fn apply_upload_overrides(mut config: AssayConfig, args: &UploadArgs) -> AssayConfig {
    if args.dry_run {
        config = config.with_dry_run();
    }
    if args.fallback_to_tns {
        config = config.with_fallback_to_tns();
    }
    if let Some(rows) = args.tns_skip_rows {
        config = config.with_tns_skip_leading_rows(rows);
    }
    config
}

/// Process files in order, each as its own batch
pub fn process_files<S: ResultStore>(
    processor: &mut AssayProcessor<S>,
    files: &[PathBuf],
    show_progress: bool,
) -> Vec<FileOutcome> {
    let pb = show_progress.then(|| create_progress_bar(files.len() as u64, "Processing exports"));

    let outcomes = files
        .iter()
        .map(|path| {
            let outcome = match processor.process_file(path) {
                Ok(report) => FileOutcome::Processed(report),
                Err(error) => {
                    error!("Failed to process {}: {}", path.display(), error);
                    FileOutcome::Failed {
                        path: path.clone(),
                        error,
                    }
                }
            };
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            outcome
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    outcomes
}

fn collect_stats(outcomes: &[FileOutcome]) -> CommandStats {
    let mut stats = CommandStats::default();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Processed(report) => {
                stats.files_processed += 1;
                stats.records_stored += report.records_stored;
            }
            FileOutcome::Failed { .. } => stats.files_failed += 1,
        }
    }
    stats
}

/// Machine-readable report: one entry per file
pub fn upload_json(outcomes: &[FileOutcome]) -> serde_json::Value {
    let files: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|outcome| match outcome {
            FileOutcome::Processed(report) => serde_json::json!({
                "status": "processed",
                "report": report,
            }),
            FileOutcome::Failed { path, error } => serde_json::json!({
                "status": "failed",
                "source": path.display().to_string(),
                "error": error.to_string(),
            }),
        })
        .collect();

    serde_json::json!({ "files": files })
}

fn print_human_report(
    outcomes: &[FileOutcome],
    stats: &CommandStats,
    config: &AssayConfig,
    dry_run: bool,
) {
    for outcome in outcomes {
        match outcome {
            FileOutcome::Processed(report) => print_file_report(report),
            FileOutcome::Failed { path, error } => {
                println!("{} {}", "✗".bright_red().bold(), path.display());
                println!("    {}", error.to_string().red());
            }
        }
    }

    println!();
    println!("{}", "Upload Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white().bold()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_white().bold()
        );
    }
    if dry_run {
        println!("  {}", "Dry run: nothing was written".bright_yellow());
    } else {
        println!(
            "  {} {} into {}",
            "Records stored:".bright_cyan(),
            stats.records_stored.to_string().bright_white().bold(),
            config.database_path.display()
        );
    }
    println!(
        "  {} {}",
        "Time:".bright_cyan(),
        HumanDuration(stats.processing_time)
    );
}

fn print_file_report(report: &UploadReport) {
    println!(
        "{} {} {}",
        "✓".bright_green().bold(),
        report.source,
        format!("[{}]", report.assay).bright_cyan()
    );
    if let Some(control_mean) = report.control_mean {
        println!("    control mean: {:.4}", control_mean);
    }
    for record in &report.records {
        let flag = if record.valid {
            "valid".green()
        } else {
            "invalid".red()
        };
        println!(
            "    {:<20} {:>12.4}  {}",
            record.formulation_id, record.calculated_value, flag
        );
    }
    for skipped in &report.skipped {
        println!(
            "    {} line {} ({}): {}",
            "skipped".bright_yellow(),
            skipped.line,
            skipped.formulation_id,
            skipped.reason
        );
    }
    println!(
        "    {} of {} valid, {} stored",
        report.valid_count,
        report.records.len(),
        report.records_stored
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_export(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_failed_file_does_not_stop_the_rest() {
        let bad = write_export(".txt", "Sample Name,Zeta Potential (mV)\nSTD1,-12\n");
        let good = write_export(
            ".csv",
            "Sample Name,Zeta Potential (mV)\nSTD1,-12\nF1,-6\nF2,-3\n",
        );
        let files = vec![bad.path().to_path_buf(), good.path().to_path_buf()];
        let mut processor = AssayProcessor::new(MemoryStore::new(), &AssayConfig::default());

        let outcomes = process_files(&mut processor, &files, false);

        assert!(matches!(
            outcomes[0],
            FileOutcome::Failed {
                error: AssayError::UnsupportedFormat { .. },
                ..
            }
        ));
        assert!(matches!(outcomes[1], FileOutcome::Processed(_)));

        let stats = collect_stats(&outcomes);
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.records_stored, 2);
        assert!(stats.has_failures());
        assert_eq!(processor.store().len(), 2);
    }

    #[test]
    fn test_upload_json_shape() {
        let good = write_export(".csv", "Sample Name,Zeta Potential (mV)\nSTD1,-12\nF1,-6\n");
        let files = vec![good.path().to_path_buf(), PathBuf::from("missing.xlsx")];
        let mut processor = AssayProcessor::new(MemoryStore::new(), &AssayConfig::default());

        let json = upload_json(&process_files(&mut processor, &files, false));
        let entries = json["files"].as_array().unwrap();

        assert_eq!(entries[0]["status"], "processed");
        assert_eq!(entries[0]["report"]["assay"], "Zeta Potential");
        assert_eq!(entries[0]["report"]["records_stored"], 1);
        assert_eq!(entries[1]["status"], "failed");
        assert_eq!(entries[1]["source"], "missing.xlsx");
    }

    #[test]
    fn test_flag_overrides() {
        let args = UploadArgs {
            paths: vec![PathBuf::from("run.csv")],
            dry_run: true,
            fallback_to_tns: true,
            tns_skip_rows: Some(1),
            common: crate::cli::args::CommonArgs {
                database: None,
                config_file: None,
                output_format: OutputFormat::Human,
                verbose: 0,
                quiet: false,
            },
        };

        let config = apply_upload_overrides(AssayConfig::default(), &args);
        assert!(config.dry_run);
        assert!(config.classifier.fallback_to_tns);
        assert_eq!(config.calculators.tns.skip_leading_rows, 1);
    }
}
