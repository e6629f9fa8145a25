//! Reporting commands: stored results, summary statistics and type listing

use super::shared::{CommandStats, load_configuration, open_store, setup_logging};
use crate::cli::args::{OutputFormat, ResultsArgs, SummaryArgs, TypesArgs};
use crate::constants::INSUFFICIENT_DATA_MESSAGE;
use crate::error::Result;
use crate::models::{AssayType, StoredResult};
use crate::processor::{AssayProcessor, SummaryReport};
use crate::stats::SummaryStatistics;
use crate::store::ResultStore;
use colored::*;
use tracing::debug;

/// Summary for one type, or `None` when too few values are stored
pub fn summary_or_insufficient<S: ResultStore>(
    processor: &AssayProcessor<S>,
    assay: AssayType,
) -> Result<Option<SummaryReport>> {
    match processor.summarize(assay) {
        Ok(report) => Ok(Some(report)),
        Err(e) if e.is_insufficient_data() => {
            debug!("{}: {}", assay, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Results command runner
pub fn run_results(args: ResultsArgs) -> anyhow::Result<CommandStats> {
    setup_logging(&args.common)?;
    let assay: AssayType = args.assay.parse()?;

    let config = load_configuration(&args.common)?;
    let processor = AssayProcessor::new(open_store(&config)?, &config);

    let rows = processor.results(assay)?;
    let summary = summary_or_insufficient(&processor, assay)?;

    match args.common.output_format {
        OutputFormat::Human => print_results(assay, &rows, summary.as_ref()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&results_json(assay, &rows, summary.as_ref()))?
        ),
    }

    Ok(CommandStats::default())
}

/// Summary command runner
pub fn run_summary(args: SummaryArgs) -> anyhow::Result<CommandStats> {
    setup_logging(&args.common)?;
    let requested = args.assay.as_deref().map(str::parse::<AssayType>).transpose()?;

    let config = load_configuration(&args.common)?;
    let processor = AssayProcessor::new(open_store(&config)?, &config);

    let assays = match requested {
        Some(assay) => vec![assay],
        None => processor.experiment_types()?,
    };

    let mut summaries = Vec::with_capacity(assays.len());
    for assay in assays {
        summaries.push((assay, summary_or_insufficient(&processor, assay)?));
    }

    match args.common.output_format {
        OutputFormat::Human => {
            if summaries.is_empty() {
                println!("{}", "No results stored yet".bright_yellow());
            }
            for (assay, summary) in &summaries {
                println!("{}", assay.to_string().bright_green().bold());
                print_statistics(summary.as_ref().map(|s| &s.statistics));
            }
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = summaries
                .iter()
                .map(|(assay, summary)| summary_json(*assay, summary.as_ref()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(CommandStats::default())
}

/// Types command runner
pub fn run_types(args: TypesArgs) -> anyhow::Result<CommandStats> {
    setup_logging(&args.common)?;
    let config = load_configuration(&args.common)?;
    let processor = AssayProcessor::new(open_store(&config)?, &config);

    let types = processor.experiment_types()?;
    match args.common.output_format {
        OutputFormat::Human => {
            if types.is_empty() {
                println!("{}", "No results stored yet".bright_yellow());
            }
            for assay in &types {
                println!("{}", assay);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&types)?),
    }

    Ok(CommandStats::default())
}

fn summary_json(assay: AssayType, summary: Option<&SummaryReport>) -> serde_json::Value {
    match summary {
        Some(report) => serde_json::json!({
            "experiment_type": assay,
            "statistics": report.statistics,
        }),
        None => serde_json::json!({
            "experiment_type": assay,
            "statistics": null,
            "message": INSUFFICIENT_DATA_MESSAGE,
        }),
    }
}

/// Stored rows plus statistics, as one JSON document
pub fn results_json(
    assay: AssayType,
    rows: &[StoredResult],
    summary: Option<&SummaryReport>,
) -> serde_json::Value {
    let mut value = summary_json(assay, summary);
    value["results"] = serde_json::json!(rows);
    value
}

fn print_results(assay: AssayType, rows: &[StoredResult], summary: Option<&SummaryReport>) {
    println!(
        "{} {}",
        assay.to_string().bright_green().bold(),
        format!("({} stored)", rows.len()).bright_cyan()
    );
    for row in rows {
        let flag = if row.record.valid {
            "valid".green()
        } else {
            "invalid".red()
        };
        println!(
            "  {:>6}  {}  {:<20} {:>12.4}  {}",
            row.id,
            row.timestamp.format("%Y-%m-%d %H:%M:%S"),
            row.record.formulation_id,
            row.record.calculated_value,
            flag
        );
    }
    print_statistics(summary.map(|s| &s.statistics));
}

fn print_statistics(statistics: Option<&SummaryStatistics>) {
    match statistics {
        Some(stats) => {
            println!("  {} {}", "Count:".bright_cyan(), stats.count);
            println!("  {} {:.4}", "Median:".bright_cyan(), stats.median);
            println!("  {} {:.4}", "Mean:".bright_cyan(), stats.mean);
            println!("  {} {:.4}", "Std dev:".bright_cyan(), stats.std_dev);
        }
        None => println!("  {}", INSUFFICIENT_DATA_MESSAGE.bright_yellow()),
    }
}
