use assay_processor::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    match commands::run(command) {
        Ok(stats) if stats.has_failures() => {
            // Per-file errors have already been reported by the command
            process::exit(1);
        }
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Assay Processor - TNS and Zeta Potential result calculator");
    println!("==========================================================");
    println!();
    println!("Calculate formulation results from instrument exports (CSV or Excel)");
    println!("and keep them in a SQLite results database.");
    println!();
    println!("USAGE:");
    println!("    assay-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    upload      Process assay exports and store the results");
    println!("    results     Show stored results and statistics for one assay type");
    println!("    summary     Show statistics for one or every stored assay type");
    println!("    types       List the assay types present in the database");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Upload a plate-reader export and a directory of zeta runs:");
    println!("    assay-processor upload tns_plate_04.csv runs/zeta/");
    println!();
    println!("    # Preview results without writing to the database:");
    println!("    assay-processor upload --dry-run tns_plate_04.xlsx");
    println!();
    println!("    # Statistics for every stored assay type, as JSON:");
    println!("    assay-processor summary --format json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    assay-processor <COMMAND> --help");
}
