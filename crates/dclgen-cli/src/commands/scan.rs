//! `dclgen scan` — directory scan and CSV report.

use std::path::PathBuf;

use clap::Parser;
use dclgen_core::{summary, write_report, DclgenResult, Scanner};

#[derive(Parser)]
pub struct ScanArgs {
    /// Directory to scan for DCLGEN files.
    pub directory: PathBuf,

    /// Output file for the CSV report.
    #[arg(short, long, default_value = "dclgen_report.csv")]
    pub output: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: ScanArgs) -> DclgenResult<()> {
    let stats = Scanner::new().scan_directory(&args.directory)?;
    let written = write_report(&stats, &args.output)?;

    let summary = summary(&stats);
    println!(
        "Scanned {} candidate file(s): {} parsed, {} failed",
        summary.files_attempted, summary.files_parsed, summary.files_failed
    );
    for failure in &stats.failures {
        eprintln!("warning: {}: {}", failure.path.display(), failure.reason);
    }
    println!("CSV report generated: {}", written.display());
    Ok(())
}
