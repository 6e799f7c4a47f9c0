//! dclgen CLI — inspect DCLGEN files and report on directories of them.
//!
//! `dclgen parse <file>` parses a single DCLGEN file and prints the
//! recovered table metadata; `dclgen scan <dir>` scans a directory tree
//! and writes a CSV report over every table found.

use clap::{Parser, Subcommand};

mod commands;

/// dclgen CLI.
#[derive(Parser)]
#[command(name = "dclgen", about = "DCLGEN copybook inspection and table reporting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a single DCLGEN file and print its table metadata.
    Parse(commands::parse::ParseArgs),
    /// Scan a directory for DCLGEN files and write a CSV report.
    Scan(commands::scan::ScanArgs),
}

fn main() {
    let cli = Cli::parse();

    // Enabled by --verbose or RUST_LOG env var.
    let verbose = match &cli.command {
        Commands::Parse(args) => args.verbose,
        Commands::Scan(args) => args.verbose,
    };
    if verbose || std::env::var("RUST_LOG").is_ok() {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::EnvFilter::from_default_env()
        } else {
            tracing_subscriber::EnvFilter::new("debug")
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Parse(args) => commands::parse::run(args),
        Commands::Scan(args) => commands::scan::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
