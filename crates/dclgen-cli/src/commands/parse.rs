//! `dclgen parse` — single-file inspection.

use std::path::PathBuf;

use clap::Parser;
use dclgen_core::{DclgenParser, DclgenResult, TableDeclaration};

#[derive(Parser)]
pub struct ParseArgs {
    /// Path to the DCLGEN file to parse.
    pub file: PathBuf,

    /// Echo the raw file content before the parsed summary.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit the parse result as JSON instead of text.
    #[arg(long = "format", default_value = "text")]
    pub format: String,
}

pub fn run(args: ParseArgs) -> DclgenResult<()> {
    let content = std::fs::read_to_string(&args.file)?;

    if args.verbose {
        println!("File Content:");
        println!("{}", "=".repeat(72));
        println!("{content}");
        println!("{}", "=".repeat(72));
    }

    let table = DclgenParser::new().parse(&content)?;

    if args.format.eq_ignore_ascii_case("json") {
        // Serialization of the plain data model cannot fail.
        println!("{}", serde_json::to_string_pretty(&table).unwrap());
    } else {
        print_table(&table);
    }
    Ok(())
}

fn print_table(table: &TableDeclaration) {
    println!("Table:  {}", table.table_name);
    println!(
        "Schema: {}",
        table.schema_name.as_deref().unwrap_or("(none)")
    );
    println!("Columns: {}", table.attributes.len());
    println!();
    println!("{:<32} {:<20} {:<8}", "NAME", "TYPE", "NULLABLE");
    for attr in &table.attributes {
        println!(
            "{:<32} {:<20} {:<8}",
            attr.name,
            attr.semantic_type.to_string(),
            if attr.nullable { "yes" } else { "no" },
        );
    }
    for diagnostic in &table.diagnostics {
        eprintln!("warning: {}", diagnostic.message);
    }
}
