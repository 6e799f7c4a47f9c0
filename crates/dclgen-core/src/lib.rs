//! DCLGEN copybook parsing for DB2 table metadata.
//!
//! This crate recovers structured table metadata from DCLGEN files — the
//! fixed-format text the DB2 DCLGEN utility emits, embedding a COBOL
//! copybook description of a relational table. It provides:
//! - Line classification and a state-machine parser for single documents
//! - A COBOL-to-DB2 type mapper (PIC clauses, usage clauses, annotations)
//! - A directory scanner that tolerates per-file failures
//! - A CSV report generator over scan results
//!
//! # Example
//!
//! ```
//! use dclgen_core::DclgenParser;
//!
//! let source = r#"
//!       * DCLGEN TABLE(HR.EMPLOYEE)
//!        01  DCLEMPLOYEE.
//!            10 EMP-ID    PIC S9(9) COMP-3.
//!            10 EMP-NAME  PIC X(30).
//! "#;
//!
//! let table = DclgenParser::new().parse(source).unwrap();
//! assert_eq!(table.table_name, "EMPLOYEE");
//! assert_eq!(table.attributes.len(), 2);
//! ```

pub mod classify;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod types;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while parsing or reporting on DCLGEN files.
#[derive(Error, Debug)]
pub enum DclgenError {
    /// Document is structurally unusable (no table name or no record start)
    #[error("structural error: {reason}")]
    Structural { reason: String },

    /// Scan root is not a directory
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Report serialization failure
    #[error("report error: {0}")]
    Report(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for DCLGEN operations.
pub type DclgenResult<T> = Result<T, DclgenError>;

pub use classify::{classify_line, FieldLine, LineClass, TypeAnnotation};
pub use parser::{
    ColumnAttribute, DclgenParser, Diagnostic, DiagnosticKind, TableDeclaration,
};
pub use report::{summary, write_report, ReportSummary};
pub use scanner::{ParsedFile, ScanFailure, ScanOptions, Scanner, ScanStats};
pub use types::{map_type, FieldUsage, SemanticType};
