//! CSV report generation over scan results.
//!
//! One data row per successfully parsed table, sorted by table name, with
//! a per-type count column for every [`SemanticType`] kind so the header
//! is identical regardless of which types actually occur. The file is
//! written to a temporary location in the destination directory and
//! atomically persisted: a failed write never leaves a corrupt partial
//! report behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::scanner::ScanStats;
use crate::types::SemanticType;
use crate::{DclgenError, DclgenResult};

/// Summary statistics over one scan, for display next to the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub files_attempted: usize,
    pub files_parsed: usize,
    pub files_failed: usize,
    /// Aggregate column count per type kind, in [`SemanticType::KINDS`]
    /// order.
    pub type_totals: Vec<(String, usize)>,
}

/// Summarize a scan without writing anything.
pub fn summary(stats: &ScanStats) -> ReportSummary {
    let mut totals = [0usize; SemanticType::KINDS.len()];
    for parsed in &stats.parsed {
        for attr in &parsed.table.attributes {
            totals[kind_index(attr.semantic_type.kind())] += 1;
        }
    }
    ReportSummary {
        files_attempted: stats.files_attempted,
        files_parsed: stats.parsed.len(),
        files_failed: stats.failures.len(),
        type_totals: SemanticType::KINDS
            .iter()
            .zip(totals)
            .map(|(kind, count)| (kind.to_string(), count))
            .collect(),
    }
}

/// Write the CSV report for one scan. Appends a `.csv` extension when the
/// given path lacks one and returns the path actually written.
pub fn write_report(stats: &ScanStats, output: &Path) -> DclgenResult<PathBuf> {
    let output = ensure_csv_extension(output);
    let dir = output.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };

    let mut writer = csv::Writer::from_writer(tmp);
    write_rows(stats, &mut writer)?;
    let tmp = writer
        .into_inner()
        .map_err(|err| DclgenError::Report(err.to_string()))?;
    tmp.persist(&output).map_err(|err| err.error)?;

    info!(path = %output.display(), tables = stats.parsed.len(), "report written");
    Ok(output)
}

fn write_rows<W: std::io::Write>(
    stats: &ScanStats,
    writer: &mut csv::Writer<W>,
) -> DclgenResult<()> {
    let mut header = vec!["table_name", "schema_name", "column_count"];
    header.extend(SemanticType::KINDS);
    writer
        .write_record(&header)
        .map_err(|err| DclgenError::Report(err.to_string()))?;

    let mut tables: Vec<_> = stats.parsed.iter().collect();
    tables.sort_by(|a, b| a.table.table_name.cmp(&b.table.table_name));

    for parsed in tables {
        let table = &parsed.table;
        let mut counts = [0usize; SemanticType::KINDS.len()];
        for attr in &table.attributes {
            counts[kind_index(attr.semantic_type.kind())] += 1;
        }

        let mut record = vec![
            table.table_name.clone(),
            table.schema_name.clone().unwrap_or_default(),
            table.attributes.len().to_string(),
        ];
        record.extend(counts.iter().map(|c| c.to_string()));
        writer
            .write_record(&record)
            .map_err(|err| DclgenError::Report(err.to_string()))?;
    }

    writer
        .flush()
        .map_err(|err| DclgenError::Report(err.to_string()))?;
    Ok(())
}

fn kind_index(kind: &str) -> usize {
    SemanticType::KINDS
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(SemanticType::KINDS.len() - 1)
}

fn ensure_csv_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".csv");
            PathBuf::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ColumnAttribute, TableDeclaration};
    use crate::scanner::ParsedFile;

    fn attr(name: &str, semantic_type: SemanticType) -> ColumnAttribute {
        ColumnAttribute {
            name: name.to_string(),
            semantic_type,
            nullable: true,
            comment: None,
        }
    }

    fn parsed(table_name: &str, schema: Option<&str>, attrs: Vec<ColumnAttribute>) -> ParsedFile {
        ParsedFile {
            path: PathBuf::from(format!("{table_name}.dclgen")),
            table: TableDeclaration {
                schema_name: schema.map(str::to_string),
                table_name: table_name.to_string(),
                attributes: attrs,
                diagnostics: Vec::new(),
            },
        }
    }

    fn sample_stats() -> ScanStats {
        ScanStats {
            files_attempted: 3,
            parsed: vec![
                parsed(
                    "ORDERS",
                    Some("SALES"),
                    vec![
                        attr("ORD_ID", SemanticType::Integer),
                        attr("ORD_AMT", SemanticType::Decimal(9, 2)),
                    ],
                ),
                parsed(
                    "EMPLOYEE",
                    Some("HR"),
                    vec![
                        attr("EMP_ID", SemanticType::Decimal(9, 0)),
                        attr("EMP_NAME", SemanticType::Char(30)),
                        attr("HIREDATE", SemanticType::Date),
                    ],
                ),
            ],
            failures: vec![crate::scanner::ScanFailure {
                path: PathBuf::from("broken.dclgen"),
                reason: "no record start".to_string(),
            }],
        }
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_report_shape() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");
        let written = write_report(&sample_stats(), &out).unwrap();
        assert_eq!(written, out);

        let rows = read_rows(&out);
        // Header plus one row per parsed table
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "table_name");
        assert_eq!(rows[0][1], "schema_name");
        assert_eq!(rows[0][2], "column_count");
        assert_eq!(rows[0].len(), 3 + SemanticType::KINDS.len());

        // Rows sorted by table name
        assert_eq!(rows[1][0], "EMPLOYEE");
        assert_eq!(rows[1][1], "HR");
        assert_eq!(rows[1][2], "3");
        assert_eq!(rows[2][0], "ORDERS");

        // Per-type counts: EMPLOYEE has 1 char, 1 decimal, 1 date
        let kind_col = |kind: &str| 3 + kind_index(kind);
        assert_eq!(rows[1][kind_col("char")], "1");
        assert_eq!(rows[1][kind_col("decimal")], "1");
        assert_eq!(rows[1][kind_col("date")], "1");
        assert_eq!(rows[1][kind_col("integer")], "0");
        assert_eq!(rows[2][kind_col("integer")], "1");
    }

    #[test]
    fn test_csv_extension_appended() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report");
        let written = write_report(&sample_stats(), &out).unwrap();
        assert_eq!(written.extension().unwrap(), "csv");
        assert!(written.exists());
    }

    #[test]
    fn test_unwritable_path_fails_loudly() {
        let out = Path::new("/nonexistent-dir-for-report/report.csv");
        let err = write_report(&sample_stats(), out).unwrap_err();
        assert!(matches!(err, DclgenError::Io(_)));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");
        let stats = ScanStats {
            files_attempted: 1,
            parsed: vec![parsed("ODD,NAME", None, vec![])],
            failures: vec![],
        };
        write_report(&stats, &out).unwrap();

        let rows = read_rows(&out);
        assert_eq!(rows[1][0], "ODD,NAME");
        let raw = std::fs::read_to_string(&out).unwrap();
        assert!(raw.contains("\"ODD,NAME\""));
    }

    #[test]
    fn test_summary_counts() {
        let summary = summary(&sample_stats());
        assert_eq!(summary.files_attempted, 3);
        assert_eq!(summary.files_parsed, 2);
        assert_eq!(summary.files_failed, 1);
        let total = |kind: &str| {
            summary
                .type_totals
                .iter()
                .find(|(k, _)| k == kind)
                .map(|(_, c)| *c)
                .unwrap()
        };
        assert_eq!(total("decimal"), 2);
        assert_eq!(total("char"), 1);
        assert_eq!(total("blob"), 0);
    }
}
