//! Line classification for DCLGEN documents.
//!
//! Classification is pure and never fails: a line that matches nothing is
//! Ignorable and the parser decides at end of input whether the state it
//! accumulated is sufficient. Matching is token-based rather than strictly
//! column-based; the only fixed-format rule kept is the comment indicator.

use crate::types::FieldUsage;

/// A field declaration line: level number, field name, picture and usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine {
    /// COBOL level number (02..49).
    pub level: u8,
    /// Field name as written in the source.
    pub name: String,
    /// Raw picture string, empty for usage-only items (COMP-1/COMP-2).
    pub picture: String,
    /// Recognized usage clause.
    pub usage: FieldUsage,
}

/// A DB2-type comment annotation applying to the next field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    /// The type expression, e.g. `VARCHAR(1000)` or `DATE`.
    pub text: String,
    /// Whether the annotation carries a NOT NULL marker.
    pub not_null: bool,
}

/// Structural role of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Names the DB2 table: a `DCLGEN TABLE(..)` or `TABLE: ..` header
    /// comment, or an `EXEC SQL DECLARE .. TABLE` statement.
    TableMarker {
        schema: Option<String>,
        table: String,
    },
    /// An 01-level group item opening the copybook record.
    RecordStart { name: String },
    /// A sub-field declaration with a picture or float usage clause.
    FieldDecl(FieldLine),
    /// A comment naming the DB2 type of the following field.
    TypeAnnotation(TypeAnnotation),
    /// END-EXEC terminator.
    RecordEnd,
    /// Blank, plain comment, or anything unrecognized.
    Ignorable,
}

/// DB2 type keywords that identify a comment line as a type annotation.
const DB2_TYPE_KEYWORDS: [&str; 17] = [
    "CHAR",
    "VARCHAR",
    "SMALLINT",
    "INTEGER",
    "INT",
    "BIGINT",
    "DECIMAL",
    "NUMERIC",
    "FLOAT",
    "REAL",
    "DOUBLE",
    "DATE",
    "TIME",
    "TIMESTAMP",
    "BLOB",
    "CLOB",
    "DBCLOB",
];

/// Classify one raw source line.
pub fn classify_line(line: &str) -> LineClass {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineClass::Ignorable;
    }

    if is_comment(line) {
        return classify_comment(trimmed);
    }

    let upper = trimmed.to_uppercase();

    if let Some(marker) = declare_marker(&upper) {
        return marker;
    }

    if upper.contains("END-EXEC") {
        return LineClass::RecordEnd;
    }

    classify_data_entry(trimmed)
}

/// A comment line: first non-blank character is `*` or `/`, or the
/// fixed-format indicator in column 7 is one of those.
fn is_comment(line: &str) -> bool {
    if matches!(line.trim_start().chars().next(), Some('*') | Some('/')) {
        return true;
    }
    matches!(line.chars().nth(6), Some('*') | Some('/'))
}

fn classify_comment(trimmed: &str) -> LineClass {
    let content = trimmed
        .trim_start_matches(['*', '/'])
        .trim_end_matches('*')
        .trim();
    let upper = content.to_uppercase();

    // DCLGEN header idiom: DCLGEN TABLE(SCHEMA.TABLE)
    if let Some(pos) = upper.find("DCLGEN TABLE(") {
        let rest = &content[pos + "DCLGEN TABLE(".len()..];
        if let Some(close) = rest.find(')') {
            return table_marker(&rest[..close]);
        }
    }

    // Generic header idiom: TABLE: SCHEMA.TABLE
    if let Some(pos) = upper.find("TABLE:") {
        let rest = content[pos + "TABLE:".len()..].trim();
        if let Some(name) = rest.split_whitespace().next() {
            return table_marker(name);
        }
    }

    annotation_from_comment(content, &upper)
}

/// Build a TableMarker from a possibly schema-qualified name.
fn table_marker(qualified: &str) -> LineClass {
    let qualified = qualified.trim();
    if qualified.is_empty() {
        return LineClass::Ignorable;
    }
    match qualified.split_once('.') {
        Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
            LineClass::TableMarker {
                schema: Some(schema.to_string()),
                table: table.to_string(),
            }
        }
        _ => LineClass::TableMarker {
            schema: None,
            table: qualified.trim_matches('.').to_string(),
        },
    }
}

/// Recognize a type annotation inside comment text. DCLGEN emits these as
/// `* <COLUMN-NAME> <DB2-TYPE>` to disambiguate types that COBOL picture
/// syntax cannot express.
fn annotation_from_comment(content: &str, upper: &str) -> LineClass {
    for (idx, token) in upper.split_whitespace().enumerate() {
        let base = token.split('(').next().unwrap_or(token);
        if DB2_TYPE_KEYWORDS.contains(&base) {
            let text: String = content
                .split_whitespace()
                .skip(idx)
                .collect::<Vec<_>>()
                .join(" ");
            let not_null = upper.contains("NOT NULL");
            return LineClass::TypeAnnotation(TypeAnnotation { text, not_null });
        }
    }
    LineClass::Ignorable
}

/// Recognize `EXEC SQL DECLARE <name> TABLE` as a table marker. DCLGEN
/// always emits the DECLARE statement and it carries the authoritative
/// table name.
fn declare_marker(upper: &str) -> Option<LineClass> {
    let pos = upper.find("EXEC SQL DECLARE")?;
    let rest = upper[pos + "EXEC SQL DECLARE".len()..].trim_start();
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?;
    if tokens.next()? != "TABLE" {
        return None;
    }
    Some(table_marker(name))
}

/// Classify a data-division entry by its level number.
fn classify_data_entry(trimmed: &str) -> LineClass {
    let mut tokens = trimmed.split_whitespace();
    let level: u8 = match tokens.next().and_then(|t| t.parse().ok()) {
        Some(level) if (1..=49).contains(&level) => level,
        _ => return LineClass::Ignorable,
    };
    let name = match tokens.next() {
        Some(name) => name.trim_end_matches('.').to_string(),
        None => return LineClass::Ignorable,
    };

    if level == 1 {
        return LineClass::RecordStart { name };
    }

    let mut picture = String::new();
    let mut usage = FieldUsage::Display;
    while let Some(token) = tokens.next() {
        let clean = token.trim_end_matches('.').to_uppercase();
        match clean.as_str() {
            "PIC" | "PICTURE" => {
                if let Some(pic) = tokens.next() {
                    picture = pic.trim_end_matches('.').to_string();
                }
            }
            "USAGE" | "IS" => {}
            "COMP" | "COMP-4" | "COMP-5" | "BINARY" => usage = FieldUsage::Binary,
            "COMP-1" | "COMPUTATIONAL-1" => usage = FieldUsage::Comp1,
            "COMP-2" | "COMPUTATIONAL-2" => usage = FieldUsage::Comp2,
            "COMP-3" | "COMPUTATIONAL-3" | "PACKED-DECIMAL" => {
                usage = FieldUsage::PackedDecimal
            }
            _ => {}
        }
    }

    // Group items have no picture; COMP-1/COMP-2 items legitimately
    // omit one.
    if picture.is_empty() && !matches!(usage, FieldUsage::Comp1 | FieldUsage::Comp2) {
        return LineClass::Ignorable;
    }

    LineClass::FieldDecl(FieldLine {
        level,
        name,
        picture,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_noise_lines() {
        assert_eq!(classify_line(""), LineClass::Ignorable);
        assert_eq!(classify_line("   "), LineClass::Ignorable);
        assert_eq!(
            classify_line("      ****************************"),
            LineClass::Ignorable
        );
        assert_eq!(classify_line("       MOVE A TO B."), LineClass::Ignorable);
    }

    #[test]
    fn test_dclgen_header_marker() {
        let class = classify_line("      * DCLGEN TABLE(HR.EMPLOYEE)                    *");
        assert_eq!(
            class,
            LineClass::TableMarker {
                schema: Some("HR".to_string()),
                table: "EMPLOYEE".to_string(),
            }
        );
    }

    #[test]
    fn test_generic_table_marker() {
        let class = classify_line("      * TABLE: HR.EMPLOYEE");
        assert_eq!(
            class,
            LineClass::TableMarker {
                schema: Some("HR".to_string()),
                table: "EMPLOYEE".to_string(),
            }
        );
    }

    #[test]
    fn test_marker_without_schema() {
        let class = classify_line("      * DCLGEN TABLE(EIP_ADT_TRAIL)");
        assert_eq!(
            class,
            LineClass::TableMarker {
                schema: None,
                table: "EIP_ADT_TRAIL".to_string(),
            }
        );
    }

    #[test]
    fn test_declare_marker() {
        let class = classify_line("           EXEC SQL DECLARE SCHEMA1.TABLE1 TABLE");
        assert_eq!(
            class,
            LineClass::TableMarker {
                schema: Some("SCHEMA1".to_string()),
                table: "TABLE1".to_string(),
            }
        );
    }

    #[test]
    fn test_record_start() {
        assert_eq!(
            classify_line("       01  DCLEMPLOYEE."),
            LineClass::RecordStart {
                name: "DCLEMPLOYEE".to_string()
            }
        );
    }

    #[test]
    fn test_field_decl_packed() {
        let class = classify_line("           10 EMP-ID    PIC S9(9) COMP-3.");
        assert_eq!(
            class,
            LineClass::FieldDecl(FieldLine {
                level: 10,
                name: "EMP-ID".to_string(),
                picture: "S9(9)".to_string(),
                usage: FieldUsage::PackedDecimal,
            })
        );
    }

    #[test]
    fn test_field_decl_usage_is() {
        let class = classify_line("           10 QTY PIC S9(4) USAGE IS COMP.");
        assert_eq!(
            class,
            LineClass::FieldDecl(FieldLine {
                level: 10,
                name: "QTY".to_string(),
                picture: "S9(4)".to_string(),
                usage: FieldUsage::Binary,
            })
        );
    }

    #[test]
    fn test_field_decl_comp2_without_picture() {
        let class = classify_line("           10 RATIO COMP-2.");
        assert_eq!(
            class,
            LineClass::FieldDecl(FieldLine {
                level: 10,
                name: "RATIO".to_string(),
                picture: String::new(),
                usage: FieldUsage::Comp2,
            })
        );
    }

    #[test]
    fn test_group_item_is_ignorable() {
        assert_eq!(classify_line("           10 EMP-ADDRESS."), LineClass::Ignorable);
    }

    #[test]
    fn test_record_end() {
        assert_eq!(classify_line("           ) END-EXEC."), LineClass::RecordEnd);
    }

    #[test]
    fn test_type_annotation() {
        let class = classify_line("      *    HIREDATE              DATE NOT NULL");
        assert_eq!(
            class,
            LineClass::TypeAnnotation(TypeAnnotation {
                text: "DATE NOT NULL".to_string(),
                not_null: true,
            })
        );
    }

    #[test]
    fn test_type_annotation_varchar() {
        let class = classify_line("      *    X-EVNT-DSCR           VARCHAR(1000)");
        assert_eq!(
            class,
            LineClass::TypeAnnotation(TypeAnnotation {
                text: "VARCHAR(1000)".to_string(),
                not_null: false,
            })
        );
    }

    #[test]
    fn test_level_88_is_ignorable() {
        assert_eq!(
            classify_line("           88 ACTIVE VALUE 'A'."),
            LineClass::Ignorable
        );
    }
}
