//! State-machine parser for single DCLGEN documents.
//!
//! Walks the document line by line through the classifier, accumulating
//! schema name, table name and an ordered column list. The parser performs
//! no I/O: the caller supplies the full text, which keeps every parse
//! independent and one parser instance reusable across documents.

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{classify_line, FieldLine, LineClass, TypeAnnotation};
use crate::types::{map_type, SemanticType};
use crate::{DclgenError, DclgenResult};

/// One column of the declared table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAttribute {
    /// Column identifier: the COBOL field name with hyphens translated to
    /// underscores, original case preserved.
    pub name: String,
    /// Recovered DB2 type.
    pub semantic_type: SemanticType,
    /// False only when a NOT NULL annotation marker was present.
    pub nullable: bool,
    /// Annotation text carried from the adjoining comment, if any.
    pub comment: Option<String>,
}

/// Warning-level finding surfaced alongside a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Diagnostic categories. None of these abort a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// A field name occurred more than once (case-insensitive).
    DuplicateFieldName,
    /// A picture/usage clause matched no recognized pattern.
    UnknownType,
}

/// Parse result for one DCLGEN document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDeclaration {
    /// Schema name, absent when the source never qualifies the table.
    pub schema_name: Option<String>,
    /// Table name.
    pub table_name: String,
    /// Columns in declaration order.
    pub attributes: Vec<ColumnAttribute>,
    /// Warning-level findings (duplicates, unknown types).
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate a COBOL field name to a column identifier. Idempotent.
pub fn to_column_name(cobol_name: &str) -> String {
    cobol_name.replace('-', "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Looking for the first table marker.
    Seeking,
    /// Table name captured, looking for the 01-level record.
    InHeader,
    /// Consuming field declarations.
    InRecord,
    /// END-EXEC or a second record seen; remaining lines are ignored.
    Done,
}

/// Parser for DCLGEN documents. Stateless between invocations.
#[derive(Debug, Default)]
pub struct DclgenParser;

impl DclgenParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse one DCLGEN document.
    ///
    /// Returns a best-effort [`TableDeclaration`] even when individual
    /// fields degrade to [`SemanticType::Unknown`]. Fails only when no
    /// table name or no record start is ever found.
    pub fn parse(&self, text: &str) -> DclgenResult<TableDeclaration> {
        let mut pass = ParsePass::new();
        for line in text.lines() {
            pass.step(classify_line(line));
            if pass.state == ParseState::Done {
                break;
            }
        }
        pass.finish()
    }
}

/// Mutable state for one parse pass.
struct ParsePass {
    state: ParseState,
    schema: Option<String>,
    table: Option<String>,
    attributes: Vec<ColumnAttribute>,
    diagnostics: Vec<Diagnostic>,
    /// Annotation waiting to apply to the next field declaration.
    pending_annotation: Option<TypeAnnotation>,
}

impl ParsePass {
    fn new() -> Self {
        Self {
            state: ParseState::Seeking,
            schema: None,
            table: None,
            attributes: Vec::new(),
            diagnostics: Vec::new(),
            pending_annotation: None,
        }
    }

    fn step(&mut self, class: LineClass) {
        match class {
            LineClass::TableMarker { schema, table } => self.on_table_marker(schema, table),
            LineClass::RecordStart { name } => self.on_record_start(name),
            LineClass::FieldDecl(field) => self.on_field_decl(field),
            LineClass::TypeAnnotation(annotation) => {
                if self.state == ParseState::InRecord || self.state == ParseState::InHeader {
                    self.pending_annotation = Some(annotation);
                }
            }
            LineClass::RecordEnd => {
                if self.state == ParseState::InRecord {
                    self.state = ParseState::Done;
                }
            }
            LineClass::Ignorable => {}
        }
    }

    fn on_table_marker(&mut self, schema: Option<String>, table: String) {
        match self.state {
            ParseState::Seeking | ParseState::InHeader => {
                // Last marker wins for the table name; a marker without a
                // schema keeps one captured earlier (the DECLARE statement
                // is often unqualified while the DCLGEN header is not).
                debug!(table = %table, "table marker");
                self.table = Some(table);
                if schema.is_some() {
                    self.schema = schema;
                }
                self.state = ParseState::InHeader;
            }
            ParseState::InRecord | ParseState::Done => {}
        }
    }

    fn on_record_start(&mut self, name: String) {
        match self.state {
            ParseState::Seeking | ParseState::InHeader => {
                debug!(record = %name, "record start");
                self.state = ParseState::InRecord;
            }
            // Only the first declaration counts; a second record ends it.
            ParseState::InRecord => self.state = ParseState::Done,
            ParseState::Done => {}
        }
    }

    fn on_field_decl(&mut self, field: FieldLine) {
        if self.state != ParseState::InRecord {
            return;
        }
        let annotation = self.pending_annotation.take();
        let annotation_text = annotation.as_ref().map(|a| a.text.as_str());
        let semantic_type = map_type(&field.picture, field.usage, annotation_text);

        let name = to_column_name(&field.name);
        if let SemanticType::Unknown(raw) = &semantic_type {
            warn!(field = %name, picture = %raw, "unrecognized field declaration");
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnknownType,
                message: format!("field {name}: unrecognized declaration '{raw}'"),
            });
        }
        if self
            .attributes
            .iter()
            .any(|attr| attr.name.eq_ignore_ascii_case(&name))
        {
            warn!(field = %name, "duplicate field name");
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::DuplicateFieldName,
                message: format!("field {name} declared more than once"),
            });
        }

        self.attributes.push(ColumnAttribute {
            name,
            semantic_type,
            nullable: !annotation.as_ref().map(|a| a.not_null).unwrap_or(false),
            comment: annotation.map(|a| a.text),
        });
    }

    fn finish(self) -> DclgenResult<TableDeclaration> {
        let table_name = self.table.ok_or_else(|| DclgenError::Structural {
            reason: "no table declaration found".to_string(),
        })?;
        if self.state == ParseState::Seeking || self.state == ParseState::InHeader {
            return Err(DclgenError::Structural {
                reason: format!("no record start found for table {table_name}"),
            });
        }
        Ok(TableDeclaration {
            schema_name: self.schema,
            table_name,
            attributes: self.attributes,
            diagnostics: self.diagnostics,
        })
    }
}
