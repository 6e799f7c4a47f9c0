//! DB2 semantic types and COBOL-to-DB2 type mapping.
//!
//! A COBOL picture clause is a lossy encoding of the original DB2 column
//! type: `PIC X(10)` may be a CHAR(10) or a DATE, `PIC S9(9) COMP-3` may
//! be DECIMAL(9,0). DCLGEN emits comment annotations naming the DB2 type
//! precisely because the picture syntax cannot express it, so explicit
//! annotations override inference and the picture shape is the fallback.

use std::fmt;

use serde::Serialize;

/// Largest digit count that still maps to SMALLINT.
pub const SMALLINT_MAX_DIGITS: u32 = 4;
/// Largest digit count that still maps to INTEGER.
pub const INTEGER_MAX_DIGITS: u32 = 9;

/// COBOL usage clause recognized in DCLGEN field declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FieldUsage {
    /// DISPLAY (default when no usage clause is present).
    #[default]
    Display,
    /// BINARY / COMP / COMP-4 / COMP-5.
    Binary,
    /// COMP-1 (single precision float).
    Comp1,
    /// COMP-2 (double precision float).
    Comp2,
    /// COMP-3 / PACKED-DECIMAL.
    PackedDecimal,
}

/// DB2 column type recovered from a DCLGEN field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SemanticType {
    /// Fixed-length character, CHAR(n).
    Char(u32),
    /// Variable-length character, VARCHAR(n).
    VarChar(u32),
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Packed decimal with (precision, scale).
    Decimal(u32, u32),
    /// Floating point (unspecified width).
    Float,
    /// Single precision floating point.
    Real,
    /// Double precision floating point.
    Double,
    /// DATE.
    Date,
    /// TIME.
    Time,
    /// TIMESTAMP.
    Timestamp,
    /// Binary large object with maximum length in bytes.
    Blob(u32),
    /// Character large object with maximum length in bytes.
    Clob(u32),
    /// Double-byte character large object with maximum length.
    DbClob(u32),
    /// Unrecognized declaration; carries the raw picture text.
    Unknown(String),
}

impl SemanticType {
    /// Fixed column order for per-type report tallies.
    pub const KINDS: [&'static str; 16] = [
        "char",
        "varchar",
        "smallint",
        "integer",
        "bigint",
        "decimal",
        "float",
        "real",
        "double",
        "date",
        "time",
        "timestamp",
        "blob",
        "clob",
        "dbclob",
        "unknown",
    ];

    /// Kind label, matching an entry of [`SemanticType::KINDS`].
    pub fn kind(&self) -> &'static str {
        match self {
            SemanticType::Char(_) => "char",
            SemanticType::VarChar(_) => "varchar",
            SemanticType::SmallInt => "smallint",
            SemanticType::Integer => "integer",
            SemanticType::BigInt => "bigint",
            SemanticType::Decimal(_, _) => "decimal",
            SemanticType::Float => "float",
            SemanticType::Real => "real",
            SemanticType::Double => "double",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::Timestamp => "timestamp",
            SemanticType::Blob(_) => "blob",
            SemanticType::Clob(_) => "clob",
            SemanticType::DbClob(_) => "dbclob",
            SemanticType::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Char(n) => write!(f, "CHAR({n})"),
            SemanticType::VarChar(n) => write!(f, "VARCHAR({n})"),
            SemanticType::SmallInt => write!(f, "SMALLINT"),
            SemanticType::Integer => write!(f, "INTEGER"),
            SemanticType::BigInt => write!(f, "BIGINT"),
            SemanticType::Decimal(p, s) => write!(f, "DECIMAL({p},{s})"),
            SemanticType::Float => write!(f, "FLOAT"),
            SemanticType::Real => write!(f, "REAL"),
            SemanticType::Double => write!(f, "DOUBLE"),
            SemanticType::Date => write!(f, "DATE"),
            SemanticType::Time => write!(f, "TIME"),
            SemanticType::Timestamp => write!(f, "TIMESTAMP"),
            SemanticType::Blob(n) => write!(f, "BLOB({n})"),
            SemanticType::Clob(n) => write!(f, "CLOB({n})"),
            SemanticType::DbClob(n) => write!(f, "DBCLOB({n})"),
            SemanticType::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
        }
    }
}

/// Shape of a picture string after one scan.
#[derive(Debug, Clone, Copy, Default)]
struct PictureShape {
    /// Count of X positions.
    x_count: u32,
    /// Digit positions before the implied decimal point.
    digits_int: u32,
    /// Digit positions after V.
    digits_frac: u32,
    /// Whether a symbol outside the S/V/9/X repertoire was seen.
    other: bool,
}

impl PictureShape {
    fn total_digits(&self) -> u32 {
        self.digits_int + self.digits_frac
    }
}

/// Scan a picture string, expanding `(n)` repeat factors.
fn scan_picture(picture: &str) -> PictureShape {
    let mut shape = PictureShape::default();
    let mut frac = false;
    // Which counter the previous symbol incremented, so (n) can extend it.
    let mut last: Option<char> = None;

    let cleaned = picture.trim().trim_end_matches('.');
    let mut chars = cleaned.chars().peekable();

    while let Some(c) = chars.next() {
        match c.to_ascii_uppercase() {
            'S' if last.is_none() => {}
            'V' => {
                frac = true;
                last = None;
            }
            '9' => {
                if frac {
                    shape.digits_frac += 1;
                } else {
                    shape.digits_int += 1;
                }
                last = Some(if frac { 'v' } else { '9' });
            }
            'X' => {
                shape.x_count += 1;
                last = Some('X');
            }
            '(' => {
                let mut digits = String::new();
                for d in chars.by_ref() {
                    if d == ')' {
                        break;
                    }
                    digits.push(d);
                }
                let repeat: u32 = digits.trim().parse().unwrap_or(1);
                let extra = repeat.saturating_sub(1);
                match last {
                    Some('9') => shape.digits_int += extra,
                    Some('v') => shape.digits_frac += extra,
                    Some('X') => shape.x_count += extra,
                    _ => shape.other = true,
                }
            }
            _ => {
                shape.other = true;
                last = None;
            }
        }
    }

    shape
}

/// Parse a DB2 type annotation such as `VARCHAR(1000)`, `DATE`, or
/// `DECIMAL(7, 2)`. `pic_len` supplies the length when the annotation
/// omits it and the type carries one.
pub fn parse_annotation(text: &str, pic_len: u32) -> Option<SemanticType> {
    let upper = text.trim().to_uppercase();
    let expr = upper.trim_end_matches("NOT NULL").trim();

    let (base, args) = match expr.find('(') {
        Some(pos) => {
            let close = expr[pos..].find(')').map(|c| pos + c)?;
            (expr[..pos].trim(), Some(&expr[pos + 1..close]))
        }
        None => (expr.split_whitespace().next().unwrap_or(""), None),
    };

    let arg = |idx: usize| -> Option<u32> {
        args.and_then(|a| a.split(',').nth(idx))
            .and_then(|s| parse_length(s.trim()))
    };

    match base {
        "CHAR" | "CHARACTER" => Some(SemanticType::Char(arg(0).unwrap_or(pic_len))),
        "VARCHAR" => Some(SemanticType::VarChar(arg(0).unwrap_or(pic_len))),
        "SMALLINT" => Some(SemanticType::SmallInt),
        "INTEGER" | "INT" => Some(SemanticType::Integer),
        "BIGINT" => Some(SemanticType::BigInt),
        "DECIMAL" | "DEC" | "NUMERIC" => {
            let precision = arg(0)?;
            let scale = arg(1).unwrap_or(0).min(precision);
            Some(SemanticType::Decimal(precision, scale))
        }
        "FLOAT" => Some(SemanticType::Float),
        "REAL" => Some(SemanticType::Real),
        "DOUBLE" => Some(SemanticType::Double),
        "DATE" => Some(SemanticType::Date),
        "TIME" => Some(SemanticType::Time),
        "TIMESTAMP" => Some(SemanticType::Timestamp),
        "BLOB" => Some(SemanticType::Blob(arg(0).unwrap_or(0))),
        "CLOB" => Some(SemanticType::Clob(arg(0).unwrap_or(0))),
        "DBCLOB" => Some(SemanticType::DbClob(arg(0).unwrap_or(0))),
        _ => None,
    }
}

/// Parse a length argument, accepting DB2's K/M/G multiplier suffixes.
fn parse_length(s: &str) -> Option<u32> {
    let s = s.trim();
    let (digits, multiplier) = match s.chars().last()? {
        'K' | 'k' => (&s[..s.len() - 1], 1024u32),
        'M' | 'm' => (&s[..s.len() - 1], 1024 * 1024),
        'G' | 'g' => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1),
    };
    digits.trim().parse::<u32>().ok()?.checked_mul(multiplier)
}

/// Intermediate input shared by the mapping rules.
struct MapInput<'a> {
    usage: FieldUsage,
    shape: PictureShape,
    annotation: Option<&'a str>,
}

type MapRule = fn(&MapInput<'_>) -> Option<SemanticType>;

/// Ordered mapping rules. First match wins; the order matters because the
/// patterns overlap (an explicit annotation beats any picture inference,
/// packed decimals would otherwise look like plain numerics).
const RULES: [MapRule; 5] = [
    rule_annotation,
    rule_packed_decimal,
    rule_float_usage,
    rule_alphanumeric,
    rule_numeric_width,
];

fn rule_annotation(input: &MapInput<'_>) -> Option<SemanticType> {
    parse_annotation(input.annotation?, input.shape.x_count)
}

fn rule_packed_decimal(input: &MapInput<'_>) -> Option<SemanticType> {
    let shape = &input.shape;
    let packed = input.usage == FieldUsage::PackedDecimal || shape.digits_frac > 0;
    if packed && shape.total_digits() > 0 && !shape.other && shape.x_count == 0 {
        Some(SemanticType::Decimal(shape.total_digits(), shape.digits_frac))
    } else {
        None
    }
}

fn rule_float_usage(input: &MapInput<'_>) -> Option<SemanticType> {
    match input.usage {
        FieldUsage::Comp1 => Some(SemanticType::Real),
        FieldUsage::Comp2 => Some(SemanticType::Double),
        _ => None,
    }
}

fn rule_alphanumeric(input: &MapInput<'_>) -> Option<SemanticType> {
    let shape = &input.shape;
    if shape.x_count > 0 && shape.total_digits() == 0 && !shape.other {
        Some(SemanticType::Char(shape.x_count))
    } else {
        None
    }
}

fn rule_numeric_width(input: &MapInput<'_>) -> Option<SemanticType> {
    let shape = &input.shape;
    if shape.total_digits() == 0 || shape.x_count > 0 || shape.other {
        return None;
    }
    Some(match shape.total_digits() {
        d if d <= SMALLINT_MAX_DIGITS => SemanticType::SmallInt,
        d if d <= INTEGER_MAX_DIGITS => SemanticType::Integer,
        _ => SemanticType::BigInt,
    })
}

/// Map a COBOL field declaration to its DB2 semantic type.
///
/// `picture` is the raw picture string, `usage` the recognized usage
/// clause, and `annotation` an optional DB2-type comment annotation from
/// the same or the directly preceding line. The scale hint is the digit
/// count after `V` in the picture. Deterministic: the same inputs always
/// produce the same type.
pub fn map_type(picture: &str, usage: FieldUsage, annotation: Option<&str>) -> SemanticType {
    let input = MapInput {
        usage,
        shape: scan_picture(picture),
        annotation,
    };
    for rule in RULES {
        if let Some(mapped) = rule(&input) {
            return mapped;
        }
    }
    SemanticType::Unknown(picture.trim().trim_end_matches('.').to_string())
}
