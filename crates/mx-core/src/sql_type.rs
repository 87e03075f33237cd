//! SQL Server type declarations
//!
//! A [`SqlTypeDefinition`] is parsed from text such as `NVARCHAR(MAX)` or
//! `DECIMAL(10, 2)`, validated against the legal ranges of its kind, and
//! rendered back to canonical text. Construction never validates: call
//! [`SqlTypeDefinition::validate`] before trusting a definition.

use crate::error::TypeParseError;
use crate::validation::ValidationResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// Size value meaning `MAX` for the variable-length kinds
pub const SIZE_MAX: i32 = -1;

/// Longest BINARY/VARBINARY/CHAR/VARCHAR declaration
pub const MAX_BYTE_LENGTH: i32 = 8000;

/// Longest NCHAR/NVARCHAR declaration
pub const MAX_NCHAR_LENGTH: i32 = 4000;

/// Largest DECIMAL precision
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Largest fractional-seconds scale of TIME, DATETIME2 and DATETIMEOFFSET
pub const MAX_FRACTIONAL_SCALE: u8 = 7;

/// The closed set of SQL types a test matrix can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SqlTypeKind {
    Binary,
    VarBinary,
    Char,
    VarChar,
    NChar,
    NVarChar,
    UniqueIdentifier,
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    SmallMoney,
    Money,
    Decimal,
    Real,
    Float,
    Time,
    Date,
    SmallDateTime,
    DateTime,
    DateTime2,
    DateTimeOffset,
    /// Sentinel for text that did not name a supported type
    NotSupported,
}

/// What the parenthesized group of a declaration means for a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterSlot {
    /// Group is ignored
    None,
    /// Fixed-length size
    Size,
    /// Variable-length size, `MAX` allowed
    SizeOrMax,
    /// `(precision[, scale])`
    PrecisionScale,
    /// Fractional-seconds digits, stored in `scale`
    FractionalScale,
}

impl SqlTypeKind {
    /// Every supported kind, in declaration order
    pub const SUPPORTED: [SqlTypeKind; 23] = [
        SqlTypeKind::Binary,
        SqlTypeKind::VarBinary,
        SqlTypeKind::Char,
        SqlTypeKind::VarChar,
        SqlTypeKind::NChar,
        SqlTypeKind::NVarChar,
        SqlTypeKind::UniqueIdentifier,
        SqlTypeKind::Bit,
        SqlTypeKind::TinyInt,
        SqlTypeKind::SmallInt,
        SqlTypeKind::Int,
        SqlTypeKind::BigInt,
        SqlTypeKind::SmallMoney,
        SqlTypeKind::Money,
        SqlTypeKind::Decimal,
        SqlTypeKind::Real,
        SqlTypeKind::Float,
        SqlTypeKind::Time,
        SqlTypeKind::Date,
        SqlTypeKind::SmallDateTime,
        SqlTypeKind::DateTime,
        SqlTypeKind::DateTime2,
        SqlTypeKind::DateTimeOffset,
    ];

    /// Canonical upper-case keyword; empty for `NotSupported`
    pub fn keyword(self) -> &'static str {
        match self {
            SqlTypeKind::Binary => "BINARY",
            SqlTypeKind::VarBinary => "VARBINARY",
            SqlTypeKind::Char => "CHAR",
            SqlTypeKind::VarChar => "VARCHAR",
            SqlTypeKind::NChar => "NCHAR",
            SqlTypeKind::NVarChar => "NVARCHAR",
            SqlTypeKind::UniqueIdentifier => "UNIQUEIDENTIFIER",
            SqlTypeKind::Bit => "BIT",
            SqlTypeKind::TinyInt => "TINYINT",
            SqlTypeKind::SmallInt => "SMALLINT",
            SqlTypeKind::Int => "INT",
            SqlTypeKind::BigInt => "BIGINT",
            SqlTypeKind::SmallMoney => "SMALLMONEY",
            SqlTypeKind::Money => "MONEY",
            SqlTypeKind::Decimal => "DECIMAL",
            SqlTypeKind::Real => "REAL",
            SqlTypeKind::Float => "FLOAT",
            SqlTypeKind::Time => "TIME",
            SqlTypeKind::Date => "DATE",
            SqlTypeKind::SmallDateTime => "SMALLDATETIME",
            SqlTypeKind::DateTime => "DATETIME",
            SqlTypeKind::DateTime2 => "DATETIME2",
            SqlTypeKind::DateTimeOffset => "DATETIMEOFFSET",
            SqlTypeKind::NotSupported => "",
        }
    }

    /// Look up a kind by keyword (case-insensitive, `NUMERIC` aliases `DECIMAL`)
    pub fn from_keyword(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if upper == "NUMERIC" {
            return Some(SqlTypeKind::Decimal);
        }
        Self::SUPPORTED
            .into_iter()
            .find(|kind| kind.keyword() == upper)
    }

    fn parameter_slot(self) -> ParameterSlot {
        match self {
            SqlTypeKind::Binary | SqlTypeKind::Char | SqlTypeKind::NChar => ParameterSlot::Size,
            SqlTypeKind::VarBinary | SqlTypeKind::VarChar | SqlTypeKind::NVarChar => {
                ParameterSlot::SizeOrMax
            }
            SqlTypeKind::Decimal => ParameterSlot::PrecisionScale,
            SqlTypeKind::Time | SqlTypeKind::DateTime2 | SqlTypeKind::DateTimeOffset => {
                ParameterSlot::FractionalScale
            }
            SqlTypeKind::UniqueIdentifier
            | SqlTypeKind::Bit
            | SqlTypeKind::TinyInt
            | SqlTypeKind::SmallInt
            | SqlTypeKind::Int
            | SqlTypeKind::BigInt
            | SqlTypeKind::SmallMoney
            | SqlTypeKind::Money
            | SqlTypeKind::Real
            | SqlTypeKind::Float
            | SqlTypeKind::Date
            | SqlTypeKind::SmallDateTime
            | SqlTypeKind::DateTime
            | SqlTypeKind::NotSupported => ParameterSlot::None,
        }
    }

    /// Returns true for kinds declared with a length
    pub fn has_size(self) -> bool {
        matches!(
            self.parameter_slot(),
            ParameterSlot::Size | ParameterSlot::SizeOrMax
        )
    }

    /// Returns true for kinds that accept `(MAX)`
    pub fn supports_max(self) -> bool {
        self.parameter_slot() == ParameterSlot::SizeOrMax
    }

    /// Returns true for TIME, DATETIME2 and DATETIMEOFFSET
    pub fn has_fractional_seconds(self) -> bool {
        self.parameter_slot() == ParameterSlot::FractionalScale
    }

    /// Largest declarable length for size-bearing kinds
    pub fn max_length(self) -> Option<i32> {
        match self {
            SqlTypeKind::Binary
            | SqlTypeKind::VarBinary
            | SqlTypeKind::Char
            | SqlTypeKind::VarChar => Some(MAX_BYTE_LENGTH),
            SqlTypeKind::NChar | SqlTypeKind::NVarChar => Some(MAX_NCHAR_LENGTH),
            _ => None,
        }
    }
}

impl std::fmt::Display for SqlTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlTypeKind::NotSupported => write!(f, "NOT SUPPORTED"),
            kind => f.write_str(kind.keyword()),
        }
    }
}

/// A parsed SQL type declaration
///
/// `size` is `-1` for `MAX` and `0` when unset. Only the attributes that are
/// meaningful for `kind` are inspected by validation and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqlTypeDefinition {
    /// Type kind
    pub kind: SqlTypeKind,
    /// Declared length
    pub size: i32,
    /// Total digits (DECIMAL only)
    pub precision: u8,
    /// Fraction digits (DECIMAL) or fractional-seconds digits (time family)
    pub scale: u8,
}

impl Default for SqlTypeDefinition {
    fn default() -> Self {
        Self::new(SqlTypeKind::NotSupported)
    }
}

fn type_pattern() -> &'static Regex {
    static TYPE_PATTERN: OnceLock<Regex> = OnceLock::new();
    TYPE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(\w+)\s*(?:\(\s*(\d+|MAX)\s*(?:,\s*(\d+)\s*)?\))?$")
            .expect("valid regex literal")
    })
}

fn parse_number<T: FromStr>(
    kind: SqlTypeKind,
    attribute: &'static str,
    digits: &str,
) -> Result<T, TypeParseError> {
    digits
        .parse::<T>()
        .map_err(|_| TypeParseError::NumberOutOfRange {
            name: kind.keyword().to_string(),
            attribute,
            value: digits.to_string(),
        })
}

impl SqlTypeDefinition {
    /// A definition of `kind` with every attribute unset
    pub fn new(kind: SqlTypeKind) -> Self {
        Self {
            kind,
            size: 0,
            precision: 0,
            scale: 0,
        }
    }

    /// A size-bearing definition (`SIZE_MAX` for `MAX`)
    pub fn with_size(kind: SqlTypeKind, size: i32) -> Self {
        Self {
            size,
            ..Self::new(kind)
        }
    }

    /// A DECIMAL-style definition
    pub fn with_precision(kind: SqlTypeKind, precision: u8, scale: u8) -> Self {
        Self {
            precision,
            scale,
            ..Self::new(kind)
        }
    }

    /// A time-family definition with fractional-seconds digits
    pub fn with_scale(kind: SqlTypeKind, scale: u8) -> Self {
        Self {
            scale,
            ..Self::new(kind)
        }
    }

    /// Returns true if `size` means `MAX`
    pub fn is_max(&self) -> bool {
        self.kind.supports_max() && self.size == SIZE_MAX
    }

    /// Parse a declaration such as `VARCHAR(50)` or `numeric(18, 4)`
    pub fn parse(text: &str) -> Result<Self, TypeParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TypeParseError::Empty);
        }

        let captures =
            type_pattern()
                .captures(trimmed)
                .ok_or_else(|| TypeParseError::Malformed {
                    text: trimmed.to_string(),
                })?;
        let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let kind = SqlTypeKind::from_keyword(name).ok_or_else(|| TypeParseError::UnknownType {
            name: name.to_ascii_uppercase(),
        })?;
        let first = captures.get(2).map(|m| m.as_str());
        let second = captures.get(3).map(|m| m.as_str());

        let is_max = first.is_some_and(|v| v.eq_ignore_ascii_case("MAX"));
        let slot = kind.parameter_slot();
        if is_max && slot != ParameterSlot::SizeOrMax && slot != ParameterSlot::None {
            return Err(TypeParseError::MaxNotAllowed {
                name: kind.keyword().to_string(),
            });
        }
        let single_only = matches!(
            slot,
            ParameterSlot::Size | ParameterSlot::SizeOrMax | ParameterSlot::FractionalScale
        );
        if single_only && second.is_some() {
            return Err(TypeParseError::UnexpectedScale {
                name: kind.keyword().to_string(),
            });
        }

        let mut definition = Self::new(kind);
        match (slot, first) {
            (ParameterSlot::None, _) | (_, None) => {}
            (ParameterSlot::Size | ParameterSlot::SizeOrMax, Some(_)) if is_max => {
                definition.size = SIZE_MAX;
            }
            (ParameterSlot::Size | ParameterSlot::SizeOrMax, Some(digits)) => {
                definition.size = parse_number(kind, "size", digits)?;
            }
            (ParameterSlot::PrecisionScale, Some(digits)) => {
                definition.precision = parse_number(kind, "precision", digits)?;
                if let Some(digits) = second {
                    definition.scale = parse_number(kind, "scale", digits)?;
                }
            }
            (ParameterSlot::FractionalScale, Some(digits)) => {
                definition.scale = parse_number(kind, "scale", digits)?;
            }
        }

        Ok(definition)
    }

    /// Parse a declaration, falling back to `NotSupported` on any failure
    pub fn try_parse(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|e| {
            log::debug!("Treating SQL type '{}' as not supported: {}", text, e);
            Self::default()
        })
    }

    /// Render the canonical declaration text
    pub fn render(&self) -> String {
        let keyword = self.kind.keyword();
        match self.kind.parameter_slot() {
            ParameterSlot::SizeOrMax if self.size == SIZE_MAX => format!("{keyword}(MAX)"),
            ParameterSlot::Size | ParameterSlot::SizeOrMax if self.size > 0 => {
                format!("{keyword}({})", self.size)
            }
            ParameterSlot::PrecisionScale if self.precision > 0 && self.scale > 0 => {
                format!("{keyword}({}, {})", self.precision, self.scale)
            }
            ParameterSlot::PrecisionScale if self.precision > 0 => {
                format!("{keyword}({})", self.precision)
            }
            ParameterSlot::FractionalScale if self.scale > 0 => {
                format!("{keyword}({})", self.scale)
            }
            _ => keyword.to_string(),
        }
    }

    /// Check size, precision and scale against the legal ranges of `kind`
    ///
    /// Returns one `Error` per violated attribute; an empty list means valid.
    /// An attribute that `kind` does not take is a violation too.
    pub fn validate(&self) -> Vec<ValidationResult> {
        let mut results = Vec::new();
        let name = self.kind.keyword();

        match self.kind {
            SqlTypeKind::NotSupported => {
                results.push(ValidationResult::error(
                    "SqlType",
                    "The SQL type is not supported.",
                ));
            }
            SqlTypeKind::Binary | SqlTypeKind::Char | SqlTypeKind::NChar => {
                let max = self.kind.max_length().unwrap_or(MAX_BYTE_LENGTH);
                if !(1..=max).contains(&self.size) {
                    results.push(ValidationResult::error(
                        "Size",
                        format!("Size for type '{name}' must be between 1 and {max}."),
                    ));
                }
            }
            SqlTypeKind::VarBinary | SqlTypeKind::VarChar | SqlTypeKind::NVarChar => {
                let max = self.kind.max_length().unwrap_or(MAX_BYTE_LENGTH);
                if self.size != SIZE_MAX && !(1..=max).contains(&self.size) {
                    results.push(ValidationResult::error(
                        "Size",
                        format!("Size for type '{name}' must be between 1 and {max} or MAX (-1)."),
                    ));
                }
            }
            SqlTypeKind::Decimal => {
                if !(1..=MAX_DECIMAL_PRECISION).contains(&self.precision) {
                    results.push(ValidationResult::error(
                        "Precision",
                        format!(
                            "Precision for type '{name}' must be between 1 and {MAX_DECIMAL_PRECISION}."
                        ),
                    ));
                }
                if self.scale > self.precision {
                    results.push(ValidationResult::error(
                        "Scale",
                        format!(
                            "Scale for type '{name}' must be between 0 and Precision ({}).",
                            self.precision
                        ),
                    ));
                }
            }
            SqlTypeKind::Time | SqlTypeKind::DateTime2 | SqlTypeKind::DateTimeOffset => {
                if self.scale > MAX_FRACTIONAL_SCALE {
                    results.push(ValidationResult::error(
                        "Scale",
                        format!(
                            "Scale for type '{name}' must be between 0 and {MAX_FRACTIONAL_SCALE}."
                        ),
                    ));
                }
            }
            _ => {}
        }

        if self.kind != SqlTypeKind::NotSupported {
            self.check_unused_attributes(&mut results);
        }
        results
    }

    fn check_unused_attributes(&self, results: &mut Vec<ValidationResult>) {
        let slot = self.kind.parameter_slot();
        let name = self.kind.keyword();
        if !self.kind.has_size() && self.size != 0 {
            results.push(ValidationResult::error(
                "Size",
                format!("Size is not allowed for type '{name}'."),
            ));
        }
        if slot != ParameterSlot::PrecisionScale && self.precision != 0 {
            results.push(ValidationResult::error(
                "Precision",
                format!("Precision is not allowed for type '{name}'."),
            ));
        }
        if !matches!(
            slot,
            ParameterSlot::PrecisionScale | ParameterSlot::FractionalScale
        ) && self.scale != 0
        {
            results.push(ValidationResult::error(
                "Scale",
                format!("Scale is not allowed for type '{name}'."),
            ));
        }
    }

    /// Returns true if validation reports no errors
    pub fn is_valid(&self) -> bool {
        !crate::validation::has_errors(&self.validate())
    }
}

impl std::fmt::Display for SqlTypeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for SqlTypeDefinition {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SqlTypeDefinition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.render())
    }
}

impl<'de> Deserialize<'de> for SqlTypeDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "sql_type_test.rs"]
mod tests;
