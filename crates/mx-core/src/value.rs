//! Typed SQL values and user-supplied literal tokens
//!
//! A [`SqlValue`] is always built for a statically known [`SqlTypeKind`];
//! values are never probed at runtime to discover what they might be.

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;
use uuid::Uuid;

use crate::sql_type::SqlTypeKind;

/// A concrete value in the domain of one SQL type
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// BIT
    Bool(bool),

    /// TINYINT
    U8(u8),

    /// SMALLINT
    I16(i16),

    /// INT
    I32(i32),

    /// BIGINT
    I64(i64),

    /// SMALLMONEY, MONEY, DECIMAL
    Decimal(BigDecimal),

    /// REAL
    F32(f32),

    /// FLOAT
    F64(f64),

    /// CHAR, VARCHAR, NCHAR, NVARCHAR
    Text(String),

    /// BINARY, VARBINARY
    Bytes(Vec<u8>),

    /// UNIQUEIDENTIFIER
    Uuid(Uuid),

    /// TIME
    Time(NaiveTime),

    /// DATE
    Date(NaiveDate),

    /// SMALLDATETIME, DATETIME, DATETIME2
    DateTime(NaiveDateTime),

    /// DATETIMEOFFSET
    DateTimeOffset(DateTime<FixedOffset>),
}

impl SqlValue {
    /// Returns true if a value of this variant may be bound to `kind`
    pub fn fits_kind(&self, kind: SqlTypeKind) -> bool {
        matches!(
            (self, kind),
            (SqlValue::Bool(_), SqlTypeKind::Bit)
                | (SqlValue::U8(_), SqlTypeKind::TinyInt)
                | (SqlValue::I16(_), SqlTypeKind::SmallInt)
                | (SqlValue::I32(_), SqlTypeKind::Int)
                | (SqlValue::I64(_), SqlTypeKind::BigInt)
                | (
                    SqlValue::Decimal(_),
                    SqlTypeKind::SmallMoney | SqlTypeKind::Money | SqlTypeKind::Decimal
                )
                | (SqlValue::F32(_), SqlTypeKind::Real)
                | (SqlValue::F64(_), SqlTypeKind::Float)
                | (
                    SqlValue::Text(_),
                    SqlTypeKind::Char
                        | SqlTypeKind::VarChar
                        | SqlTypeKind::NChar
                        | SqlTypeKind::NVarChar
                )
                | (
                    SqlValue::Bytes(_),
                    SqlTypeKind::Binary | SqlTypeKind::VarBinary
                )
                | (SqlValue::Uuid(_), SqlTypeKind::UniqueIdentifier)
                | (SqlValue::Time(_), SqlTypeKind::Time)
                | (SqlValue::Date(_), SqlTypeKind::Date)
                | (
                    SqlValue::DateTime(_),
                    SqlTypeKind::SmallDateTime | SqlTypeKind::DateTime | SqlTypeKind::DateTime2
                )
                | (SqlValue::DateTimeOffset(_), SqlTypeKind::DateTimeOffset)
        )
    }

    /// Render the value as a T-SQL literal
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlValue::Bool(v) => String::from(if *v { "1" } else { "0" }),
            SqlValue::U8(v) => v.to_string(),
            SqlValue::I16(v) => v.to_string(),
            SqlValue::I32(v) => v.to_string(),
            SqlValue::I64(v) => v.to_string(),
            SqlValue::Decimal(v) => v.to_plain_string(),
            SqlValue::F32(v) => format!("{v:E}"),
            SqlValue::F64(v) => format!("{v:E}"),
            SqlValue::Text(v) => format!("N'{}'", v.replace('\'', "''")),
            SqlValue::Bytes(v) => hex_literal(v),
            SqlValue::Uuid(v) => format!("'{}'", v.hyphenated().to_string().to_uppercase()),
            other => format!("'{other}'"),
        }
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::U8(v) => write!(f, "{v}"),
            SqlValue::I16(v) => write!(f, "{v}"),
            SqlValue::I32(v) => write!(f, "{v}"),
            SqlValue::I64(v) => write!(f, "{v}"),
            SqlValue::Decimal(v) => f.write_str(&v.to_plain_string()),
            SqlValue::F32(v) => write!(f, "{v:E}"),
            SqlValue::F64(v) => write!(f, "{v:E}"),
            SqlValue::Text(v) => f.write_str(v),
            SqlValue::Bytes(v) => f.write_str(&hex_literal(v)),
            SqlValue::Uuid(v) => write!(f, "{}", v.hyphenated()),
            SqlValue::Time(v) => write!(f, "{}", v.format("%H:%M:%S%.f")),
            SqlValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            SqlValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            SqlValue::DateTimeOffset(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f %:z")),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            SqlValue::Bool(v) => serializer.serialize_bool(*v),
            SqlValue::U8(v) => serializer.serialize_u8(*v),
            SqlValue::I16(v) => serializer.serialize_i16(*v),
            SqlValue::I32(v) => serializer.serialize_i32(*v),
            SqlValue::I64(v) => serializer.serialize_i64(*v),
            SqlValue::F32(v) => serializer.serialize_f32(*v),
            SqlValue::F64(v) => serializer.serialize_f64(*v),
            // Exact numerics and everything textual keep their literal form
            other => serializer.collect_str(other),
        }
    }
}

/// A literal user value as written in a test definition
///
/// JSON numbers keep their source text so exact numerics are not rounded
/// through a binary float before conversion. YAML hands numbers over as
/// `f64`, so exact MONEY/DECIMAL values in YAML files must be quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralToken {
    /// JSON/YAML `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Numeric literal text
    Number(String),
    /// String literal
    Text(String),
}

impl LiteralToken {
    /// Short name of the token's kind for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralToken::Null => "null",
            LiteralToken::Bool(_) => "boolean",
            LiteralToken::Number(_) => "number",
            LiteralToken::Text(_) => "string",
        }
    }

    /// Literal text of the token
    pub fn as_text(&self) -> String {
        match self {
            LiteralToken::Null => "null".to_string(),
            LiteralToken::Bool(b) => b.to_string(),
            LiteralToken::Number(n) | LiteralToken::Text(n) => n.clone(),
        }
    }

    /// Token text for messages, cut to 20 characters
    pub fn preview(&self) -> String {
        let text = self.as_text();
        if text.chars().count() > 20 {
            let head: String = text.chars().take(20).collect();
            format!("'{head}...'")
        } else {
            format!("'{text}'")
        }
    }
}

impl From<&str> for LiteralToken {
    fn from(s: &str) -> Self {
        LiteralToken::Text(s.to_string())
    }
}

impl From<i64> for LiteralToken {
    fn from(n: i64) -> Self {
        LiteralToken::Number(n.to_string())
    }
}

impl From<f64> for LiteralToken {
    fn from(n: f64) -> Self {
        LiteralToken::Number(n.to_string())
    }
}

impl Serialize for LiteralToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            LiteralToken::Null => serializer.serialize_none(),
            LiteralToken::Bool(b) => serializer.serialize_bool(*b),
            LiteralToken::Number(n) => {
                if let Ok(i) = n.parse::<i64>() {
                    serializer.serialize_i64(i)
                } else if let Ok(u) = n.parse::<u64>() {
                    serializer.serialize_u64(u)
                } else if let Ok(exact) = serde_json::Number::from_str(n) {
                    exact.serialize(serializer)
                } else {
                    serializer.serialize_str(n)
                }
            }
            LiteralToken::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for LiteralToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(LiteralToken::Null),
            serde_json::Value::Bool(b) => Ok(LiteralToken::Bool(b)),
            serde_json::Value::Number(n) => Ok(LiteralToken::Number(n.to_string())),
            serde_json::Value::String(s) => Ok(LiteralToken::Text(s)),
            other => Err(serde::de::Error::custom(format!(
                "user values must be scalars, found {other}"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
