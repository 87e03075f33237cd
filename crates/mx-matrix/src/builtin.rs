//! Builtin boundary values per SQL type
//!
//! Every supported kind maps its (size, precision, scale) to a fixed, ordered
//! list of distinct values covering the edges of the type's domain. The lists
//! depend on nothing but the type definition.

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use mx_core::sql_type::{MAX_BYTE_LENGTH, MAX_NCHAR_LENGTH};
use mx_core::{SqlTypeDefinition, SqlTypeKind, SqlValue};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{MatrixError, MatrixResult};

/// Length used for the long value of `VARCHAR(MAX)` and `VARBINARY(MAX)`
pub const MAX_BYTES_SAMPLE_LENGTH: usize = MAX_BYTE_LENGTH as usize + 1;

/// Length used for the long value of `NVARCHAR(MAX)`
pub const MAX_NCHARS_SAMPLE_LENGTH: usize = MAX_NCHAR_LENGTH as usize + 1;

pub(crate) const SMALLMONEY_VALUES: [&str; 4] = ["-214748.3648", "0", "0.0001", "214748.3647"];

pub(crate) const MONEY_VALUES: [&str; 4] = [
    "-922337203685477.5808",
    "0",
    "0.0001",
    "922337203685477.5807",
];

/// Offset bound of DATETIMEOFFSET, in seconds (14 hours)
const MAX_OFFSET_SECONDS: i32 = 14 * 3600;

/// Source of boundary values for a parameter type
pub trait BoundaryValues {
    /// Ordered, distinct values for `type_def`
    fn boundary_values(&self, type_def: &SqlTypeDefinition) -> MatrixResult<Vec<SqlValue>>;
}

impl<F> BoundaryValues for F
where
    F: Fn(&SqlTypeDefinition) -> MatrixResult<Vec<SqlValue>>,
{
    fn boundary_values(&self, type_def: &SqlTypeDefinition) -> MatrixResult<Vec<SqlValue>> {
        self(type_def)
    }
}

/// The builtin value tables
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinValues;

impl BoundaryValues for BuiltinValues {
    fn boundary_values(&self, type_def: &SqlTypeDefinition) -> MatrixResult<Vec<SqlValue>> {
        generate(type_def)
    }
}

/// Generate the builtin boundary values for a type definition
///
/// Fails with [`MatrixError::UnsupportedType`] for `NotSupported` and with
/// [`MatrixError::Range`] for any definition that does not validate.
pub fn generate(type_def: &SqlTypeDefinition) -> MatrixResult<Vec<SqlValue>> {
    let kind = type_def.kind;
    if kind == SqlTypeKind::NotSupported {
        return Err(MatrixError::UnsupportedType(kind));
    }

    let problems: Vec<String> = type_def
        .validate()
        .into_iter()
        .filter(|r| r.is_error())
        .map(|r| r.message)
        .collect();
    if !problems.is_empty() {
        return Err(MatrixError::Range {
            kind,
            message: problems.join(" "),
        });
    }

    let size = type_def.size;
    let scale = type_def.scale;
    match kind {
        SqlTypeKind::Binary => Ok(binary(size)),
        SqlTypeKind::VarBinary => Ok(var_binary(size)),
        SqlTypeKind::Char => Ok(fixed_text(size, 'a')),
        SqlTypeKind::VarChar => Ok(var_text(size, 'a', MAX_BYTES_SAMPLE_LENGTH)),
        SqlTypeKind::NChar => Ok(fixed_text(size, 'Ω')),
        SqlTypeKind::NVarChar => Ok(var_text(size, 'Ω', MAX_NCHARS_SAMPLE_LENGTH)),
        SqlTypeKind::UniqueIdentifier => Ok(vec![
            SqlValue::Uuid(Uuid::nil()),
            SqlValue::Uuid(Uuid::from_u128(u128::MAX)),
        ]),
        SqlTypeKind::Bit => Ok(vec![SqlValue::Bool(false), SqlValue::Bool(true)]),
        SqlTypeKind::TinyInt => Ok(vec![SqlValue::U8(u8::MIN), SqlValue::U8(u8::MAX)]),
        SqlTypeKind::SmallInt => Ok(vec![
            SqlValue::I16(i16::MIN),
            SqlValue::I16(0),
            SqlValue::I16(i16::MAX),
        ]),
        SqlTypeKind::Int => Ok(vec![
            SqlValue::I32(i32::MIN),
            SqlValue::I32(0),
            SqlValue::I32(i32::MAX),
        ]),
        SqlTypeKind::BigInt => Ok(vec![
            SqlValue::I64(i64::MIN),
            SqlValue::I64(0),
            SqlValue::I64(i64::MAX),
        ]),
        SqlTypeKind::SmallMoney => decimals(kind, &SMALLMONEY_VALUES),
        SqlTypeKind::Money => decimals(kind, &MONEY_VALUES),
        SqlTypeKind::Decimal => decimal(type_def.precision, scale),
        SqlTypeKind::Real => Ok(vec![
            SqlValue::F32(f32::MIN),
            SqlValue::F32(-f32::MIN_POSITIVE),
            SqlValue::F32(0.0),
            SqlValue::F32(f32::MIN_POSITIVE),
            SqlValue::F32(f32::MAX),
        ]),
        SqlTypeKind::Float => Ok(vec![
            SqlValue::F64(f64::MIN),
            SqlValue::F64(-f64::MIN_POSITIVE),
            SqlValue::F64(0.0),
            SqlValue::F64(f64::MIN_POSITIVE),
            SqlValue::F64(f64::MAX),
        ]),
        SqlTypeKind::Time => Ok(vec![
            SqlValue::Time(midnight()),
            SqlValue::Time(end_of_day(kind, scale)?),
        ]),
        SqlTypeKind::Date => Ok(vec![
            SqlValue::Date(date(kind, 1, 1, 1)?),
            SqlValue::Date(date(kind, 9999, 12, 31)?),
        ]),
        SqlTypeKind::SmallDateTime => Ok(vec![
            SqlValue::DateTime(date(kind, 1900, 1, 1)?.and_time(midnight())),
            SqlValue::DateTime(date(kind, 2079, 6, 6)?.and_time(hms(kind, 23, 59, 0, 0)?)),
        ]),
        SqlTypeKind::DateTime => Ok(vec![
            SqlValue::DateTime(date(kind, 1753, 1, 1)?.and_time(midnight())),
            SqlValue::DateTime(
                date(kind, 9999, 12, 31)?.and_time(hms(kind, 23, 59, 59, 997_000_000)?),
            ),
        ]),
        SqlTypeKind::DateTime2 => Ok(vec![
            SqlValue::DateTime(date(kind, 1, 1, 1)?.and_time(midnight())),
            SqlValue::DateTime(date(kind, 9999, 12, 31)?.and_time(end_of_day(kind, scale)?)),
        ]),
        SqlTypeKind::DateTimeOffset => {
            let midnight_2000 = date(kind, 2000, 1, 1)?.and_time(midnight());
            Ok(vec![
                SqlValue::DateTimeOffset(with_offset(
                    kind,
                    date(kind, 1, 1, 1)?.and_time(midnight()),
                    0,
                )?),
                SqlValue::DateTimeOffset(with_offset(kind, midnight_2000, -MAX_OFFSET_SECONDS)?),
                SqlValue::DateTimeOffset(with_offset(kind, midnight_2000, MAX_OFFSET_SECONDS)?),
                SqlValue::DateTimeOffset(with_offset(
                    kind,
                    date(kind, 9999, 12, 31)?.and_time(end_of_day(kind, scale)?),
                    0,
                )?),
            ])
        }
        SqlTypeKind::NotSupported => Err(MatrixError::UnsupportedType(kind)),
    }
}

fn long_length(size: i32, max_sample: usize) -> usize {
    if size == mx_core::SIZE_MAX {
        max_sample
    } else {
        usize::try_from(size).unwrap_or(0)
    }
}

fn binary(size: i32) -> Vec<SqlValue> {
    vec![
        SqlValue::Bytes(vec![0x00]),
        SqlValue::Bytes(vec![0xFF; long_length(size, MAX_BYTES_SAMPLE_LENGTH)]),
    ]
}

fn var_binary(size: i32) -> Vec<SqlValue> {
    let mut values = vec![SqlValue::Bytes(Vec::new())];
    values.extend(binary(size));
    values
}

fn fixed_text(size: i32, fill: char) -> Vec<SqlValue> {
    vec![
        SqlValue::Text(" ".to_string()),
        SqlValue::Text(fill.to_string().repeat(long_length(size, 0))),
    ]
}

fn var_text(size: i32, fill: char, max_sample: usize) -> Vec<SqlValue> {
    vec![
        SqlValue::Text(String::new()),
        SqlValue::Text(" ".to_string()),
        SqlValue::Text(fill.to_string().repeat(long_length(size, max_sample))),
    ]
}

fn decimals(kind: SqlTypeKind, literals: &[&str]) -> MatrixResult<Vec<SqlValue>> {
    literals
        .iter()
        .map(|text| decimal_literal(kind, text))
        .collect()
}

fn decimal_literal(kind: SqlTypeKind, text: &str) -> MatrixResult<SqlValue> {
    BigDecimal::from_str(text)
        .map(SqlValue::Decimal)
        .map_err(|e| MatrixError::Range {
            kind,
            message: format!("cannot represent '{text}': {e}"),
        })
}

/// `-max, 0, 10^-scale, max` where max has `precision - scale` integer digits
fn decimal(precision: u8, scale: u8) -> MatrixResult<Vec<SqlValue>> {
    let kind = SqlTypeKind::Decimal;
    let integer_digits = usize::from(precision - scale);
    let fraction_digits = usize::from(scale);

    let integer_part = if integer_digits == 0 {
        "0".to_string()
    } else {
        "9".repeat(integer_digits)
    };
    let max = if fraction_digits == 0 {
        integer_part
    } else {
        format!("{integer_part}.{}", "9".repeat(fraction_digits))
    };
    let step = if fraction_digits == 0 {
        "1".to_string()
    } else {
        format!("0.{}1", "0".repeat(fraction_digits - 1))
    };

    Ok(vec![
        decimal_literal(kind, &format!("-{max}"))?,
        decimal_literal(kind, "0")?,
        decimal_literal(kind, &step)?,
        decimal_literal(kind, &max)?,
    ])
}

fn unrepresentable(kind: SqlTypeKind) -> MatrixError {
    MatrixError::Range {
        kind,
        message: "boundary value is not representable".to_string(),
    }
}

fn date(kind: SqlTypeKind, year: i32, month: u32, day: u32) -> MatrixResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| unrepresentable(kind))
}

fn hms(kind: SqlTypeKind, hour: u32, min: u32, sec: u32, nano: u32) -> MatrixResult<NaiveTime> {
    NaiveTime::from_hms_nano_opt(hour, min, sec, nano).ok_or_else(|| unrepresentable(kind))
}

/// Largest fraction of a second expressible with `scale` digits, in nanoseconds
pub fn max_fraction_nanos(scale: u8) -> u32 {
    let digits = u32::from(scale.min(9));
    (10u32.pow(digits) - 1) * 10u32.pow(9 - digits)
}

fn midnight() -> NaiveTime {
    NaiveTime::default()
}

fn end_of_day(kind: SqlTypeKind, scale: u8) -> MatrixResult<NaiveTime> {
    hms(kind, 23, 59, 59, max_fraction_nanos(scale))
}

fn with_offset(
    kind: SqlTypeKind,
    local: NaiveDateTime,
    offset_seconds: i32,
) -> MatrixResult<DateTime<FixedOffset>> {
    FixedOffset::east_opt(offset_seconds)
        .and_then(|offset| local.and_local_timezone(offset).single())
        .ok_or_else(|| unrepresentable(kind))
}

#[cfg(test)]
#[path = "builtin_test.rs"]
mod tests;
