//! Conversion of user-supplied literal tokens into typed SQL values
//!
//! The accepted token kinds and the target representation are decided once
//! from the parameter's [`SqlTypeKind`]; a token is never tried against
//! several types to see which one sticks.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Offset};
use mx_core::{LiteralToken, SqlTypeDefinition, SqlTypeKind, SqlValue};
use std::str::FromStr;
use uuid::Uuid;

use crate::builtin::{MONEY_VALUES, SMALLMONEY_VALUES};
use crate::error::{ConversionError, ConversionResult};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATETIMEOFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %:z";
const MAX_OFFSET_SECONDS: i32 = 14 * 3600;

/// Convert one user token into a value of `type_def`
pub fn convert_user_value(
    type_def: &SqlTypeDefinition,
    token: &LiteralToken,
) -> ConversionResult<SqlValue> {
    let kind = type_def.kind;
    if *token == LiteralToken::Null {
        return Err(ConversionError::NullNotAllowed);
    }

    match kind {
        SqlTypeKind::Char | SqlTypeKind::VarChar | SqlTypeKind::NChar | SqlTypeKind::NVarChar => {
            Ok(SqlValue::Text(expect_text(kind, token)?.to_string()))
        }
        SqlTypeKind::Binary | SqlTypeKind::VarBinary => {
            parse_hex(kind, expect_text(kind, token)?).map(SqlValue::Bytes)
        }
        SqlTypeKind::UniqueIdentifier => {
            let text = expect_text(kind, token)?;
            Uuid::parse_str(text.trim())
                .map(SqlValue::Uuid)
                .map_err(|e| invalid(kind, e))
        }
        SqlTypeKind::Bit | SqlTypeKind::NotSupported => Err(ConversionError::NotSupported { kind }),
        SqlTypeKind::TinyInt => {
            integer(kind, token, |n| u8::try_from(n).ok().map(SqlValue::U8))
        }
        SqlTypeKind::SmallInt => {
            integer(kind, token, |n| i16::try_from(n).ok().map(SqlValue::I16))
        }
        SqlTypeKind::Int => integer(kind, token, |n| i32::try_from(n).ok().map(SqlValue::I32)),
        SqlTypeKind::BigInt => {
            integer(kind, token, |n| i64::try_from(n).ok().map(SqlValue::I64))
        }
        SqlTypeKind::SmallMoney => money(kind, token, &SMALLMONEY_VALUES),
        SqlTypeKind::Money => money(kind, token, &MONEY_VALUES),
        SqlTypeKind::Decimal => {
            let value = exact_decimal(kind, token)?;
            let allowed = usize::from(type_def.precision.saturating_sub(type_def.scale));
            if integer_digits(&value) > allowed {
                return Err(ConversionError::OutOfRange { kind });
            }
            Ok(SqlValue::Decimal(value))
        }
        SqlTypeKind::Real => {
            let text = expect_number(kind, token)?;
            let value = f32::from_str(text).map_err(|e| invalid(kind, e))?;
            if !value.is_finite() {
                return Err(ConversionError::OutOfRange { kind });
            }
            Ok(SqlValue::F32(value))
        }
        SqlTypeKind::Float => {
            let text = expect_number(kind, token)?;
            let value = f64::from_str(text).map_err(|e| invalid(kind, e))?;
            if !value.is_finite() {
                return Err(ConversionError::OutOfRange { kind });
            }
            Ok(SqlValue::F64(value))
        }
        SqlTypeKind::Time => {
            let text = expect_text(kind, token)?.trim();
            NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
                .or_else(|_| parse_datetime(text).map(|dt| dt.time()).ok_or(()))
                .map(SqlValue::Time)
                .map_err(|_| invalid(kind, "expected HH:MM:SS[.fffffff]"))
        }
        SqlTypeKind::Date => {
            let text = expect_text(kind, token)?.trim();
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .or_else(|| parse_datetime(text).map(|dt| dt.date()))
                .ok_or_else(|| invalid(kind, "expected YYYY-MM-DD"))?;
            check_year(kind, date.year())?;
            Ok(SqlValue::Date(date))
        }
        SqlTypeKind::SmallDateTime | SqlTypeKind::DateTime | SqlTypeKind::DateTime2 => {
            let text = expect_text(kind, token)?.trim();
            let value = parse_datetime(text)
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .map(|d| d.and_time(NaiveTime::default()))
                })
                .ok_or_else(|| invalid(kind, "expected YYYY-MM-DD[ HH:MM:SS[.fffffff]]"))?;
            check_datetime_range(kind, value)?;
            Ok(SqlValue::DateTime(value))
        }
        SqlTypeKind::DateTimeOffset => {
            let text = expect_text(kind, token)?.trim();
            let value = DateTime::parse_from_rfc3339(text)
                .or_else(|_| DateTime::parse_from_str(text, DATETIMEOFFSET_FORMAT))
                .map_err(|e| invalid(kind, e))?;
            check_year(kind, value.year())?;
            if value.offset().fix().local_minus_utc().abs() > MAX_OFFSET_SECONDS {
                return Err(ConversionError::OutOfRange { kind });
            }
            Ok(SqlValue::DateTimeOffset(value))
        }
    }
}

fn invalid(kind: SqlTypeKind, message: impl std::fmt::Display) -> ConversionError {
    ConversionError::InvalidLiteral {
        kind,
        message: message.to_string(),
    }
}

fn expect_text(kind: SqlTypeKind, token: &LiteralToken) -> ConversionResult<&str> {
    match token {
        LiteralToken::Text(s) => Ok(s),
        other => Err(ConversionError::WrongTokenKind {
            kind,
            expected: "string",
            found: other.kind_name(),
        }),
    }
}

fn expect_number(kind: SqlTypeKind, token: &LiteralToken) -> ConversionResult<&str> {
    match token {
        LiteralToken::Number(s) => Ok(s),
        other => Err(ConversionError::WrongTokenKind {
            kind,
            expected: "number",
            found: other.kind_name(),
        }),
    }
}

fn integer(
    kind: SqlTypeKind,
    token: &LiteralToken,
    narrow: impl Fn(i128) -> Option<SqlValue>,
) -> ConversionResult<SqlValue> {
    let text = expect_number(kind, token)?;
    let wide = i128::from_str(text).map_err(|e| invalid(kind, e))?;
    narrow(wide).ok_or(ConversionError::OutOfRange { kind })
}

fn exact_decimal(kind: SqlTypeKind, token: &LiteralToken) -> ConversionResult<BigDecimal> {
    let text = match token {
        LiteralToken::Number(s) | LiteralToken::Text(s) => s.trim(),
        other => {
            return Err(ConversionError::WrongTokenKind {
                kind,
                expected: "number",
                found: other.kind_name(),
            })
        }
    };
    BigDecimal::from_str(text).map_err(|e| invalid(kind, e))
}

fn money(
    kind: SqlTypeKind,
    token: &LiteralToken,
    bounds: &[&str; 4],
) -> ConversionResult<SqlValue> {
    let value = exact_decimal(kind, token)?;
    let min = BigDecimal::from_str(bounds[0]).map_err(|e| invalid(kind, e))?;
    let max = BigDecimal::from_str(bounds[3]).map_err(|e| invalid(kind, e))?;
    if value < min || value > max {
        return Err(ConversionError::OutOfRange { kind });
    }
    Ok(SqlValue::Decimal(value))
}

/// Number of digits before the decimal point, ignoring sign
fn integer_digits(value: &BigDecimal) -> usize {
    let whole = value.abs().with_scale(0).to_plain_string();
    if whole == "0" {
        0
    } else {
        whole.len()
    }
}

fn parse_hex(kind: SqlTypeKind, text: &str) -> ConversionResult<Vec<u8>> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| invalid(kind, "binary values must start with 0x"))?;
    if digits.len() % 2 != 0 {
        return Err(invalid(kind, "odd number of hex digits"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| invalid(kind, format!("invalid hex digits at offset {i}")))
        })
        .collect()
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn check_year(kind: SqlTypeKind, year: i32) -> ConversionResult<()> {
    if (1..=9999).contains(&year) {
        Ok(())
    } else {
        Err(ConversionError::OutOfRange { kind })
    }
}

fn check_datetime_range(kind: SqlTypeKind, value: NaiveDateTime) -> ConversionResult<()> {
    let (min_year, max) = match kind {
        SqlTypeKind::SmallDateTime => (1900, NaiveDate::from_ymd_opt(2079, 6, 6)),
        SqlTypeKind::DateTime => (1753, NaiveDate::from_ymd_opt(9999, 12, 31)),
        _ => (1, NaiveDate::from_ymd_opt(9999, 12, 31)),
    };
    let in_range = value.year() >= min_year && max.map_or(false, |last| value.date() <= last);
    if in_range {
        Ok(())
    } else {
        Err(ConversionError::OutOfRange { kind })
    }
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
