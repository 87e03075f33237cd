//! Parameter definitions of the routine under test

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::sql_type::SqlTypeDefinition;
use crate::value::LiteralToken;

/// Strongly-typed, non-empty routine parameter name (usually `@Name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParameterName(String);

impl ParameterName {
    /// Try to create a parameter name, returning `None` if it is blank
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the underlying name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the name carries the T-SQL `@` prefix
    pub fn has_at_prefix(&self) -> bool {
        self.0.starts_with('@')
    }
}

impl<'de> Deserialize<'de> for ParameterName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ParameterName::try_new(s)
            .ok_or_else(|| serde::de::Error::custom("ParameterName must not be empty"))
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParameterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ParameterName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ParameterName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ParameterName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ParameterName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Direction of a routine parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterDirection {
    /// Value flows into the routine
    #[default]
    Input,
    /// Value is returned through the parameter
    Output,
}

impl<'de> Deserialize<'de> for ParameterDirection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.trim().to_ascii_uppercase().as_str() {
            "INPUT" | "IN" => Ok(ParameterDirection::Input),
            "OUTPUT" | "OUT" => Ok(ParameterDirection::Output),
            _ => Err(serde::de::Error::unknown_variant(&s, &["INPUT", "OUTPUT"])),
        }
    }
}

impl fmt::Display for ParameterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterDirection::Input => write!(f, "INPUT"),
            ParameterDirection::Output => write!(f, "OUTPUT"),
        }
    }
}

/// One parameter of the routine under test, with its type already parsed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDefinition {
    /// Parameter name
    pub name: ParameterName,

    /// Declared SQL type
    pub type_def: SqlTypeDefinition,

    /// Whether NULL is a legal argument
    pub nullable: bool,

    /// Whether the routine declares a default for this parameter
    pub has_default: bool,

    /// Parameter direction
    pub direction: ParameterDirection,

    /// Extra values supplied by the test author, in declaration order
    pub user_values: Vec<LiteralToken>,
}

impl ParameterDefinition {
    /// Create a non-nullable input parameter without default or user values
    pub fn new(name: ParameterName, type_def: SqlTypeDefinition) -> Self {
        Self {
            name,
            type_def,
            nullable: false,
            has_default: false,
            direction: ParameterDirection::Input,
            user_values: Vec::new(),
        }
    }

    /// Set whether NULL is a candidate
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set whether DEFAULT is a candidate
    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }

    /// Set the parameter direction
    pub fn direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Replace the user-supplied values
    pub fn user_values(mut self, values: impl IntoIterator<Item = LiteralToken>) -> Self {
        self.user_values = values.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_type::SqlTypeKind;

    #[test]
    fn test_parameter_name_rejects_blank() {
        assert!(ParameterName::try_new("").is_none());
        assert!(ParameterName::try_new("  ").is_none());
        let name = ParameterName::try_new("@Id").unwrap();
        assert_eq!(name, "@Id");
        assert!(name.has_at_prefix());

        let bad: Result<ParameterName, _> = serde_json::from_str(r#""""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        let d: ParameterDirection = serde_json::from_str(r#""output""#).unwrap();
        assert_eq!(d, ParameterDirection::Output);
        let d: ParameterDirection = serde_json::from_str(r#""Input""#).unwrap();
        assert_eq!(d, ParameterDirection::Input);
        assert!(serde_json::from_str::<ParameterDirection>(r#""sideways""#).is_err());
        assert_eq!(
            serde_json::to_string(&ParameterDirection::Output).unwrap(),
            r#""OUTPUT""#
        );
    }

    #[test]
    fn test_builder_helpers() {
        let param = ParameterDefinition::new(
            ParameterName::try_new("@Flag").unwrap(),
            SqlTypeDefinition::new(SqlTypeKind::Bit),
        )
        .nullable(true)
        .with_default(true)
        .user_values([LiteralToken::from("x")]);

        assert!(param.nullable);
        assert!(param.has_default);
        assert_eq!(param.direction, ParameterDirection::Input);
        assert_eq!(param.user_values.len(), 1);
    }
}
