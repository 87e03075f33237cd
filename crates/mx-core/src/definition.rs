//! Test definition files (`*.json`, `*.yml`)
//!
//! A definition describes one routine under test and its input parameters.
//! Loading is strict: any malformed SQL type in an input fails
//! [`TestDefinition::parameters`]. [`TestDefinition::validate`] is lenient
//! and collects every problem into a list instead.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::parameter::{ParameterDefinition, ParameterDirection, ParameterName};
use crate::sql_type::SqlTypeDefinition;
use crate::validation::ValidationResult;
use crate::value::LiteralToken;

/// Version of the definition file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ApiVersion {
    /// First and current format
    #[default]
    #[serde(rename = "v1")]
    V1,
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("v1") {
            Ok(ApiVersion::V1)
        } else {
            Err(serde::de::Error::custom(format!(
                "Unsupported API version: {s}"
            )))
        }
    }
}

/// Kind of database object under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TestObjectType {
    /// Scalar-valued function
    ScalarFunction,
    /// Table-valued function
    TableValuedFunction,
    /// Stored procedure
    #[default]
    StoredProcedure,
}

impl std::fmt::Display for TestObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestObjectType::ScalarFunction => write!(f, "scalar function"),
            TestObjectType::TableValuedFunction => write!(f, "table-valued function"),
            TestObjectType::StoredProcedure => write!(f, "stored procedure"),
        }
    }
}

/// One entry of `Inputs` as written in the file
///
/// The SQL type stays text here so that a bad type does not prevent the rest
/// of the file from being validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDefinition {
    /// Parameter name, e.g. `@CustomerId`
    #[serde(rename = "ParameterName")]
    pub parameter_name: ParameterName,

    /// SQL type declaration, e.g. `NVARCHAR(50)`
    #[serde(rename = "SqlType")]
    pub sql_type: String,

    /// Whether NULL is tested
    #[serde(rename = "Nullable", default = "default_true")]
    pub nullable: bool,

    /// Whether the routine declares a default value
    #[serde(rename = "Default", default)]
    pub has_default: bool,

    /// Parameter direction
    #[serde(rename = "Direction", default)]
    pub direction: ParameterDirection,

    /// Additional values to test
    #[serde(rename = "UserValues", default)]
    pub user_values: Vec<LiteralToken>,
}

impl InputDefinition {
    /// Parse the declared type and build the parameter definition
    pub fn to_parameter(&self) -> CoreResult<ParameterDefinition> {
        let type_def = SqlTypeDefinition::parse(&self.sql_type).map_err(|source| {
            CoreError::InvalidParameterType {
                parameter: self.parameter_name.to_string(),
                source,
            }
        })?;

        Ok(ParameterDefinition::new(self.parameter_name.clone(), type_def)
            .nullable(self.nullable)
            .with_default(self.has_default)
            .direction(self.direction)
            .user_values(self.user_values.iter().cloned()))
    }
}

/// What a test case is expected to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpectedResultType {
    /// A single scalar value
    Value,
    /// One or more result sets
    Resultset,
    /// A raised error
    Exception,
}

impl<'de> Deserialize<'de> for ExpectedResultType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.trim().to_ascii_lowercase().as_str() {
            "value" => Ok(ExpectedResultType::Value),
            "resultset" => Ok(ExpectedResultType::Resultset),
            "exception" => Ok(ExpectedResultType::Exception),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["Value", "Resultset", "Exception"],
            )),
        }
    }
}

/// One entry of `ExpectedResults`
///
/// Expectations are carried through load and validation but not evaluated;
/// the matrix never executes a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedResult {
    /// Kind of outcome
    #[serde(rename = "ExpectedResultType")]
    pub result_type: ExpectedResultType,

    /// Error number of an expected exception
    #[serde(
        rename = "ExpectedErrorNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_number: Option<i32>,

    /// Expected scalar value
    #[serde(
        rename = "ExpectedValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<LiteralToken>,

    /// Expected result sets, kept as written
    #[serde(
        rename = "ExpectedResultSets",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub result_sets: Option<serde_json::Value>,

    /// Timestamp of the last recorded run
    #[serde(
        rename = "LastExecutionDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_execution_date_time: Option<String>,

    /// Duration of the last recorded run
    #[serde(
        rename = "LastExecutionDuration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_execution_duration: Option<String>,
}

impl ExpectedResult {
    fn validate(&self, index: usize, results: &mut Vec<ValidationResult>) {
        match self.result_type {
            ExpectedResultType::Exception if self.error_number.is_none() => {
                results.push(ValidationResult::error(
                    "ExpectedErrorNumber",
                    format!("Expected result {index}: an Exception needs an error number."),
                ));
            }
            ExpectedResultType::Value if self.value.is_none() => {
                results.push(ValidationResult::error(
                    "ExpectedValue",
                    format!("Expected result {index}: a Value needs an expected value."),
                ));
            }
            ExpectedResultType::Resultset if self.result_sets.is_none() => {
                results.push(ValidationResult::warning(
                    "ExpectedResultSets",
                    format!("Expected result {index}: no result sets given."),
                ));
            }
            _ => {}
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schema_name() -> String {
    "dbo".to_string()
}

fn default_max_execution_time() -> i64 {
    10
}

/// A complete test definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestDefinition {
    /// File format version
    #[serde(rename = "SQL-Matrix-Api-Version")]
    pub api_version: ApiVersion,

    /// Kind of the object under test
    #[serde(rename = "TestObjectType", default)]
    pub test_object_type: TestObjectType,

    /// Schema of the object under test
    #[serde(rename = "SchemaName", default = "default_schema_name")]
    pub schema_name: String,

    /// Name of the object under test
    #[serde(rename = "TestObjectName")]
    pub test_object_name: String,

    /// Timeout per test case in seconds
    #[serde(rename = "MaxExecutionTime", default = "default_max_execution_time")]
    pub max_execution_time: i64,

    /// Input parameters, in call order
    #[serde(rename = "Inputs", default)]
    pub inputs: Vec<InputDefinition>,

    /// Recorded expectations, not evaluated by the matrix
    #[serde(
        rename = "ExpectedResults",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub expected_results: Vec<ExpectedResult>,
}

impl TestDefinition {
    /// Load a definition file, choosing the format from its extension
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::DefinitionNotFound {
                path: path.display().to_string(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let is_json = match extension.as_deref() {
            Some("json") => true,
            Some("yml") | Some("yaml") => false,
            _ => {
                return Err(CoreError::UnsupportedFormat {
                    path: path.display().to_string(),
                })
            }
        };

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        let parsed: Result<TestDefinition, String> = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        let definition = parsed.map_err(|message| CoreError::DefinitionParseError {
            path: path.display().to_string(),
            message,
        })?;
        log::debug!(
            "Loaded test definition for {} from {}",
            definition.target_object(),
            path.display()
        );
        Ok(definition)
    }

    /// Parse a definition from JSON text
    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a definition from YAML text
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serialize the definition back to pretty JSON
    pub fn to_json_string(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Qualified name of the object under test, `schema.object`
    pub fn target_object(&self) -> String {
        format!("{}.{}", self.schema_name, self.test_object_name)
    }

    /// Timeout per test case, falling back to `default_timeout` when the file
    /// does not give a positive value
    pub fn timeout_seconds(&self, default_timeout: u32) -> u32 {
        if self.max_execution_time > 0 {
            u32::try_from(self.max_execution_time).unwrap_or(u32::MAX)
        } else {
            default_timeout
        }
    }

    /// Build parameter definitions for all inputs, failing on the first bad type
    pub fn parameters(&self) -> CoreResult<Vec<ParameterDefinition>> {
        self.inputs.iter().map(InputDefinition::to_parameter).collect()
    }

    /// Check the whole definition and report every problem found
    pub fn validate(&self) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        if self.schema_name.trim().is_empty() {
            results.push(ValidationResult::error(
                "SchemaName",
                "Schema name must not be empty.",
            ));
        }
        if self.test_object_name.trim().is_empty() {
            results.push(ValidationResult::error(
                "TestObjectName",
                "Test object name must not be empty.",
            ));
        }
        if self.max_execution_time <= 0 {
            results.push(ValidationResult::warning(
                "MaxExecutionTime",
                format!(
                    "MaxExecutionTime is {}; the configured default timeout will be used.",
                    self.max_execution_time
                ),
            ));
        }

        let mut seen = HashSet::new();
        for input in &self.inputs {
            let name = &input.parameter_name;
            if !seen.insert(name.to_ascii_lowercase()) {
                results.push(ValidationResult::error(
                    "ParameterName",
                    format!("Parameter '{name}' is declared more than once."),
                ));
            }
            if !name.has_at_prefix() {
                results.push(ValidationResult::warning(
                    "ParameterName",
                    format!("Parameter '{name}' does not start with '@'."),
                ));
            }

            match SqlTypeDefinition::parse(&input.sql_type) {
                Ok(type_def) => {
                    results.extend(type_def.validate().into_iter().map(|r| {
                        ValidationResult::new(
                            r.severity,
                            r.property,
                            format!("Parameter '{name}': {}", r.message),
                        )
                    }));
                }
                Err(e) => results.push(ValidationResult::error(
                    "SqlType",
                    format!("Parameter '{name}': {e}"),
                )),
            }

            if input.direction == ParameterDirection::Output && !input.user_values.is_empty() {
                results.push(ValidationResult::warning(
                    "UserValues",
                    format!("Parameter '{name}' is an output parameter; user values are ignored."),
                ));
            }
        }

        for (index, expected) in self.expected_results.iter().enumerate() {
            expected.validate(index + 1, &mut results);
        }

        results
    }
}

#[cfg(test)]
#[path = "definition_test.rs"]
mod tests;
