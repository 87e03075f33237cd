//! Candidate values for a single parameter

use mx_core::{ParameterDefinition, ParameterDirection, SqlValue};
use serde::Serialize;

use crate::builtin::BoundaryValues;
use crate::convert::convert_user_value;
use crate::error::{ConversionError, MatrixError, MatrixResult};

/// One value a parameter can take in a test case, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum CandidateValue {
    /// SQL NULL
    Null,
    /// The routine's declared default (argument omitted)
    Default,
    /// Derived from the type's boundary values
    Builtin(SqlValue),
    /// Supplied by the test author
    User(SqlValue),
}

impl CandidateValue {
    /// The typed value, if the candidate carries one
    pub fn value(&self) -> Option<&SqlValue> {
        match self {
            CandidateValue::Builtin(v) | CandidateValue::User(v) => Some(v),
            CandidateValue::Null | CandidateValue::Default => None,
        }
    }

    /// Render as the argument text of an EXEC or SELECT call
    pub fn to_sql_literal(&self) -> String {
        match self {
            CandidateValue::Null => "NULL".to_string(),
            CandidateValue::Default => "DEFAULT".to_string(),
            CandidateValue::Builtin(v) | CandidateValue::User(v) => v.to_sql_literal(),
        }
    }
}

impl std::fmt::Display for CandidateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateValue::Null => write!(f, "NULL"),
            CandidateValue::Default => write!(f, "DEFAULT"),
            CandidateValue::Builtin(v) => write!(f, "{v}"),
            CandidateValue::User(v) => write!(f, "{v} (user)"),
        }
    }
}

/// A user value that was dropped because it could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionDiagnostic {
    /// Parameter the value belonged to
    pub parameter: String,

    /// Position of the value in the parameter's user value list
    pub index: usize,

    /// Offending token, cut to 20 characters
    pub token: String,

    /// Why conversion failed
    pub error: ConversionError,
}

impl std::fmt::Display for ConversionDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parameter '{}': user value #{} {} ignored: {}",
            self.parameter,
            self.index + 1,
            self.token,
            self.error
        )
    }
}

/// The candidate list (dimension) of one parameter
#[derive(Debug, Clone)]
pub struct ParameterCandidates {
    /// Candidates in fixed order: Null, Default, builtin values, user values
    pub values: Vec<CandidateValue>,

    /// User values that were dropped
    pub diagnostics: Vec<ConversionDiagnostic>,
}

impl ParameterCandidates {
    /// Number of candidates
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when there are no candidates
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds candidate lists from parameter definitions
pub struct CandidateBuilder<'a> {
    source: &'a dyn BoundaryValues,
}

impl<'a> CandidateBuilder<'a> {
    /// Create a builder drawing boundary values from `source`
    pub fn new(source: &'a dyn BoundaryValues) -> Self {
        Self { source }
    }

    /// Assemble the candidates of one parameter
    ///
    /// Order is `Null` (if nullable), `Default` (if the parameter has one),
    /// every builtin value, then every user value that converts. Output
    /// parameters ignore user values.
    pub fn build_candidates(&self, param: &ParameterDefinition) -> MatrixResult<ParameterCandidates> {
        let name = param.name.as_str();
        let mut values = Vec::new();
        let mut diagnostics = Vec::new();

        if param.nullable {
            values.push(CandidateValue::Null);
        }
        if param.has_default {
            values.push(CandidateValue::Default);
        }

        let builtin = self
            .source
            .boundary_values(&param.type_def)
            .map_err(|e| e.for_parameter(name))?;
        values.extend(builtin.into_iter().map(CandidateValue::Builtin));

        if param.direction == ParameterDirection::Output && !param.user_values.is_empty() {
            log::debug!(
                "Ignoring {} user values of output parameter '{}'",
                param.user_values.len(),
                name
            );
        } else {
            for (index, token) in param.user_values.iter().enumerate() {
                match convert_user_value(&param.type_def, token) {
                    Ok(value) => values.push(CandidateValue::User(value)),
                    Err(error) => {
                        let diagnostic = ConversionDiagnostic {
                            parameter: name.to_string(),
                            index,
                            token: token.preview(),
                            error,
                        };
                        log::warn!("{diagnostic}");
                        diagnostics.push(diagnostic);
                    }
                }
            }
        }

        if values.is_empty() {
            return Err(MatrixError::EmptyDimension {
                parameter: name.to_string(),
            });
        }

        log::debug!("Parameter '{}' has {} candidates", name, values.len());
        Ok(ParameterCandidates {
            values,
            diagnostics,
        })
    }
}

#[cfg(test)]
#[path = "candidate_test.rs"]
mod tests;
