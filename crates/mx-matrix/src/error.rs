//! Error types for mx-matrix

use mx_core::{CoreError, SqlTypeKind};
use thiserror::Error;

use crate::matrix::TestCaseState;

/// Fatal errors while building a test matrix
#[derive(Error, Debug)]
pub enum MatrixError {
    /// Parameter ended up without a single candidate (M001)
    #[error("[M001] Parameter '{parameter}' has no candidate values")]
    EmptyDimension { parameter: String },

    /// Type attributes outside the legal range of the kind (M002)
    #[error("[M002] Invalid {kind} definition: {message}")]
    Range { kind: SqlTypeKind, message: String },

    /// No boundary values exist for the kind (M003)
    #[error("[M003] SQL type {0} is not supported")]
    UnsupportedType(SqlTypeKind),

    /// Failure while building one parameter (M004)
    #[error("[M004] Parameter '{parameter}': {source}")]
    Parameter {
        parameter: String,
        #[source]
        source: Box<MatrixError>,
    },

    /// Dimension of cardinality zero (M005)
    #[error("[M005] Dimension size must be at least 1")]
    ZeroDimension,

    /// Matrix exceeds the configured ceiling (M006)
    #[error("[M006] Matrix has {total} combinations, more than the limit of {limit}")]
    TooManyCombinations { total: u128, limit: u64 },

    /// Illegal test case state change (M007)
    #[error("[M007] Invalid test case state transition from {from} to {to}")]
    InvalidTransition {
        from: TestCaseState,
        to: TestCaseState,
    },

    /// Definition could not be turned into parameters (M008)
    #[error("[M008] Invalid test definition: {0}")]
    InvalidDefinition(#[from] CoreError),
}

impl MatrixError {
    /// Attach the parameter name to an error raised while building its candidates
    pub fn for_parameter(self, parameter: &str) -> Self {
        match self {
            // already names the parameter
            MatrixError::EmptyDimension { .. } | MatrixError::Parameter { .. } => self,
            other => MatrixError::Parameter {
                parameter: parameter.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Name of the parameter the error refers to, if any
    pub fn parameter(&self) -> Option<&str> {
        match self {
            MatrixError::EmptyDimension { parameter } | MatrixError::Parameter { parameter, .. } => {
                Some(parameter)
            }
            _ => None,
        }
    }
}

/// Result type alias for MatrixError
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Why a user value could not be used for a parameter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// NULL is expressed through `Nullable`, not as a user value (C001)
    #[error("[C001] NULL is not allowed as a user value; use Nullable instead")]
    NullNotAllowed,

    /// Token kind cannot represent the target type (C002)
    #[error("[C002] Expected {expected} for {kind}, found {found}")]
    WrongTokenKind {
        kind: SqlTypeKind,
        expected: &'static str,
        found: &'static str,
    },

    /// Literal text is not a valid value of the target type (C003)
    #[error("[C003] Invalid {kind} literal: {message}")]
    InvalidLiteral { kind: SqlTypeKind, message: String },

    /// Value parsed but lies outside the type's domain (C004)
    #[error("[C004] Value is out of range for {kind}")]
    OutOfRange { kind: SqlTypeKind },

    /// Kind does not take user values at all (C005)
    #[error("[C005] User values are not supported for {kind}")]
    NotSupported { kind: SqlTypeKind },
}

/// Result type alias for ConversionError
pub type ConversionResult<T> = Result<T, ConversionError>;
