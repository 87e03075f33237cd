//! mx-core - Core library for SQL Matrix
//!
//! This crate provides the SQL type model (parse, validate, render), typed
//! SQL values, parameter definitions, test definition files and project
//! configuration shared by the matrix builder and the command line.

pub mod config;
pub mod definition;
pub mod error;
pub mod parameter;
pub mod sql_type;
pub mod validation;
pub mod value;

pub use config::Config;
pub use definition::{
    ApiVersion, ExpectedResult, ExpectedResultType, InputDefinition, TestDefinition,
    TestObjectType,
};
pub use error::{CoreError, CoreResult, TypeParseError};
pub use parameter::{ParameterDefinition, ParameterDirection, ParameterName};
pub use sql_type::{SqlTypeDefinition, SqlTypeKind, SIZE_MAX};
pub use validation::{has_errors, Severity, ValidationResult};
pub use value::{LiteralToken, SqlValue};
