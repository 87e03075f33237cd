//! Error types for mx-core

use thiserror::Error;

/// Failure to parse a textual SQL type declaration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    /// T001: Nothing to parse
    #[error("[T001] SQL type declaration is empty")]
    Empty,

    /// T002: Text does not match `NAME[(n|MAX[, n])]`
    #[error("[T002] Malformed SQL type declaration: '{text}'")]
    Malformed { text: String },

    /// T003: Keyword is not one of the supported types
    #[error("[T003] SQL type '{name}' is not supported")]
    UnknownType { name: String },

    /// T004: MAX used on a type without a MAX form
    #[error("[T004] MAX is not allowed for SQL type '{name}'")]
    MaxNotAllowed { name: String },

    /// T005: Number does not fit the attribute it is stored in
    #[error("[T005] Value '{value}' is out of range for {attribute} of SQL type '{name}'")]
    NumberOutOfRange {
        name: String,
        attribute: &'static str,
        value: String,
    },

    /// T006: Second number given for a type that only takes one
    #[error("[T006] SQL type '{name}' takes a single parameter")]
    UnexpectedScale { name: String },
}

/// Core error type for SQL Matrix
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Test definition file not found
    #[error("[E004] Test definition not found: {path}")]
    DefinitionNotFound { path: String },

    /// E005: Test definition could not be deserialized
    #[error("[E005] Failed to parse test definition {path}: {message}")]
    DefinitionParseError { path: String, message: String },

    /// E006: Unknown definition file extension
    #[error("[E006] Unsupported test definition format '{path}': expected .json, .yml or .yaml")]
    UnsupportedFormat { path: String },

    /// E007: An input declares a type that cannot be parsed
    #[error("[E007] Invalid SQL type for parameter '{parameter}': {source}")]
    InvalidParameterType {
        parameter: String,
        #[source]
        source: TypeParseError,
    },

    /// E008: IO error
    #[error("[E008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E009: IO error with file path context
    #[error("[E009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// YAML error
    #[error("YAML error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
