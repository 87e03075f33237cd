//! Validation findings reported by definitions

use serde::{Deserialize, Serialize};

/// How serious a validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only
    Info,
    /// Suspicious but usable
    Warning,
    /// The definition cannot be used as-is
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
        }
    }
}

/// A single validation finding
///
/// Validation never throws: every check appends one of these, so callers can
/// report all problems of a definition at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Severity of the finding
    pub severity: Severity,

    /// Name of the offending property (may be empty for whole-object findings)
    pub property: String,

    /// Human-readable description
    pub message: String,
}

impl ValidationResult {
    /// Create a new finding
    pub fn new(severity: Severity, property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            property: property.into(),
            message: message.into(),
        }
    }

    /// Create an `Error` finding
    pub fn error(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, property, message)
    }

    /// Create a `Warning` finding
    pub fn warning(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, property, message)
    }

    /// Returns true for `Error` findings
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.property.trim().is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(
                f,
                "{}: Property '{}': {}",
                self.severity, self.property, self.message
            )
        }
    }
}

/// Returns true if any finding in the list is an error
pub fn has_errors(results: &[ValidationResult]) -> bool {
    results.iter().any(ValidationResult::is_error)
}
