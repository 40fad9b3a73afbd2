//! # Error Types
//!
//! Structured error types for shape_core. Every failure names the thing that
//! broke (expression, variable, shape key) so callers can report it without
//! re-parsing message strings.
//!
//! ## Example
//!
//! ```rust
//! use shape_core::errors::{CalcError, CalcResult};
//!
//! fn validate_quantity(quantity: f64) -> CalcResult<()> {
//!     if quantity <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "quantity",
//!             quantity.to_string(),
//!             "Quantity must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for shape_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for formula evaluation and shape calculation.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Expression could not be parsed
    #[error("Syntax error in '{expression}' at position {position}: {message}")]
    Syntax {
        expression: String,
        position: usize,
        message: String,
    },

    /// One or more declared variables are absent from the context
    #[error("Missing variables for '{expression}': {}", missing.join(", "))]
    MissingVariables {
        expression: String,
        missing: Vec<String>,
    },

    /// Expression parsed but could not be evaluated
    #[error("Evaluation of '{expression}' failed: {reason}")]
    Evaluation { expression: String, reason: String },

    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Formulas the shape cannot do without failed to evaluate
    #[error("Required formulas failed for shape '{shape}': {}", formulas.join(", "))]
    RequiredFormulasFailed { shape: String, formulas: Vec<String> },

    /// A catalog entry is structurally unusable
    #[error("Corrupt catalog entry '{shape}': {reason}")]
    CorruptCatalogEntry { shape: String, reason: String },

    /// Shape key not present in the catalog
    #[error("Shape not found: {key}")]
    ShapeNotFound { key: String },

    /// Category group name is not known to the registry
    #[error("Unknown category group: {group}")]
    UnknownCategoryGroup { group: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create a Syntax error
    pub fn syntax(expression: impl Into<String>, position: usize, message: impl Into<String>) -> Self {
        CalcError::Syntax {
            expression: expression.into(),
            position,
            message: message.into(),
        }
    }

    /// Create a MissingVariables error
    pub fn missing_variables(expression: impl Into<String>, missing: Vec<String>) -> Self {
        CalcError::MissingVariables {
            expression: expression.into(),
            missing,
        }
    }

    /// Create an Evaluation error
    pub fn evaluation(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Evaluation {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a CorruptCatalogEntry error
    pub fn corrupt_entry(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CorruptCatalogEntry {
            shape: shape.into(),
            reason: reason.into(),
        }
    }

    /// Create a ShapeNotFound error
    pub fn shape_not_found(key: impl Into<String>) -> Self {
        CalcError::ShapeNotFound { key: key.into() }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Syntax { .. } => "SYNTAX_ERROR",
            CalcError::MissingVariables { .. } => "MISSING_VARIABLES",
            CalcError::Evaluation { .. } => "EVALUATION_ERROR",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::RequiredFormulasFailed { .. } => "REQUIRED_FORMULAS_FAILED",
            CalcError::CorruptCatalogEntry { .. } => "CORRUPT_CATALOG_ENTRY",
            CalcError::ShapeNotFound { .. } => "SHAPE_NOT_FOUND",
            CalcError::UnknownCategoryGroup { .. } => "UNKNOWN_CATEGORY_GROUP",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::missing_variables("L*W*t", vec!["t".to_string()]);
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_missing_variables_message_names_every_variable() {
        let error = CalcError::missing_variables("L*W*t", vec!["W".to_string(), "t".to_string()]);
        assert_eq!(error.to_string(), "Missing variables for 'L*W*t': W, t");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::shape_not_found("x").error_code(), "SHAPE_NOT_FOUND");
        assert_eq!(CalcError::syntax("1+", 2, "unexpected end").error_code(), "SYNTAX_ERROR");
    }
}
