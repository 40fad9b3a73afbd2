//! # Formula Definition Model
//!
//! Catalog records pairing an expression string with its declared variables
//! and unit, plus the per-evaluation context and result types.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "expression": "L * W * t * density / 1e9",
//!   "variables": ["L", "W", "t", "density"],
//!   "unit": "kg",
//!   "description": "Plate weight",
//!   "requiresDensity": true,
//!   "expectedRange": { "min": 0.1, "max": 50000, "warning": "Unusual plate weight" }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Name under which the material density enters an evaluation context
pub const DENSITY_VARIABLE: &str = "density";

/// Variable name → value for one evaluation
pub type EvaluationContext = HashMap<String, f64>;

/// Advisory bounds on a formula result. Violations warn, never fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRange {
    pub min: f64,
    pub max: f64,
    /// Message to log when the result falls outside `[min, max]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ExpectedRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One catalog formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaDefinition {
    /// Arithmetic expression, e.g. `"L * W * t"`
    pub expression: String,

    /// Variables the expression needs, in declaration order
    #[serde(default)]
    pub variables: Vec<String>,

    /// Unit of the result (e.g. "mm³", "kg")
    pub unit: String,

    #[serde(default)]
    pub description: String,

    /// Material density must be supplied as `density`
    #[serde(default)]
    pub requires_density: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_range: Option<ExpectedRange>,
}

impl FormulaDefinition {
    /// Create a formula with its declared variables and unit.
    ///
    /// ```rust
    /// use shape_core::formula::FormulaDefinition;
    ///
    /// let volume = FormulaDefinition::new("L * W * t", &["L", "W", "t"], "mm³");
    /// assert!(!volume.requires_density);
    /// ```
    pub fn new(expression: impl Into<String>, variables: &[&str], unit: impl Into<String>) -> Self {
        FormulaDefinition {
            expression: expression.into(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            unit: unit.into(),
            description: String::new(),
            requires_density: false,
            expected_range: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the formula as density-dependent; `density` is declared if missing.
    pub fn with_density(mut self) -> Self {
        self.requires_density = true;
        if !self.variables.iter().any(|v| v == DENSITY_VARIABLE) {
            self.variables.push(DENSITY_VARIABLE.to_string());
        }
        self
    }

    pub fn with_expected_range(mut self, min: f64, max: f64, warning: impl Into<String>) -> Self {
        self.expected_range = Some(ExpectedRange {
            min,
            max,
            warning: Some(warning.into()),
        });
        self
    }
}

/// Advisory notice that a result fell outside its expected range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeWarning {
    pub expression: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub message: String,
}

impl RangeWarning {
    pub fn describe(&self) -> String {
        format!(
            "{} (value {} outside [{}, {}] for '{}')",
            self.message, self.value, self.min, self.max, self.expression
        )
    }
}

/// Successful evaluation of one formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub result: f64,
    pub unit: String,
    pub expression: String,
    /// Declared variables with the values they resolved to
    pub variables: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_warning: Option<RangeWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_density_declares_density_once() {
        let formula = FormulaDefinition::new("V * density / 1e9", &["V", "density"], "kg").with_density();
        assert!(formula.requires_density);
        assert_eq!(formula.variables, vec!["V", "density"]);

        let formula = FormulaDefinition::new("V * density / 1e9", &["V"], "kg").with_density();
        assert_eq!(formula.variables, vec!["V", "density"]);
    }

    #[test]
    fn test_camel_case_json() {
        let json = r#"{
            "expression": "L * W",
            "variables": ["L", "W"],
            "unit": "mm²",
            "requiresDensity": false,
            "expectedRange": { "min": 0, "max": 100 }
        }"#;
        let formula: FormulaDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(formula.variables, vec!["L", "W"]);
        assert_eq!(formula.description, "");
        let range = formula.expected_range.unwrap();
        assert!(range.contains(100.0));
        assert!(!range.contains(100.5));
        assert!(range.warning.is_none());
    }
}
