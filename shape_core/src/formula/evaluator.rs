//! # Expression Evaluator
//!
//! Evaluates one [`FormulaDefinition`] against one [`EvaluationContext`].
//!
//! Declared variables are checked before anything is parsed or computed, so a
//! formula with an incomplete context fails with
//! [`CalcError::MissingVariables`] naming every absent name and never yields a
//! partial result.
//!
//! ## Example
//!
//! ```rust
//! use shape_core::formula::{evaluate, EvaluationContext, FormulaDefinition};
//!
//! let weight = FormulaDefinition::new("L * W * t * density / 1e9", &["L", "W", "t"], "kg")
//!     .with_density();
//! let context: EvaluationContext = [("L", 1000.0), ("W", 1000.0), ("t", 10.0)]
//!     .into_iter()
//!     .map(|(k, v)| (k.to_string(), v))
//!     .collect();
//!
//! let result = evaluate(&weight, &context, Some(7850.0)).unwrap();
//! assert_eq!(result.result, 78.5);
//! ```

use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::definition::{EvaluationContext, EvaluationResult, FormulaDefinition, RangeWarning, DENSITY_VARIABLE};
use super::expression::{parse, Expr};
use crate::errors::{CalcError, CalcResult};

/// An expression parsed once, reusable for variable discovery and evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    ast: Expr,
    variables: Vec<String>,
}

impl CompiledExpression {
    pub fn compile(source: &str) -> CalcResult<Self> {
        let ast = parse(source)?;
        let variables = ast.variables();
        Ok(CompiledExpression {
            source: source.to_string(),
            ast,
            variables,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Free symbols in first-occurrence order, constants excluded
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Evaluate against plain numbers. Values are lifted into decimal first.
    pub fn evaluate(&self, values: &HashMap<String, f64>) -> CalcResult<f64> {
        let mut scope = HashMap::with_capacity(self.variables.len());
        for name in &self.variables {
            if let Some(value) = values.get(name) {
                scope.insert(name.clone(), to_decimal(&self.source, name, *value)?);
            }
        }
        let value = self
            .ast
            .eval(&scope)
            .map_err(|failure| CalcError::evaluation(&self.source, failure.to_string()))?;
        value
            .to_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CalcError::evaluation(&self.source, format!("result {} is not representable", value)))
    }
}

fn to_decimal(expression: &str, name: &str, value: f64) -> CalcResult<Decimal> {
    if !value.is_finite() {
        return Err(CalcError::evaluation(
            expression,
            format!("variable '{}' is not a finite number ({})", name, value),
        ));
    }
    Decimal::from_f64(value).ok_or_else(|| {
        CalcError::evaluation(
            expression,
            format!("variable '{}' = {} is outside the decimal range", name, value),
        )
    })
}

/// Evaluate a formula against a context, with optional material density.
///
/// When `density` is given it is bound to `density`, taking precedence over a
/// context entry of the same name.
///
/// # Errors
///
/// * `MissingVariables` - a declared variable (or the required density) is absent
/// * `Syntax` - the expression is malformed
/// * `Evaluation` - division by zero, domain errors, overflow, undeclared symbols
pub fn evaluate(
    formula: &FormulaDefinition,
    context: &EvaluationContext,
    density: Option<f64>,
) -> CalcResult<EvaluationResult> {
    let resolve = |name: &str| -> Option<f64> {
        if name == DENSITY_VARIABLE {
            if let Some(d) = density {
                return Some(d);
            }
        }
        context.get(name).copied()
    };

    let mut missing: Vec<String> = formula
        .variables
        .iter()
        .filter(|name| resolve(name).is_none())
        .cloned()
        .collect();
    if formula.requires_density
        && resolve(DENSITY_VARIABLE).is_none()
        && !missing.iter().any(|m| m == DENSITY_VARIABLE)
    {
        missing.push(DENSITY_VARIABLE.to_string());
    }
    if !missing.is_empty() {
        return Err(CalcError::missing_variables(&formula.expression, missing));
    }

    let compiled = CompiledExpression::compile(&formula.expression)?;
    let values: HashMap<String, f64> = compiled
        .variables()
        .iter()
        .filter_map(|name| resolve(name).map(|v| (name.clone(), v)))
        .collect();
    let result = compiled.evaluate(&values)?;

    let range_warning = formula.expected_range.as_ref().and_then(|range| {
        if range.contains(result) {
            return None;
        }
        let warning = RangeWarning {
            expression: formula.expression.clone(),
            value: result,
            min: range.min,
            max: range.max,
            message: range
                .warning
                .clone()
                .unwrap_or_else(|| "Result outside expected range".to_string()),
        };
        tracing::warn!(
            expression = %formula.expression,
            value = result,
            min = range.min,
            max = range.max,
            "{}",
            warning.message
        );
        Some(warning)
    });

    let variables: BTreeMap<String, f64> = formula
        .variables
        .iter()
        .filter_map(|name| resolve(name).map(|v| (name.clone(), v)))
        .collect();

    Ok(EvaluationResult {
        result,
        unit: formula.unit.clone(),
        expression: formula.expression.clone(),
        variables,
        range_warning,
    })
}

/// Parse an expression without evaluating it.
///
/// ```rust
/// use shape_core::formula::validate_syntax;
///
/// assert!(validate_syntax("pi * (D / 2)^2").is_ok());
/// assert!(validate_syntax("pi * (D / 2").is_err());
/// ```
pub fn validate_syntax(expression: &str) -> CalcResult<()> {
    parse(expression).map(|_| ())
}

/// Free symbols of an expression, deduplicated in first-occurrence order.
/// Reserved constants (`pi`, `e`, ...) and function names are excluded.
pub fn extract_variables(expression: &str) -> CalcResult<Vec<String>> {
    Ok(CompiledExpression::compile(expression)?.variables().to_vec())
}

/// Declared-vs-used variable comparison for authoring tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableCheck {
    /// Used by the expression but not declared
    pub undeclared: Vec<String>,
    /// Declared but never referenced
    pub unused: Vec<String>,
}

impl VariableCheck {
    pub fn is_consistent(&self) -> bool {
        self.undeclared.is_empty() && self.unused.is_empty()
    }
}

/// Compare a formula's declared `variables` with what its expression uses.
pub fn check_declared_variables(formula: &FormulaDefinition) -> CalcResult<VariableCheck> {
    let used = extract_variables(&formula.expression)?;
    let undeclared = used
        .iter()
        .filter(|name| !formula.variables.contains(name))
        .cloned()
        .collect();
    let unused = formula
        .variables
        .iter()
        .filter(|name| !used.contains(name))
        .cloned()
        .collect();
    Ok(VariableCheck { undeclared, unused })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(values: &[(&str, f64)]) -> EvaluationContext {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_plate_volume_and_weight() {
        let ctx = context(&[("L", 1000.0), ("W", 1000.0), ("t", 10.0)]);
        let volume = FormulaDefinition::new("L * W * t", &["L", "W", "t"], "mm³");
        assert_eq!(evaluate(&volume, &ctx, None).unwrap().result, 10_000_000.0);

        let weight = FormulaDefinition::new("L * W * t * density / 1e9", &["L", "W", "t"], "kg").with_density();
        let result = evaluate(&weight, &ctx, Some(7850.0)).unwrap();
        assert_eq!(result.result, 78.5);
        assert_eq!(result.unit, "kg");
        assert_eq!(result.variables.get("density"), Some(&7850.0));
        assert!(result.range_warning.is_none());
    }

    #[test]
    fn test_tube_volume_matches_reference() {
        let formula = FormulaDefinition::new("pi * ((OD/2)^2 - (OD/2 - t)^2) * L", &["OD", "t", "L"], "mm³");
        let ctx = context(&[("OD", 500.0), ("t", 10.0), ("L", 3000.0)]);
        let expected = std::f64::consts::PI * (250.0_f64.powi(2) - 240.0_f64.powi(2)) * 3000.0;
        let result = evaluate(&formula, &ctx, None).unwrap().result;
        assert!((result - expected).abs() < 1e-6);
    }

    #[test]
    fn test_missing_variables_named_before_evaluation() {
        // Syntax is broken too; the missing-variable check must win
        let formula = FormulaDefinition::new("L * W * (t", &["L", "W", "t"], "mm³");
        let err = evaluate(&formula, &context(&[("W", 1.0)]), None).unwrap_err();
        assert_eq!(
            err,
            CalcError::missing_variables("L * W * (t", vec!["L".to_string(), "t".to_string()])
        );
    }

    #[test]
    fn test_missing_density() {
        let formula = FormulaDefinition::new("V * density", &["V"], "kg").with_density();
        let err = evaluate(&formula, &context(&[("V", 1.0)]), None).unwrap_err();
        match err {
            CalcError::MissingVariables { missing, .. } => assert_eq!(missing, vec!["density"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_density_from_context_is_accepted() {
        let formula = FormulaDefinition::new("V * density", &["V"], "kg").with_density();
        let result = evaluate(&formula, &context(&[("V", 2.0), ("density", 3.0)]), None).unwrap();
        assert_eq!(result.result, 6.0);
    }

    #[test]
    fn test_range_violation_warns_but_succeeds() {
        let formula = FormulaDefinition::new("L * 2", &["L"], "mm").with_expected_range(0.0, 10.0, "Too long");
        let result = evaluate(&formula, &context(&[("L", 50.0)]), None).unwrap();
        assert_eq!(result.result, 100.0);
        let warning = result.range_warning.unwrap();
        assert_eq!(warning.message, "Too long");
        assert_eq!(warning.value, 100.0);
    }

    #[test]
    fn test_undeclared_symbol_is_evaluation_error() {
        let formula = FormulaDefinition::new("L * k", &["L"], "mm");
        let err = evaluate(&formula, &context(&[("L", 1.0)]), None).unwrap_err();
        assert_eq!(err.error_code(), "EVALUATION_ERROR");
    }

    #[test]
    fn test_non_finite_input_is_evaluation_error() {
        let formula = FormulaDefinition::new("L * 2", &["L"], "mm");
        let err = evaluate(&formula, &context(&[("L", f64::NAN)]), None).unwrap_err();
        assert_eq!(err.error_code(), "EVALUATION_ERROR");
    }

    #[test]
    fn test_extract_variables_excludes_constants() {
        let vars = extract_variables("pi * D^2 / 4 * t + e * D").unwrap();
        assert_eq!(vars, vec!["D", "t"]);
    }

    #[test]
    fn test_validate_syntax_is_descriptive() {
        let err = validate_syntax("L * ").unwrap_err();
        assert!(err.to_string().contains("end of expression"));
    }

    #[test]
    fn test_check_declared_variables() {
        let formula = FormulaDefinition::new("L * W", &["L", "t"], "mm²");
        let check = check_declared_variables(&formula).unwrap();
        assert_eq!(check.undeclared, vec!["W"]);
        assert_eq!(check.unused, vec!["t"]);
        assert!(!check.is_consistent());
    }

    #[test]
    fn test_compiled_expression_reuse() {
        let compiled = CompiledExpression::compile("a + b").unwrap();
        assert_eq!(compiled.variables(), ["a", "b"]);
        let mut values = HashMap::new();
        values.insert("a".to_string(), 1.5);
        values.insert("b".to_string(), 2.0);
        assert_eq!(compiled.evaluate(&values).unwrap(), 3.5);
        values.insert("b".to_string(), 4.0);
        assert_eq!(compiled.evaluate(&values).unwrap(), 5.5);
    }
}
