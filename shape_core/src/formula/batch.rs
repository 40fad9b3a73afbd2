//! # Batch Evaluator
//!
//! Evaluates a named set of formulas against one shared context. Each formula
//! stands alone: a failure is logged and its name is left out of the output,
//! while the remaining formulas still evaluate.
//!
//! Formulas cannot see each other's results. Derived quantities that combine
//! several primitives are composed by the calculation pipeline instead.

use std::collections::BTreeMap;

use super::definition::{EvaluationContext, EvaluationResult, FormulaDefinition};
use super::evaluator::evaluate;
use crate::catalog::FormulaEntry;
use crate::errors::CalcError;

/// Successes and failures of one batch, keyed by formula name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub results: BTreeMap<String, EvaluationResult>,
    pub failures: BTreeMap<String, CalcError>,
}

impl BatchOutcome {
    /// Result value of a named formula, if it evaluated
    pub fn value(&self, name: &str) -> Option<f64> {
        self.results.get(name).map(|r| r.result)
    }
}

/// Evaluate every formula, keeping the failures alongside the results.
pub fn evaluate_batch<'a, I>(formulas: I, context: &EvaluationContext, density: Option<f64>) -> BatchOutcome
where
    I: IntoIterator<Item = (&'a str, &'a FormulaDefinition)>,
{
    let mut outcome = BatchOutcome::default();
    for (name, formula) in formulas {
        match evaluate(formula, context, density) {
            Ok(result) => {
                tracing::debug!(formula = name, value = result.result, unit = %result.unit, "formula evaluated");
                outcome.results.insert(name.to_string(), result);
            }
            Err(err) => {
                tracing::warn!(formula = name, code = err.error_code(), "formula skipped: {}", err);
                outcome.failures.insert(name.to_string(), err);
            }
        }
    }
    outcome
}

/// Evaluate a named set of formulas; failed formulas are absent from the map.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use shape_core::formula::{evaluate_all, EvaluationContext, FormulaDefinition};
///
/// let mut formulas = BTreeMap::new();
/// formulas.insert("area".to_string(), FormulaDefinition::new("L * W", &["L", "W"], "mm²"));
/// formulas.insert("volume".to_string(), FormulaDefinition::new("L * W * t", &["L", "W", "t"], "mm³"));
///
/// let context: EvaluationContext = [("L".to_string(), 2.0), ("W".to_string(), 3.0)].into_iter().collect();
/// let results = evaluate_all(&formulas, &context, None);
///
/// assert_eq!(results["area"].result, 6.0);
/// assert!(!results.contains_key("volume"));
/// ```
pub fn evaluate_all(
    formulas: &BTreeMap<String, FormulaDefinition>,
    context: &EvaluationContext,
    density: Option<f64>,
) -> BTreeMap<String, EvaluationResult> {
    evaluate_batch(formulas.iter().map(|(name, f)| (name.as_str(), f)), context, density).results
}

/// Like [`evaluate_all`], keeping the per-name failures for authoring tools.
pub fn evaluate_all_detailed(
    formulas: &BTreeMap<String, FormulaDefinition>,
    context: &EvaluationContext,
    density: Option<f64>,
) -> BatchOutcome {
    evaluate_batch(formulas.iter().map(|(name, f)| (name.as_str(), f)), context, density)
}

/// Evaluate the sub-formulas of a composite entry, each in isolation.
///
/// Results are keyed by sub-formula name (`length`, `width`, ...). A plain
/// formula entry evaluates under the empty name.
pub fn evaluate_composite(entry: &FormulaEntry, context: &EvaluationContext, density: Option<f64>) -> BatchOutcome {
    evaluate_batch(entry.sub_formulas(), context, density)
}
