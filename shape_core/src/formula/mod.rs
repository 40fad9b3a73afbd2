//! # Formulas
//!
//! User-authored formula strings and everything needed to evaluate them.
//!
//! ## Modules
//!
//! - [`definition`] - Formula records, evaluation context and results
//! - [`expression`] - Tokenizer, recursive-descent parser and decimal AST evaluator
//! - [`evaluator`] - Single-formula evaluation, syntax validation, variable extraction
//! - [`batch`] - Named formula sets with per-formula failure isolation

pub mod batch;
pub mod definition;
pub mod evaluator;
pub mod expression;

pub use batch::{evaluate_all, evaluate_all_detailed, evaluate_batch, evaluate_composite, BatchOutcome};
pub use definition::{
    EvaluationContext, EvaluationResult, ExpectedRange, FormulaDefinition, RangeWarning, DENSITY_VARIABLE,
};
pub use evaluator::{
    check_declared_variables, evaluate, extract_variables, validate_syntax, CompiledExpression, VariableCheck,
};
