//! # Shape Definitions
//!
//! Catalog records describing one parametric engineering shape: its input
//! parameters, its formulas, which materials it accepts and any fabrication
//! rate overrides.
//!
//! The `formulas` map is heterogeneous. Most entries are plain
//! [`FormulaDefinition`]s that the pipeline batch-evaluates; composite
//! descriptors (blank dimensions, groups of custom sub-formulas) share the map
//! but are told apart by their [`FormulaEntry`] variant.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "key": "rectangular_plate",
//!   "name": "Rectangular Plate",
//!   "category": "rectangular_plate",
//!   "parameters": [
//!     { "name": "t", "label": "Thickness", "unit": "mm",
//!       "domain": { "kind": "numeric", "min": 1, "max": 300, "default": 10 } }
//!   ],
//!   "formulas": {
//!     "volume": { "kind": "formula", "expression": "L * W * t", "variables": ["L", "W", "t"], "unit": "mm³" }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::material::{Material, MaterialCategory};
use crate::errors::{CalcError, CalcResult};
use crate::formula::{check_declared_variables, CompiledExpression, FormulaDefinition, DENSITY_VARIABLE};

/// Shape archetypes known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeCategory {
    RectangularPlate,
    CircularPlate,
    AnnularPlate,
    RolledTube,
    SeamlessPipe,
    Nozzle,
    HemisphericalHead,
    EllipsoidalHead,
    ConicalSection,
}

impl ShapeCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShapeCategory::RectangularPlate => "Rectangular Plate",
            ShapeCategory::CircularPlate => "Circular Plate",
            ShapeCategory::AnnularPlate => "Annular Plate",
            ShapeCategory::RolledTube => "Rolled Tube",
            ShapeCategory::SeamlessPipe => "Seamless Pipe",
            ShapeCategory::Nozzle => "Nozzle",
            ShapeCategory::HemisphericalHead => "Hemispherical Head",
            ShapeCategory::EllipsoidalHead => "Ellipsoidal Head",
            ShapeCategory::ConicalSection => "Conical Section",
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// One choice of an enumerated parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterOption {
    pub label: String,
    pub value: f64,
}

/// Allowed values of a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterDomain {
    Numeric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    Enumerated {
        options: Vec<ParameterOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
}

impl ParameterDomain {
    pub fn default_value(&self) -> Option<f64> {
        match self {
            ParameterDomain::Numeric { default, .. } | ParameterDomain::Enumerated { default, .. } => *default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeParameter {
    /// Variable name used in formulas (e.g. "t", "OD")
    pub name: String,
    pub label: String,
    pub unit: String,
    pub domain: ParameterDomain,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Formulas that read this parameter. Documentation only.
    #[serde(default)]
    pub used_in_formulas: Vec<String>,
}

fn default_required() -> bool {
    true
}

impl ShapeParameter {
    /// Unbounded numeric parameter, required
    pub fn numeric(name: impl Into<String>, label: impl Into<String>, unit: impl Into<String>) -> Self {
        ShapeParameter {
            name: name.into(),
            label: label.into(),
            unit: unit.into(),
            domain: ParameterDomain::Numeric {
                min: None,
                max: None,
                default: None,
            },
            required: true,
            used_in_formulas: Vec::new(),
        }
    }

    /// Parameter restricted to a list of labelled values, required
    pub fn enumerated(
        name: impl Into<String>,
        label: impl Into<String>,
        unit: impl Into<String>,
        options: &[(&str, f64)],
    ) -> Self {
        ShapeParameter {
            name: name.into(),
            label: label.into(),
            unit: unit.into(),
            domain: ParameterDomain::Enumerated {
                options: options
                    .iter()
                    .map(|(label, value)| ParameterOption {
                        label: label.to_string(),
                        value: *value,
                    })
                    .collect(),
                default: None,
            },
            required: true,
            used_in_formulas: Vec::new(),
        }
    }

    /// Set numeric bounds. No effect on enumerated parameters.
    pub fn with_range(mut self, lower: f64, upper: f64) -> Self {
        if let ParameterDomain::Numeric { min, max, .. } = &mut self.domain {
            *min = Some(lower);
            *max = Some(upper);
        }
        self
    }

    pub fn with_default(mut self, value: f64) -> Self {
        match &mut self.domain {
            ParameterDomain::Numeric { default, .. } | ParameterDomain::Enumerated { default, .. } => {
                *default = Some(value)
            }
        }
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn used_in(mut self, formulas: &[&str]) -> Self {
        self.used_in_formulas = formulas.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Check one supplied value against the domain
    fn check_value(&self, value: f64) -> Option<ParameterIssue> {
        match &self.domain {
            ParameterDomain::Numeric { min, max, .. } => {
                if let Some(min) = min.filter(|m| value < *m) {
                    return Some(ParameterIssue::BelowMinimum {
                        name: self.name.clone(),
                        value,
                        min,
                    });
                }
                if let Some(max) = max.filter(|m| value > *m) {
                    return Some(ParameterIssue::AboveMaximum {
                        name: self.name.clone(),
                        value,
                        max,
                    });
                }
                None
            }
            ParameterDomain::Enumerated { options, .. } => {
                if options.iter().any(|o| (o.value - value).abs() < 1e-9) {
                    None
                } else {
                    Some(ParameterIssue::NotAnOption {
                        name: self.name.clone(),
                        value,
                    })
                }
            }
        }
    }
}

/// Advisory finding about a supplied parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ParameterIssue {
    MissingRequired { name: String },
    BelowMinimum { name: String, value: f64, min: f64 },
    AboveMaximum { name: String, value: f64, max: f64 },
    NotAnOption { name: String, value: f64 },
}

impl ParameterIssue {
    pub fn message(&self) -> String {
        match self {
            ParameterIssue::MissingRequired { name } => format!("Required parameter '{}' not supplied", name),
            ParameterIssue::BelowMinimum { name, value, min } => {
                format!("Parameter '{}' = {} is below the minimum {}", name, value, min)
            }
            ParameterIssue::AboveMaximum { name, value, max } => {
                format!("Parameter '{}' = {} is above the maximum {}", name, value, max)
            }
            ParameterIssue::NotAnOption { name, value } => {
                format!("Parameter '{}' = {} is not one of the allowed options", name, value)
            }
        }
    }
}

// ============================================================================
// Formula entries
// ============================================================================

/// How the raw blank is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankShape {
    Rectangular,
    Circular,
}

/// Sub-formulas giving the raw blank's dimensions (length/width or diameter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankDimensionSpec {
    pub blank_shape: BlankShape,
    pub dimensions: BTreeMap<String, FormulaDefinition>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFormula {
    pub name: String,
    pub formula: FormulaDefinition,
}

/// Value of a shape's `formulas` map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormulaEntry {
    /// Directly evaluable formula
    Formula(FormulaDefinition),
    /// Composite: raw blank dimensions
    BlankDimensions(BlankDimensionSpec),
    /// Composite: named auxiliary formulas for reporting
    CustomFormulas { formulas: Vec<NamedFormula> },
}

impl FormulaEntry {
    pub fn as_formula(&self) -> Option<&FormulaDefinition> {
        match self {
            FormulaEntry::Formula(formula) => Some(formula),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, FormulaEntry::Formula(_))
    }

    /// Every formula reachable from this entry, with a display name
    pub fn sub_formulas(&self) -> Vec<(&str, &FormulaDefinition)> {
        match self {
            FormulaEntry::Formula(formula) => vec![("", formula)],
            FormulaEntry::BlankDimensions(spec) => {
                spec.dimensions.iter().map(|(name, f)| (name.as_str(), f)).collect()
            }
            FormulaEntry::CustomFormulas { formulas } => {
                formulas.iter().map(|nf| (nf.name.as_str(), &nf.formula)).collect()
            }
        }
    }
}

// ============================================================================
// Fabrication overrides and validation rules
// ============================================================================

/// Optional per-operation fabrication rates. Any field left `None` falls back
/// to the next source in the rate resolution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricationCostOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutting_cost_per_meter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_preparation_cost_per_meter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welding_cost_per_meter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_treatment_cost_per_sqm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_rate_per_hour: Option<f64>,
}

/// Advisory geometric rule: `expression` must evaluate to a positive number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub name: String,
    pub expression: String,
    pub message: String,
}

/// Authoring-time inconsistency in a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    Syntax { formula: String, message: String },
    UndeclaredVariable { formula: String, variable: String },
    UnusedVariable { formula: String, variable: String },
    UnknownParameter { formula: String, variable: String },
    UnknownFormulaReference { parameter: String, formula: String },
    UnlistedUsage { parameter: String, formula: String },
}

impl ConsistencyIssue {
    pub fn message(&self) -> String {
        match self {
            ConsistencyIssue::Syntax { formula, message } => format!("{}: {}", formula, message),
            ConsistencyIssue::UndeclaredVariable { formula, variable } => {
                format!("{}: uses '{}' without declaring it", formula, variable)
            }
            ConsistencyIssue::UnusedVariable { formula, variable } => {
                format!("{}: declares '{}' but never uses it", formula, variable)
            }
            ConsistencyIssue::UnknownParameter { formula, variable } => {
                format!("{}: '{}' is not a shape parameter", formula, variable)
            }
            ConsistencyIssue::UnknownFormulaReference { parameter, formula } => {
                format!("parameter '{}' lists unknown formula '{}'", parameter, formula)
            }
            ConsistencyIssue::UnlistedUsage { parameter, formula } => {
                format!("parameter '{}' is used by '{}' but does not list it", parameter, formula)
            }
        }
    }
}

// ============================================================================
// Shape definition
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeDefinition {
    /// Stable catalog key (e.g. "rectangular_plate")
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ShapeCategory,

    /// Stamped by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Stamped by the registry (e.g. "PLT-001")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub parameters: Vec<ShapeParameter>,
    pub formulas: BTreeMap<String, FormulaEntry>,

    /// Empty means any material is accepted
    #[serde(default)]
    pub allowed_material_categories: Vec<MaterialCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabrication_cost: Option<FabricationCostOverrides>,
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,
}

impl ShapeDefinition {
    pub fn new(key: impl Into<String>, name: impl Into<String>, category: ShapeCategory) -> Self {
        ShapeDefinition {
            key: key.into(),
            name: name.into(),
            description: String::new(),
            category,
            id: None,
            code: None,
            parameters: Vec::new(),
            formulas: BTreeMap::new(),
            allowed_material_categories: Vec::new(),
            fabrication_cost: None,
            validation_rules: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ShapeParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_formula(mut self, name: impl Into<String>, formula: FormulaDefinition) -> Self {
        self.formulas.insert(name.into(), FormulaEntry::Formula(formula));
        self
    }

    pub fn with_blank_dimensions(mut self, name: impl Into<String>, spec: BlankDimensionSpec) -> Self {
        self.formulas.insert(name.into(), FormulaEntry::BlankDimensions(spec));
        self
    }

    pub fn with_custom_formulas(mut self, name: impl Into<String>, formulas: Vec<NamedFormula>) -> Self {
        self.formulas.insert(name.into(), FormulaEntry::CustomFormulas { formulas });
        self
    }

    pub fn with_materials(mut self, categories: &[MaterialCategory]) -> Self {
        self.allowed_material_categories = categories.to_vec();
        self
    }

    pub fn with_fabrication_cost(mut self, overrides: FabricationCostOverrides) -> Self {
        self.fabrication_cost = Some(overrides);
        self
    }

    pub fn with_rule(mut self, name: &str, expression: &str, message: &str) -> Self {
        self.validation_rules.push(ValidationRule {
            name: name.to_string(),
            expression: expression.to_string(),
            message: message.to_string(),
        });
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ShapeParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Plain formula entries only; composite descriptors are skipped.
    pub fn formula_definitions(&self) -> impl Iterator<Item = (&str, &FormulaDefinition)> {
        self.formulas
            .iter()
            .filter_map(|(name, entry)| entry.as_formula().map(|f| (name.as_str(), f)))
    }

    /// Composite descriptors only
    pub fn composite_entries(&self) -> impl Iterator<Item = (&str, &FormulaEntry)> {
        self.formulas
            .iter()
            .filter(|(_, entry)| entry.is_composite())
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// True when the shape has a plain formula under `name`
    pub fn defines_formula(&self, name: &str) -> bool {
        self.formulas.get(name).and_then(FormulaEntry::as_formula).is_some()
    }

    pub fn default_parameter_values(&self) -> HashMap<String, f64> {
        self.parameters
            .iter()
            .filter_map(|p| p.domain.default_value().map(|v| (p.name.clone(), v)))
            .collect()
    }

    /// Empty allow-list accepts every material
    pub fn allows_material(&self, material: &Material) -> bool {
        self.allowed_material_categories.is_empty() || self.allowed_material_categories.contains(&material.category)
    }

    /// Advisory domain check of supplied values against the declared parameters.
    pub fn validate_parameters(&self, values: &HashMap<String, f64>) -> Vec<ParameterIssue> {
        self.parameters
            .iter()
            .filter_map(|param| match values.get(&param.name) {
                Some(value) => param.check_value(*value),
                None if param.required => Some(ParameterIssue::MissingRequired {
                    name: param.name.clone(),
                }),
                None => None,
            })
            .collect()
    }

    /// Messages of validation rules the values violate. Rules that cannot be
    /// evaluated with the given values are skipped.
    pub fn check_validation_rules(&self, values: &HashMap<String, f64>) -> Vec<String> {
        let mut violations = Vec::new();
        for rule in &self.validation_rules {
            let outcome = CompiledExpression::compile(&rule.expression).and_then(|c| c.evaluate(values));
            match outcome {
                Ok(value) if value <= 0.0 => violations.push(rule.message.clone()),
                Ok(_) => {}
                Err(err) => tracing::debug!(rule = %rule.name, "validation rule not evaluated: {}", err),
            }
        }
        violations
    }

    /// Reject entries the pipeline cannot work with.
    pub fn check_structure(&self) -> CalcResult<()> {
        let mut problems = Vec::new();
        if self.key.trim().is_empty() {
            problems.push("empty key".to_string());
        }
        if self.formulas.is_empty() {
            problems.push("no formulas".to_string());
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.name.trim().is_empty() {
                problems.push("parameter with empty name".to_string());
            } else if !seen.insert(param.name.as_str()) {
                problems.push(format!("duplicate parameter '{}'", param.name));
            }
            match &param.domain {
                ParameterDomain::Numeric { min, max, default } => {
                    if let (Some(lo), Some(hi)) = (min, max) {
                        if lo > hi {
                            problems.push(format!("parameter '{}' has min {} > max {}", param.name, lo, hi));
                        }
                    }
                    if let Some(d) = default {
                        if min.is_some_and(|lo| *d < lo) || max.is_some_and(|hi| *d > hi) {
                            problems.push(format!("parameter '{}' default {} outside its bounds", param.name, d));
                        }
                    }
                }
                ParameterDomain::Enumerated { options, .. } => {
                    if options.is_empty() {
                        problems.push(format!("parameter '{}' has no options", param.name));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CalcError::corrupt_entry(&self.key, problems.join("; ")))
        }
    }

    /// Cross-check formulas, declared variables and `usedInFormulas`.
    pub fn check_formula_consistency(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        let param_names: HashSet<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        let mut usage: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for (entry_name, entry) in &self.formulas {
            for (sub_name, formula) in entry.sub_formulas() {
                let label = if sub_name.is_empty() {
                    entry_name.clone()
                } else {
                    format!("{}.{}", entry_name, sub_name)
                };
                let check = match check_declared_variables(formula) {
                    Ok(check) => check,
                    Err(err) => {
                        issues.push(ConsistencyIssue::Syntax {
                            formula: label,
                            message: err.to_string(),
                        });
                        continue;
                    }
                };
                for variable in check.undeclared {
                    issues.push(ConsistencyIssue::UndeclaredVariable {
                        formula: label.clone(),
                        variable,
                    });
                }
                for variable in check.unused {
                    issues.push(ConsistencyIssue::UnusedVariable {
                        formula: label.clone(),
                        variable,
                    });
                }
                for variable in &formula.variables {
                    if variable == DENSITY_VARIABLE {
                        continue;
                    }
                    if param_names.contains(variable.as_str()) {
                        usage.entry(variable.as_str()).or_default().push(entry_name.clone());
                    } else {
                        issues.push(ConsistencyIssue::UnknownParameter {
                            formula: label.clone(),
                            variable: variable.clone(),
                        });
                    }
                }
            }
        }

        for param in &self.parameters {
            for listed in &param.used_in_formulas {
                if !self.formulas.contains_key(listed) {
                    issues.push(ConsistencyIssue::UnknownFormulaReference {
                        parameter: param.name.clone(),
                        formula: listed.clone(),
                    });
                }
            }
            if param.used_in_formulas.is_empty() {
                continue;
            }
            let mut used_by = usage.get(param.name.as_str()).cloned().unwrap_or_default();
            used_by.dedup();
            for formula in used_by {
                if !param.used_in_formulas.contains(&formula) {
                    issues.push(ConsistencyIssue::UnlistedUsage {
                        parameter: param.name.clone(),
                        formula,
                    });
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plate() -> ShapeDefinition {
        ShapeDefinition::new("plate", "Plate", ShapeCategory::RectangularPlate)
            .with_parameter(ShapeParameter::numeric("L", "Length", "mm").with_range(1.0, 12000.0).used_in(&["volume"]))
            .with_parameter(ShapeParameter::numeric("W", "Width", "mm").with_range(1.0, 3000.0))
            .with_parameter(
                ShapeParameter::enumerated("t", "Thickness", "mm", &[("8 mm", 8.0), ("10 mm", 10.0)]).with_default(10.0),
            )
            .with_parameter(ShapeParameter::numeric("a", "Allowance", "mm").with_default(5.0).optional())
            .with_formula("volume", FormulaDefinition::new("L * W * t", &["L", "W", "t"], "mm³"))
            .with_blank_dimensions(
                "blank",
                BlankDimensionSpec {
                    blank_shape: BlankShape::Rectangular,
                    dimensions: [("length".to_string(), FormulaDefinition::new("L + 2*a", &["L", "a"], "mm"))]
                        .into_iter()
                        .collect(),
                    description: String::new(),
                },
            )
            .with_rule("thin", "W - t", "Width must exceed thickness")
    }

    fn values(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_formula_definitions_skip_composites() {
        let shape = plate();
        let names: Vec<&str> = shape.formula_definitions().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["volume"]);
        assert_eq!(shape.composite_entries().count(), 1);
        assert!(shape.defines_formula("volume"));
        assert!(!shape.defines_formula("blank"));
    }

    #[test]
    fn test_formula_entry_json_is_tagged() {
        let entry = FormulaEntry::Formula(FormulaDefinition::new("L * W", &["L", "W"], "mm²"));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "formula");
        assert_eq!(json["expression"], "L * W");

        let composite: FormulaEntry = serde_json::from_str(
            r#"{ "kind": "custom_formulas", "formulas": [
                { "name": "opening", "formula": { "expression": "pi * d^2 / 4", "variables": ["d"], "unit": "mm²" } }
            ] }"#,
        )
        .unwrap();
        assert!(composite.is_composite());
        assert_eq!(composite.sub_formulas()[0].0, "opening");
    }

    #[test]
    fn test_validate_parameters() {
        let shape = plate();
        let issues = shape.validate_parameters(&values(&[("L", 0.5), ("t", 9.0)]));
        assert_eq!(
            issues,
            vec![
                ParameterIssue::BelowMinimum {
                    name: "L".to_string(),
                    value: 0.5,
                    min: 1.0
                },
                ParameterIssue::MissingRequired { name: "W".to_string() },
                ParameterIssue::NotAnOption {
                    name: "t".to_string(),
                    value: 9.0
                },
            ]
        );
        assert!(shape.validate_parameters(&values(&[("L", 10.0), ("W", 10.0), ("t", 8.0)])).is_empty());
    }

    #[test]
    fn test_default_parameter_values() {
        let defaults = plate().default_parameter_values();
        assert_eq!(defaults.get("t"), Some(&10.0));
        assert_eq!(defaults.get("a"), Some(&5.0));
        assert!(!defaults.contains_key("L"));
    }

    #[test]
    fn test_validation_rules() {
        let shape = plate();
        assert_eq!(
            shape.check_validation_rules(&values(&[("W", 5.0), ("t", 10.0)])),
            vec!["Width must exceed thickness"]
        );
        assert!(shape.check_validation_rules(&values(&[("W", 50.0), ("t", 10.0)])).is_empty());
        // Not evaluable without W: skipped
        assert!(shape.check_validation_rules(&values(&[("t", 10.0)])).is_empty());
    }

    #[test]
    fn test_material_restriction() {
        let shape = plate().with_materials(&[MaterialCategory::CarbonSteel]);
        assert!(shape.allows_material(&Material::new("cs", "CS", MaterialCategory::CarbonSteel)));
        assert!(!shape.allows_material(&Material::new("al", "Al", MaterialCategory::Aluminium)));
        assert!(plate().allows_material(&Material::new("al", "Al", MaterialCategory::Aluminium)));
    }

    #[test]
    fn test_check_structure() {
        assert!(plate().check_structure().is_ok());

        let broken = ShapeDefinition::new("broken", "Broken", ShapeCategory::RectangularPlate)
            .with_parameter(ShapeParameter::numeric("t", "Thickness", "mm").with_range(10.0, 1.0))
            .with_parameter(ShapeParameter::numeric("t", "Thickness", "mm"));
        match broken.check_structure().unwrap_err() {
            CalcError::CorruptCatalogEntry { shape, reason } => {
                assert_eq!(shape, "broken");
                assert!(reason.contains("no formulas"));
                assert!(reason.contains("duplicate parameter 't'"));
                assert!(reason.contains("min 10 > max 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_formula_consistency() {
        let shape = plate()
            .with_formula("area", FormulaDefinition::new("L * X", &["L"], "mm²"))
            .with_formula("edge", FormulaDefinition::new("2 * (L + W)", &["L", "W", "t"], "mm"));
        let issues = shape.check_formula_consistency();
        assert!(issues.contains(&ConsistencyIssue::UndeclaredVariable {
            formula: "area".to_string(),
            variable: "X".to_string()
        }));
        assert!(issues.contains(&ConsistencyIssue::UnusedVariable {
            formula: "edge".to_string(),
            variable: "t".to_string()
        }));
        // L lists only "volume" but "area" and "edge" also read it
        assert!(issues.contains(&ConsistencyIssue::UnlistedUsage {
            parameter: "L".to_string(),
            formula: "area".to_string()
        }));
        assert!(plate().check_formula_consistency().iter().all(|i| !matches!(
            i,
            ConsistencyIssue::Syntax { .. } | ConsistencyIssue::UndeclaredVariable { .. }
        )));
    }
}
