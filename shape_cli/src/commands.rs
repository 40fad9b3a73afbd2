//! Command handlers. Each prints JSON on stdout.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shape_core::calculations::{calculate_with, DefaultRateResolver, ShapeCalculationInput};
use shape_core::catalog::{
    CategoryGroup, ConsistencyIssue, FabricationCostOverrides, Material, ShapeCategory, ShapeDefinition, ShapeRegistry,
};
use shape_core::formula::{evaluate, extract_variables, EvaluationContext, FormulaDefinition};
use shape_core::settings::EngineSettings;

use crate::cli::{CalcArgs, EvalArgs, ListArgs, ShowArgs};

/// A shape given by catalog key or inline
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ShapeRef {
    Key(String),
    Inline(Box<ShapeDefinition>),
}

/// Calculation request file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalcRequest {
    shape: ShapeRef,
    material: Material,
    #[serde(default)]
    parameter_values: BTreeMap<String, f64>,
    quantity: Option<f64>,
    rate_overrides: Option<FabricationCostOverrides>,
    /// Fill parameters the request leaves out with the shape's defaults
    #[serde(default)]
    apply_defaults: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShapeSummary {
    code: Option<String>,
    key: String,
    name: String,
    category: ShapeCategory,
    id: Option<Uuid>,
    parameters: Vec<String>,
}

#[derive(Serialize)]
struct CheckReport {
    shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    structure: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<ConsistencyIssue>,
}

fn output_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

pub fn list(args: &ListArgs) -> Result<()> {
    let shapes = ShapeRegistry::builtin().shapes_by_group_name(&args.group)?;
    let summaries: Vec<ShapeSummary> = shapes
        .into_iter()
        .map(|s| ShapeSummary {
            parameters: s.parameters.iter().map(|p| p.name.clone()).collect(),
            code: s.code,
            key: s.key,
            name: s.name,
            category: s.category,
            id: s.id,
        })
        .collect();
    output_json(&summaries)
}

pub fn show(args: &ShowArgs) -> Result<()> {
    let shape = ShapeRegistry::builtin().find(&args.key)?;
    output_json(&shape)
}

pub fn calc(args: &CalcArgs) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => EngineSettings::from_json_str(&read_source(path)?)
            .with_context(|| format!("invalid settings in {}", path.display()))?,
        None => EngineSettings::default(),
    };

    let request: CalcRequest =
        serde_json::from_str(&read_source(&args.request)?).context("request is not a valid calculation request")?;

    let shape = match request.shape {
        ShapeRef::Key(key) => ShapeRegistry::builtin().find(&key)?,
        ShapeRef::Inline(shape) => *shape,
    };
    let mut parameter_values = request.parameter_values;
    if request.apply_defaults {
        for (name, value) in shape.default_parameter_values() {
            parameter_values.entry(name).or_insert(value);
        }
    }

    let input = ShapeCalculationInput {
        shape,
        material: request.material,
        parameter_values,
        quantity: request.quantity.unwrap_or(1.0),
        rate_overrides: request.rate_overrides,
    };
    tracing::info!(shape = %input.shape.key, material = %input.material.id, "calculating");

    let result = calculate_with(&input, &settings, &DefaultRateResolver::new(&settings))?;
    output_json(&result)
}

pub fn eval(args: &EvalArgs) -> Result<()> {
    let mut context = EvaluationContext::new();
    for binding in &args.bindings {
        let Some((name, value)) = binding.split_once('=') else {
            bail!("binding '{}' is not NAME=VALUE", binding);
        };
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("binding '{}' has a non-numeric value", binding))?;
        context.insert(name.trim().to_string(), value);
    }

    let variables = extract_variables(&args.expression)?;
    let names: Vec<&str> = variables.iter().map(String::as_str).collect();
    let formula = FormulaDefinition::new(args.expression.clone(), &names, "");
    let result = evaluate(&formula, &context, None)?;
    output_json(&result)
}

/// Fails when any catalog shape has a problem, after printing the report.
pub fn check() -> Result<()> {
    let registry = ShapeRegistry::builtin();
    let reports: Vec<CheckReport> = registry
        .shapes_in(CategoryGroup::All)
        .iter()
        .map(|shape| CheckReport {
            shape: shape.key.clone(),
            structure: shape.check_structure().err().map(|e| e.to_string()),
            issues: shape.check_formula_consistency(),
        })
        .collect();

    let failing = reports
        .iter()
        .filter(|r| r.structure.is_some() || !r.issues.is_empty())
        .count();
    output_json(&reports)?;
    if failing > 0 {
        bail!("{} of {} shapes have problems", failing, reports.len());
    }
    tracing::info!(shapes = reports.len(), "catalog is consistent");
    Ok(())
}
