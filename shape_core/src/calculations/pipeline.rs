//! # Shape Calculation Pipeline
//!
//! Turns a shape, a material and parameter values into geometry, scrap and an
//! itemized cost for `quantity` pieces.
//!
//! ## Steps
//!
//! 1. Reject unusable input (quantity, parameter values, density, corrupt entry)
//! 2. Evaluate every plain formula of the shape against the parameter values
//! 3. Fail if `volume` or `weight` is defined but did not evaluate
//! 4. Derive scrap weight from blank and finished area when both exist
//! 5. Price material, scrap credit and fabrication operations
//! 6. Scale by quantity
//!
//! Advisory checks (parameter domains, validation rules, material category,
//! expected ranges) only add warnings.
//!
//! ## Example
//!
//! ```rust
//! use shape_core::calculations::{calculate, ShapeCalculationInput};
//! use shape_core::catalog::{builtin_shape, Material, MaterialCategory, Price};
//!
//! let shape = builtin_shape("rectangular_plate").unwrap().clone();
//! let material = Material::new("E250", "IS 2062 E250", MaterialCategory::CarbonSteel)
//!     .with_density(7850.0)
//!     .with_price(Price::per_kg(250.0, "INR"));
//! let input = ShapeCalculationInput::new(shape, material)
//!     .with_parameter("L", 1000.0)
//!     .with_parameter("W", 1000.0)
//!     .with_parameter("t", 10.0);
//!
//! let result = calculate(&input).unwrap();
//! assert!((result.calculated_values.weight - 78.5).abs() < 1e-9);
//! assert!((result.cost_estimate.material_cost - 19_625.0).abs() < 1e-6);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fabrication::{
    welding_thickness_multiplier, DefaultRateResolver, FabricationRateResolver, FabricationRates, RateRequest,
};
use super::result::{CalculatedValues, CalculationResult, CostEstimate, ParameterEcho};
use crate::catalog::{FabricationCostOverrides, FormulaEntry, Material, ShapeDefinition};
use crate::errors::{CalcError, CalcResult};
use crate::formula::{evaluate_batch, evaluate_composite, BatchOutcome, EvaluationContext, RangeWarning};
use crate::settings::EngineSettings;
use crate::units::{
    CubicMeters, KgPerCubicMeter, Kilograms, Meters, Millimeters, SquareMeters, SquareMillimeters,
};

/// Formulas whose failure fails the whole calculation, when the shape defines them
pub const REQUIRED_FORMULAS: [&str; 2] = ["volume", "weight"];

/// Input contract of the pipeline
///
/// ## JSON Example
///
/// ```json
/// {
///   "shape": { "key": "rectangular_plate", "...": "..." },
///   "material": { "id": "E250", "name": "IS 2062 E250", "category": "carbon_steel" },
///   "parameterValues": { "L": 1000, "W": 1000, "t": 10 },
///   "quantity": 4,
///   "rateOverrides": { "weldingCostPerMeter": 650 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeCalculationInput {
    pub shape: ShapeDefinition,
    pub material: Material,
    #[serde(default)]
    pub parameter_values: BTreeMap<String, f64>,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// User-supplied rates; they win over shape and engine rates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_overrides: Option<FabricationCostOverrides>,
}

fn default_quantity() -> f64 {
    1.0
}

impl ShapeCalculationInput {
    pub fn new(shape: ShapeDefinition, material: Material) -> Self {
        ShapeCalculationInput {
            shape,
            material,
            parameter_values: BTreeMap::new(),
            quantity: default_quantity(),
            rate_overrides: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameter_values.insert(name.into(), value);
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_rate_overrides(mut self, overrides: FabricationCostOverrides) -> Self {
        self.rate_overrides = Some(overrides);
        self
    }

    fn validate(&self) -> CalcResult<()> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(CalcError::invalid_input(
                "quantity",
                self.quantity.to_string(),
                "must be a positive number",
            ));
        }
        for (name, value) in &self.parameter_values {
            if !value.is_finite() {
                return Err(CalcError::invalid_input(
                    format!("parameterValues.{}", name),
                    value.to_string(),
                    "must be a finite number",
                ));
            }
        }
        if let Some(density) = self.material.density {
            if !density.is_finite() || density <= 0.0 {
                return Err(CalcError::invalid_input(
                    "material.density",
                    density.to_string(),
                    "must be a positive number",
                ));
            }
        }
        self.shape.check_structure()
    }
}

/// Calculate with default settings and the default rate resolver.
pub fn calculate(input: &ShapeCalculationInput) -> CalcResult<CalculationResult> {
    let settings = EngineSettings::default();
    calculate_with(input, &settings, &DefaultRateResolver::new(&settings))
}

/// Resolve rates through `resolver`, then calculate.
pub fn calculate_with(
    input: &ShapeCalculationInput,
    settings: &EngineSettings,
    resolver: &dyn FabricationRateResolver,
) -> CalcResult<CalculationResult> {
    let rates = resolver.resolve(&RateRequest {
        shape_rates: input.shape.fabrication_cost.as_ref(),
        shape_category: input.shape.category,
        material_category: input.material.category,
        user_overrides: input.rate_overrides.as_ref(),
    });
    calculate_with_rates(input, &rates, settings)
}

/// The pure computation, with rates already resolved.
pub fn calculate_with_rates(
    input: &ShapeCalculationInput,
    rates: &FabricationRates,
    settings: &EngineSettings,
) -> CalcResult<CalculationResult> {
    input.validate()?;
    let shape = &input.shape;
    let material = &input.material;

    let density = material.density.unwrap_or(settings.default_density);
    let context: EvaluationContext = input
        .parameter_values
        .iter()
        .map(|(name, value)| (name.clone(), *value))
        .collect();

    let mut warnings = advisory_warnings(input, &context);

    let outcome = evaluate_batch(shape.formula_definitions(), &context, Some(density));
    check_required(shape, &outcome)?;

    let range_warnings: Vec<RangeWarning> = outcome
        .results
        .values()
        .filter_map(|r| r.range_warning.clone())
        .collect();
    warnings.extend(range_warnings.iter().map(RangeWarning::describe));

    let mut values = primitives(&outcome);
    collect_composites(shape, &context, density, &mut values);

    // Scrap
    let price = material.price_per_kg();
    let thickness = context.get(&settings.thickness_parameter).copied();
    let scrap_weight = match (values.blank_area, values.finished_area, thickness) {
        (Some(blank), Some(finished), Some(t)) => {
            let scrap_volume = (SquareMillimeters(blank) - SquareMillimeters(finished)) * Millimeters(t);
            let Kilograms(scrap) = CubicMeters::from(scrap_volume) * KgPerCubicMeter(density);
            if scrap < 0.0 {
                tracing::warn!(shape = %shape.key, scrap, "blank area below finished area, scrap clamped to 0");
                warnings.push(format!("Blank area is smaller than finished area; scrap weight {:.3} kg ignored", scrap));
            }
            Some(scrap.max(0.0))
        }
        _ => None,
    };
    values.scrap_weight = scrap_weight;

    let material_cost = values.weight * price;
    let (material_cost_actual, scrap_recovery_value) = match scrap_weight {
        Some(scrap) => {
            let Kilograms(gross) = Kilograms(values.weight) + Kilograms(scrap);
            (gross * price, scrap * price * settings.scrap_recovery_rate)
        }
        None => (material_cost, 0.0),
    };

    // Fabrication
    let multiplier = welding_thickness_multiplier(thickness, &settings.weld_multiplier);
    let meters = |mm: Option<f64>| Meters::from(Millimeters(mm.unwrap_or(0.0))).0;
    let cutting_cost = meters(values.perimeter) * rates.cutting_per_meter;
    let edge_preparation_cost = meters(values.edge_length) * rates.edge_preparation_per_meter;
    let welding_cost = meters(values.weld_length) * rates.welding_per_meter * multiplier;
    let surface_treatment_cost =
        SquareMeters::from(SquareMillimeters(values.surface_area.unwrap_or(0.0))).0 * rates.surface_treatment_per_sqm;

    let base_fabrication_cost =
        rates.base_cost + values.weight * rates.cost_per_kg + rates.labor_hours * rates.labor_rate_per_hour;
    let total_fabrication_cost =
        base_fabrication_cost + cutting_cost + edge_preparation_cost + welding_cost + surface_treatment_cost;

    let unit_total_cost = material_cost_actual - scrap_recovery_value + total_fabrication_cost;
    let Kilograms(total_weight) = Kilograms(values.weight) * input.quantity;
    let total_cost = unit_total_cost * input.quantity;
    let effective_cost_per_kg = if values.weight > 0.0 {
        unit_total_cost / values.weight
    } else {
        0.0
    };

    let currency = material
        .currency()
        .map(str::to_string)
        .unwrap_or_else(|| settings.default_currency.clone());

    tracing::debug!(
        shape = %shape.key,
        material = %material.id,
        weight = values.weight,
        unit_total_cost,
        quantity = input.quantity,
        "calculation complete"
    );

    Ok(CalculationResult {
        shape_key: shape.key.clone(),
        shape_name: shape.name.clone(),
        material_id: material.id.clone(),
        material_name: material.name.clone(),
        density,
        parameters: input
            .parameter_values
            .iter()
            .map(|(name, value)| ParameterEcho {
                name: name.clone(),
                value: *value,
                unit: shape.parameter(name).map(|p| p.unit.clone()).unwrap_or_default(),
            })
            .collect(),
        calculated_values: values,
        cost_estimate: CostEstimate {
            material_cost,
            material_cost_actual,
            scrap_recovery_value,
            cutting_cost,
            edge_preparation_cost,
            welding_cost,
            surface_treatment_cost,
            base_fabrication_cost,
            total_fabrication_cost,
            unit_total_cost,
            total_cost,
            effective_cost_per_kg,
            currency,
            fabrication_rates: *rates,
            welding_thickness_multiplier: multiplier,
        },
        quantity: input.quantity,
        total_weight,
        total_cost,
        warnings,
        range_warnings,
    })
}

fn advisory_warnings(input: &ShapeCalculationInput, context: &EvaluationContext) -> Vec<String> {
    let shape = &input.shape;
    let mut warnings: Vec<String> = shape
        .validate_parameters(context)
        .iter()
        .map(|issue| issue.message())
        .collect();
    warnings.extend(shape.check_validation_rules(context));
    if !shape.allows_material(&input.material) {
        warnings.push(format!(
            "{} is not an allowed material category for {}",
            input.material.category.display_name(),
            shape.name
        ));
    }
    for warning in &warnings {
        tracing::warn!(shape = %shape.key, "{}", warning);
    }
    warnings
}

fn check_required(shape: &ShapeDefinition, outcome: &BatchOutcome) -> CalcResult<()> {
    let failed: Vec<String> = REQUIRED_FORMULAS
        .iter()
        .filter(|name| shape.defines_formula(name) && outcome.failures.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(CalcError::RequiredFormulasFailed {
            shape: shape.key.clone(),
            formulas: failed,
        })
    }
}

fn primitives(outcome: &BatchOutcome) -> CalculatedValues {
    CalculatedValues {
        volume: outcome.value("volume").unwrap_or(0.0),
        weight: outcome.value("weight").unwrap_or(0.0),
        surface_area: outcome.value("surfaceArea"),
        inner_surface_area: outcome.value("innerSurfaceArea"),
        outer_surface_area: outcome.value("outerSurfaceArea"),
        wetted_area: outcome.value("wettedArea"),
        blank_area: outcome.value("blankArea"),
        finished_area: outcome.value("finishedArea"),
        scrap_percentage: outcome.value("scrapPercentage"),
        edge_length: outcome.value("edgeLength"),
        weld_length: outcome.value("weldLength"),
        perimeter: outcome.value("perimeter"),
        ..Default::default()
    }
}

/// Blank dimensions are kept only when every dimension resolved.
fn collect_composites(shape: &ShapeDefinition, context: &EvaluationContext, density: f64, values: &mut CalculatedValues) {
    for (name, entry) in shape.composite_entries() {
        let outcome = evaluate_composite(entry, context, Some(density));
        match entry {
            FormulaEntry::BlankDimensions(_) => {
                if outcome.failures.is_empty() {
                    values
                        .blank_dimensions
                        .extend(outcome.results.into_iter().map(|(dim, r)| (dim, r.result)));
                } else {
                    tracing::debug!(shape = %shape.key, entry = name, "blank dimensions unresolved");
                }
            }
            FormulaEntry::CustomFormulas { .. } => {
                values.custom_values.extend(
                    outcome
                        .results
                        .into_iter()
                        .map(|(sub, r)| (format!("{}.{}", name, sub), r.result)),
                );
            }
            FormulaEntry::Formula(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin_shape, MaterialCategory, Price, ShapeCategory, ShapeParameter};
    use crate::formula::FormulaDefinition;
    use pretty_assertions::assert_eq;

    fn steel(price: f64) -> Material {
        Material::new("E250", "IS 2062 E250", MaterialCategory::CarbonSteel)
            .with_density(7850.0)
            .with_price(Price::per_kg(price, "INR"))
    }

    fn plate_input() -> ShapeCalculationInput {
        ShapeCalculationInput::new(builtin_shape("rectangular_plate").unwrap().clone(), steel(250.0))
            .with_parameter("L", 1000.0)
            .with_parameter("W", 1000.0)
            .with_parameter("t", 10.0)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_plate_weight_and_material_cost() {
        let result = calculate(&plate_input()).unwrap();
        let values = &result.calculated_values;
        assert_eq!(values.volume, 10_000_000.0);
        assert!(close(values.weight, 78.5));
        assert!(close(result.cost_estimate.material_cost, 19_625.0));
        assert_eq!(result.cost_estimate.currency, "INR");
        // No allowance given, so no blank and no scrap
        assert!(values.scrap_weight.is_none());
        assert_eq!(result.cost_estimate.scrap_recovery_value, 0.0);
        assert_eq!(result.cost_estimate.material_cost_actual, result.cost_estimate.material_cost);
    }

    #[test]
    fn test_plate_fabrication_breakdown() {
        let result = calculate(&plate_input()).unwrap();
        let cost = &result.cost_estimate;
        assert!(close(cost.cutting_cost, 200.0));
        assert!(close(cost.edge_preparation_cost, 400.0));
        assert_eq!(cost.welding_cost, 0.0);
        assert!(close(cost.surface_treatment_cost, 102.0));
        assert!(close(cost.base_fabrication_cost, 250.0));
        assert!(close(cost.total_fabrication_cost, 952.0));
        assert!(close(cost.unit_total_cost, 20_577.0));
        assert!(close(cost.effective_cost_per_kg, 20_577.0 / 78.5));
        assert_eq!(cost.welding_thickness_multiplier, 1.0);
    }

    #[test]
    fn test_tube_volume() {
        let shape = builtin_shape("rolled_tube").unwrap().clone();
        let input = ShapeCalculationInput::new(shape, steel(100.0))
            .with_parameter("OD", 500.0)
            .with_parameter("t", 10.0)
            .with_parameter("L", 3000.0);
        let result = calculate(&input).unwrap();
        let expected = std::f64::consts::PI * (250.0_f64.powi(2) - 240.0_f64.powi(2)) * 3000.0;
        assert!(close(result.calculated_values.volume, expected));
        assert!(close(result.calculated_values.weld_length.unwrap(), 3000.0));
        // 3 m of seam at the default rate, t = reference thickness
        assert!(close(result.cost_estimate.welding_cost, 1500.0));
    }

    #[test]
    fn test_weld_cost_scales_with_thickness() {
        let shape = builtin_shape("rolled_tube").unwrap().clone();
        let input = ShapeCalculationInput::new(shape, steel(100.0))
            .with_parameter("OD", 500.0)
            .with_parameter("t", 20.0)
            .with_parameter("L", 3000.0);
        let result = calculate(&input).unwrap();
        assert_eq!(result.cost_estimate.welding_thickness_multiplier, 1.2);
        assert!(close(result.cost_estimate.welding_cost, 1800.0));
    }

    #[test]
    fn test_scrap_law() {
        let input = plate_input().with_parameter("a", 5.0);
        let result = calculate(&input).unwrap();
        let values = &result.calculated_values;

        let blank = values.blank_area.unwrap();
        let finished = values.finished_area.unwrap();
        assert_eq!(blank, 1010.0 * 1010.0);
        assert_eq!(finished, 1_000_000.0);

        let scrap = (blank - finished) * 7850.0 * 10.0 / 1e9;
        assert!(close(values.scrap_weight.unwrap(), scrap));
        let cost = &result.cost_estimate;
        assert!(close(cost.material_cost_actual, (78.5 + scrap) * 250.0));
        assert!(close(cost.scrap_recovery_value, scrap * 250.0 * 0.30));
        assert_eq!(values.blank_dimensions["length"], 1010.0);
        assert_eq!(values.blank_dimensions["width"], 1010.0);
    }

    #[test]
    fn test_blank_smaller_than_finished_clamps_scrap() {
        let shape = ShapeDefinition::new("undersized", "Undersized Blank", ShapeCategory::RectangularPlate)
            .with_parameter(ShapeParameter::numeric("L", "Length", "mm"))
            .with_parameter(ShapeParameter::numeric("t", "Thickness", "mm"))
            .with_formula("volume", FormulaDefinition::new("L * L * t", &["L", "t"], "mm³"))
            .with_formula(
                "weight",
                FormulaDefinition::new("L * L * t * density / 1e9", &["L", "t"], "kg").with_density(),
            )
            .with_formula("finishedArea", FormulaDefinition::new("L * L", &["L"], "mm²"))
            .with_formula("blankArea", FormulaDefinition::new("L * L - 1000", &["L"], "mm²"));
        let input = ShapeCalculationInput::new(shape, steel(250.0))
            .with_parameter("L", 1000.0)
            .with_parameter("t", 10.0);

        let result = calculate(&input).unwrap();
        assert_eq!(result.calculated_values.scrap_weight, Some(0.0));
        assert_eq!(result.cost_estimate.scrap_recovery_value, 0.0);
        assert!(close(result.cost_estimate.material_cost_actual, result.cost_estimate.material_cost));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("Blank area is smaller than finished area")));
    }

    #[test]
    fn test_inapplicable_values_are_omitted() {
        let shape = builtin_shape("seamless_pipe").unwrap().clone();
        let input = ShapeCalculationInput::new(shape, steel(100.0))
            .with_parameter("OD", 114.3)
            .with_parameter("t", 6.0)
            .with_parameter("L", 2000.0);
        let result = calculate(&input).unwrap();
        let values = &result.calculated_values;
        assert_eq!(values.weld_length, None);
        assert_eq!(values.blank_area, None);
        assert_eq!(values.scrap_weight, None);
        assert_eq!(result.cost_estimate.welding_cost, 0.0);

        let json = serde_json::to_value(values).unwrap();
        let keys = json.as_object().unwrap();
        assert!(!keys.contains_key("weldLength"));
        assert!(!keys.contains_key("blankArea"));
        assert!(!keys.contains_key("scrapWeight"));
        assert!(keys["volume"].as_f64().unwrap() > 0.0);
        assert!(keys["weight"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_quantity_scaling() {
        let one = calculate(&plate_input()).unwrap();
        let five = calculate(&plate_input().with_quantity(5.0)).unwrap();
        assert!(close(five.total_weight, 5.0 * one.calculated_values.weight));
        assert!(close(five.total_cost, 5.0 * one.cost_estimate.unit_total_cost));
        assert_eq!(five.cost_estimate.unit_total_cost, one.cost_estimate.unit_total_cost);
    }

    #[test]
    fn test_shape_without_weight_formula() {
        let shape = ShapeDefinition::new("sheet", "Sheet", ShapeCategory::RectangularPlate)
            .with_parameter(ShapeParameter::numeric("L", "Length", "mm"))
            .with_formula("perimeter", FormulaDefinition::new("4 * L", &["L"], "mm"));
        let input = ShapeCalculationInput::new(shape, steel(250.0)).with_parameter("L", 500.0);
        let result = calculate(&input).unwrap();
        assert_eq!(result.calculated_values.weight, 0.0);
        assert_eq!(result.calculated_values.volume, 0.0);
        assert_eq!(result.cost_estimate.effective_cost_per_kg, 0.0);
        assert_eq!(result.total_weight, 0.0);
        assert!(close(result.cost_estimate.cutting_cost, 100.0));
    }

    #[test]
    fn test_required_formula_failure_is_aggregated() {
        let input = ShapeCalculationInput::new(builtin_shape("rectangular_plate").unwrap().clone(), steel(250.0))
            .with_parameter("L", 1000.0);
        let err = calculate(&input).unwrap_err();
        assert_eq!(
            err,
            CalcError::RequiredFormulasFailed {
                shape: "rectangular_plate".to_string(),
                formulas: vec!["volume".to_string(), "weight".to_string()],
            }
        );
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let err = calculate(&plate_input().with_quantity(0.0)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = calculate(&plate_input().with_parameter("L", f64::NAN)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let mut input = plate_input();
        input.shape.formulas.clear();
        assert_eq!(calculate(&input).unwrap_err().error_code(), "CORRUPT_CATALOG_ENTRY");
    }

    #[test]
    fn test_advisory_warnings_do_not_fail() {
        let shape = builtin_shape("hemispherical_head").unwrap().clone();
        let aluminium = Material::new("AL", "5083", MaterialCategory::Aluminium).with_density(2660.0);
        let input = ShapeCalculationInput::new(shape, aluminium)
            .with_parameter("D", 50.0)
            .with_parameter("t", 6.0);
        let result = calculate(&input).unwrap();
        assert!(result.has_warnings());
        assert!(result.warnings.iter().any(|w| w.contains("Aluminium")));
        assert!(result.warnings.iter().any(|w| w.contains("'D' = 50 is below the minimum 100")));
        assert_eq!(result.density, 2660.0);
        assert_eq!(result.cost_estimate.material_cost, 0.0);
        assert_eq!(result.cost_estimate.currency, "INR");
    }

    #[test]
    fn test_user_rates_win() {
        let overrides = FabricationCostOverrides {
            cutting_cost_per_meter: Some(10.0),
            labor_hours: Some(0.0),
            ..Default::default()
        };
        let result = calculate(&plate_input().with_rate_overrides(overrides)).unwrap();
        assert!(close(result.cost_estimate.cutting_cost, 40.0));
        assert_eq!(result.cost_estimate.base_fabrication_cost, 0.0);
        assert_eq!(result.cost_estimate.fabrication_rates.cutting_per_meter, 10.0);
    }

    #[test]
    fn test_custom_formulas_are_reported() {
        let shape = builtin_shape("nozzle").unwrap().clone();
        let input = ShapeCalculationInput::new(shape, steel(120.0))
            .with_parameter("d", 200.0)
            .with_parameter("t", 10.0)
            .with_parameter("h", 150.0);
        let result = calculate(&input).unwrap();
        let custom = &result.calculated_values.custom_values;
        assert!(close(custom["reinforcement.padDiameter"], 400.0));
        assert!(close(custom["reinforcement.openingArea"], std::f64::consts::PI * 180.0 * 180.0 / 4.0));
        // Shape-level base cost and labor hours
        assert!(close(result.cost_estimate.base_fabrication_cost, 750.0 + 1.5 * 500.0));
    }

    #[test]
    fn test_result_is_deterministic() {
        let input = plate_input().with_parameter("a", 5.0).with_quantity(3.0);
        let first = serde_json::to_string(&calculate(&input).unwrap()).unwrap();
        let second = serde_json::to_string(&calculate(&input).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_json() {
        let json = r#"{
            "shape": { "key": "k", "name": "K", "category": "nozzle", "parameters": [], "formulas": {
                "volume": { "kind": "formula", "expression": "2", "variables": [], "unit": "mm³" }
            } },
            "material": { "id": "m", "name": "M", "category": "other" },
            "parameterValues": {}
        }"#;
        let input: ShapeCalculationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.quantity, 1.0);
        let result = calculate(&input).unwrap();
        assert_eq!(result.calculated_values.volume, 2.0);
        assert_eq!(result.density, 7850.0);
    }
}
