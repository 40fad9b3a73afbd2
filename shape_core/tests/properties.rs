use std::collections::BTreeMap;

use proptest::prelude::*;
use shape_core::calculations::{calculate, welding_thickness_multiplier, ShapeCalculationInput};
use shape_core::catalog::{builtin_shape, Material, MaterialCategory, Price};
use shape_core::formula::{evaluate, evaluate_all, EvaluationContext, FormulaDefinition};
use shape_core::settings::WeldMultiplierSettings;
use shape_core::CalcError;

const NAMES: [&str; 5] = ["L", "W", "t", "OD", "h"];

fn steel() -> Material {
    Material::new("E250", "IS 2062 E250", MaterialCategory::CarbonSteel)
        .with_density(7850.0)
        .with_price(Price::per_kg(68.5, "INR"))
}

fn plate(l: f64, w: f64, t: f64, a: Option<f64>, quantity: f64) -> ShapeCalculationInput {
    let mut input = ShapeCalculationInput::new(builtin_shape("rectangular_plate").unwrap().clone(), steel())
        .with_parameter("L", l)
        .with_parameter("W", w)
        .with_parameter("t", t)
        .with_quantity(quantity);
    if let Some(a) = a {
        input = input.with_parameter("a", a);
    }
    input
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn missing_variables_are_all_named(present in proptest::collection::vec(any::<bool>(), NAMES.len())) {
        let formula = FormulaDefinition::new("L + W + t + OD + h", &NAMES, "mm");
        let context: EvaluationContext = NAMES
            .iter()
            .zip(&present)
            .filter(|(_, keep)| **keep)
            .map(|(name, _)| (name.to_string(), 1.0))
            .collect();
        let expected: Vec<String> = NAMES
            .iter()
            .zip(&present)
            .filter(|(_, keep)| !**keep)
            .map(|(name, _)| name.to_string())
            .collect();

        match evaluate(&formula, &context, None) {
            Ok(result) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(result.result, 5.0);
            }
            Err(CalcError::MissingVariables { missing, .. }) => prop_assert_eq!(missing, expected),
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn batch_failures_do_not_leak(value in 1.0f64..1e6, broken in 0usize..4) {
        let mut formulas = BTreeMap::new();
        for i in 0..4 {
            let expression = if i == broken { "x / (x - x)".to_string() } else { format!("x * {}", i + 1) };
            formulas.insert(format!("f{}", i), FormulaDefinition::new(expression, &["x"], "mm"));
        }
        let context: EvaluationContext = [("x".to_string(), value)].into_iter().collect();
        let results = evaluate_all(&formulas, &context, None);

        prop_assert_eq!(results.len(), 3);
        let broken_key = format!("f{}", broken);
        prop_assert!(!results.contains_key(&broken_key));
        for (name, result) in &results {
            let factor: f64 = name[1..].parse::<f64>().unwrap() + 1.0;
            prop_assert!(close(result.result, value * factor));
        }
    }

    #[test]
    fn quantity_scales_totals(l in 10.0f64..5000.0, w in 10.0f64..3000.0, t in 1.0f64..50.0, q in 1u32..500) {
        let one = calculate(&plate(l, w, t, None, 1.0)).unwrap();
        let many = calculate(&plate(l, w, t, None, q as f64)).unwrap();
        prop_assert!(close(many.total_weight, q as f64 * one.calculated_values.weight));
        prop_assert!(close(many.total_cost, q as f64 * one.cost_estimate.unit_total_cost));
    }

    #[test]
    fn calculation_is_idempotent(l in 10.0f64..5000.0, w in 10.0f64..3000.0, t in 1.0f64..50.0, a in 0.0f64..20.0) {
        let input = plate(l, w, t, Some(a), 2.0);
        let first = calculate(&input).unwrap();
        let second = calculate(&input).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn scrap_follows_blank_minus_finished(l in 10.0f64..5000.0, w in 10.0f64..3000.0, t in 1.0f64..50.0, a in 0.0f64..20.0) {
        let result = calculate(&plate(l, w, t, Some(a), 1.0)).unwrap();
        let values = &result.calculated_values;
        let scrap_area = values.blank_area.unwrap() - values.finished_area.unwrap();
        let expected_scrap = scrap_area * 7850.0 * t / 1e9;
        let scrap = values.scrap_weight.unwrap();
        prop_assert!(close(scrap, expected_scrap));

        let cost = &result.cost_estimate;
        prop_assert!(close(cost.material_cost_actual, (values.weight + scrap) * 68.5));
        prop_assert!(close(cost.scrap_recovery_value, scrap * 68.5 * 0.30));
    }

    #[test]
    fn weld_multiplier_never_drops_below_floor(t in -500.0f64..500.0) {
        let settings = WeldMultiplierSettings::default();
        let m = welding_thickness_multiplier(Some(t), &settings);
        prop_assert!(m >= settings.floor);
        if t >= 10.0 {
            prop_assert!(m >= 1.0);
        }
    }
}

#[test]
fn zero_weight_has_zero_effective_cost() {
    let shape = builtin_shape("rectangular_plate").unwrap().clone();
    let input = ShapeCalculationInput::new(shape, steel())
        .with_parameter("L", 1000.0)
        .with_parameter("W", 1000.0)
        .with_parameter("t", 0.0);
    let result = calculate(&input).unwrap();
    assert_eq!(result.calculated_values.weight, 0.0);
    assert_eq!(result.cost_estimate.effective_cost_per_kg, 0.0);
}
