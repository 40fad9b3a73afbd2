//! # Built-in Shape Catalog
//!
//! The static catalog of shape archetypes, built once on first access.
//!
//! ## Conventions
//!
//! - Lengths in mm, areas in mm², volumes in mm³
//! - Weights in kg: `volume × density / 1e9` with density in kg/m³
//! - `t` is always the wall/plate thickness; the pipeline reads it for scrap
//!   weight and weld-pass scaling
//! - `a` is the cutting allowance added around a blank
//!
//! Head and cone areas use the usual shop approximations (2:1 ellipsoidal dish
//! inner area ≈ 1.084·D², blank diameter ≈ 1.24·OD + 2·SF).

use once_cell::sync::Lazy;

use super::material::MaterialCategory;
use super::shape::{
    BlankDimensionSpec, BlankShape, FabricationCostOverrides, NamedFormula, ShapeCategory, ShapeDefinition,
    ShapeParameter,
};
use crate::formula::FormulaDefinition;

static CATALOG: Lazy<Vec<ShapeDefinition>> = Lazy::new(|| {
    vec![
        rectangular_plate(),
        circular_plate(),
        annular_plate(),
        rolled_tube(),
        seamless_pipe(),
        nozzle(),
        hemispherical_head(),
        ellipsoidal_head(),
        conical_section(),
    ]
});

/// Every built-in shape, in catalog order
pub fn builtin_shapes() -> &'static [ShapeDefinition] {
    &CATALOG
}

pub fn builtin_shape(key: &str) -> Option<&'static ShapeDefinition> {
    CATALOG.iter().find(|s| s.key == key)
}

// ============================================================================
// Helpers
// ============================================================================

fn volume(expression: &str, variables: &[&str]) -> FormulaDefinition {
    FormulaDefinition::new(expression, variables, "mm³").describe("Finished volume")
}

fn weight(volume_expression: &str, variables: &[&str]) -> FormulaDefinition {
    FormulaDefinition::new(format!("({}) * density / 1e9", volume_expression), variables, "kg")
        .describe("Finished weight")
        .with_density()
        .with_expected_range(0.001, 500_000.0, "Unusual finished weight")
}

fn area(expression: &str, variables: &[&str], description: &str) -> FormulaDefinition {
    FormulaDefinition::new(expression, variables, "mm²").describe(description)
}

fn length(expression: &str, variables: &[&str], description: &str) -> FormulaDefinition {
    FormulaDefinition::new(expression, variables, "mm").describe(description)
}

fn thickness() -> ShapeParameter {
    ShapeParameter::numeric("t", "Thickness", "mm").with_range(0.5, 300.0).with_default(10.0)
}

fn allowance() -> ShapeParameter {
    ShapeParameter::numeric("a", "Cutting Allowance", "mm")
        .with_range(0.0, 100.0)
        .with_default(5.0)
        .optional()
}

fn circular_blank(diameter: &str, variables: &[&str], description: &str) -> BlankDimensionSpec {
    BlankDimensionSpec {
        blank_shape: BlankShape::Circular,
        dimensions: [("diameter".to_string(), length(diameter, variables, "Blank diameter"))]
            .into_iter()
            .collect(),
        description: description.to_string(),
    }
}

fn rectangular_blank(
    blank_length: &str,
    length_vars: &[&str],
    blank_width: &str,
    width_vars: &[&str],
    description: &str,
) -> BlankDimensionSpec {
    BlankDimensionSpec {
        blank_shape: BlankShape::Rectangular,
        dimensions: [
            ("length".to_string(), length(blank_length, length_vars, "Blank length")),
            ("width".to_string(), length(blank_width, width_vars, "Blank width")),
        ]
        .into_iter()
        .collect(),
        description: description.to_string(),
    }
}

// ============================================================================
// Plates
// ============================================================================

fn rectangular_plate() -> ShapeDefinition {
    let dims = &["L", "W", "t"];
    let outline = &[
        "volume",
        "weight",
        "surfaceArea",
        "finishedArea",
        "blankArea",
        "scrapPercentage",
        "perimeter",
        "edgeLength",
        "blank",
    ];
    ShapeDefinition::new("rectangular_plate", "Rectangular Plate", ShapeCategory::RectangularPlate)
        .with_description("Flat plate cut to length and width from stock")
        .with_parameter(ShapeParameter::numeric("L", "Length", "mm").with_range(1.0, 20_000.0).used_in(outline))
        .with_parameter(ShapeParameter::numeric("W", "Width", "mm").with_range(1.0, 4_000.0).used_in(outline))
        .with_parameter(thickness().used_in(&["volume", "weight", "surfaceArea"]))
        .with_parameter(allowance().used_in(&["blankArea", "scrapPercentage", "blank"]))
        .with_formula("volume", volume("L * W * t", dims))
        .with_formula("weight", weight("L * W * t", dims))
        .with_formula(
            "surfaceArea",
            area("2 * L * W + 2 * t * (L + W)", dims, "Both faces plus edges"),
        )
        .with_formula("finishedArea", area("L * W", &["L", "W"], "Finished face area"))
        .with_formula(
            "blankArea",
            area("(L + 2*a) * (W + 2*a)", &["L", "W", "a"], "Blank face area"),
        )
        .with_formula(
            "scrapPercentage",
            FormulaDefinition::new(
                "((L + 2*a) * (W + 2*a) - L * W) / ((L + 2*a) * (W + 2*a)) * 100",
                &["L", "W", "a"],
                "%",
            )
            .describe("Share of the blank lost as scrap"),
        )
        .with_formula("perimeter", length("2 * (L + W)", &["L", "W"], "Cutting length"))
        .with_formula("edgeLength", length("2 * (L + W)", &["L", "W"], "Edges to prepare"))
        .with_blank_dimensions(
            "blank",
            rectangular_blank(
                "L + 2*a",
                &["L", "a"],
                "W + 2*a",
                &["W", "a"],
                "Rectangular blank with allowance all round",
            ),
        )
        .with_rule("width_exceeds_thickness", "W - t", "Width should exceed thickness")
}

fn circular_plate() -> ShapeDefinition {
    ShapeDefinition::new("circular_plate", "Circular Plate", ShapeCategory::CircularPlate)
        .with_description("Disc profile-cut from a square blank")
        .with_parameter(ShapeParameter::numeric("D", "Diameter", "mm").with_range(10.0, 6_000.0))
        .with_parameter(thickness())
        .with_parameter(allowance())
        .with_formula("volume", volume("pi * D^2 / 4 * t", &["D", "t"]))
        .with_formula("weight", weight("pi * D^2 / 4 * t", &["D", "t"]))
        .with_formula(
            "surfaceArea",
            area("2 * pi * D^2 / 4 + pi * D * t", &["D", "t"], "Both faces plus rim"),
        )
        .with_formula("finishedArea", area("pi * D^2 / 4", &["D"], "Finished face area"))
        .with_formula("blankArea", area("(D + 2*a)^2", &["D", "a"], "Square blank area"))
        .with_formula(
            "scrapPercentage",
            FormulaDefinition::new("(1 - pi * D^2 / 4 / (D + 2*a)^2) * 100", &["D", "a"], "%")
                .describe("Share of the blank lost as scrap"),
        )
        .with_formula("perimeter", length("pi * D", &["D"], "Cutting length"))
        .with_formula("edgeLength", length("pi * D", &["D"], "Edges to prepare"))
        .with_blank_dimensions(
            "blank",
            rectangular_blank("D + 2*a", &["D", "a"], "D + 2*a", &["D", "a"], "Square blank"),
        )
}

fn annular_plate() -> ShapeDefinition {
    let ring = "pi / 4 * (OD^2 - ID^2)";
    ShapeDefinition::new("annular_plate", "Annular Plate", ShapeCategory::AnnularPlate)
        .with_description("Ring plate for flanges, stiffeners and base rings")
        .with_parameter(ShapeParameter::numeric("OD", "Outside Diameter", "mm").with_range(20.0, 6_000.0))
        .with_parameter(ShapeParameter::numeric("ID", "Inside Diameter", "mm").with_range(0.0, 5_990.0))
        .with_parameter(thickness())
        .with_parameter(allowance())
        .with_formula("volume", volume(&format!("{} * t", ring), &["OD", "ID", "t"]))
        .with_formula("weight", weight(&format!("{} * t", ring), &["OD", "ID", "t"]))
        .with_formula(
            "surfaceArea",
            area(
                "2 * pi / 4 * (OD^2 - ID^2) + pi * (OD + ID) * t",
                &["OD", "ID", "t"],
                "Both faces plus rims",
            ),
        )
        .with_formula("finishedArea", area(ring, &["OD", "ID"], "Finished face area"))
        .with_formula("blankArea", area("(OD + 2*a)^2", &["OD", "a"], "Square blank area"))
        .with_formula("perimeter", length("pi * (OD + ID)", &["OD", "ID"], "Outer and inner cut"))
        .with_formula("edgeLength", length("pi * (OD + ID)", &["OD", "ID"], "Edges to prepare"))
        .with_rule("ring_has_width", "OD - ID", "Outside diameter must exceed inside diameter")
}

// ============================================================================
// Tubes and nozzles
// ============================================================================

fn rolled_tube() -> ShapeDefinition {
    let shell = "pi * ((OD/2)^2 - (OD/2 - t)^2) * L";
    let vars = &["OD", "t", "L"];
    ShapeDefinition::new("rolled_tube", "Rolled Tube", ShapeCategory::RolledTube)
        .with_description("Plate rolled to a cylinder with one longitudinal seam")
        .with_parameter(ShapeParameter::numeric("OD", "Outside Diameter", "mm").with_range(50.0, 8_000.0))
        .with_parameter(thickness())
        .with_parameter(ShapeParameter::numeric("L", "Length", "mm").with_range(10.0, 12_000.0))
        .with_parameter(allowance())
        .with_formula("volume", volume(shell, vars))
        .with_formula("weight", weight(shell, vars))
        .with_formula("outerSurfaceArea", area("pi * OD * L", &["OD", "L"], "Outside surface"))
        .with_formula(
            "innerSurfaceArea",
            area("pi * (OD - 2*t) * L", vars, "Inside surface"),
        )
        .with_formula(
            "surfaceArea",
            area("pi * OD * L + pi * (OD - 2*t) * L", vars, "Inside plus outside surface"),
        )
        .with_formula("wettedArea", area("pi * (OD - 2*t) * L", vars, "Surface in contact with contents"))
        .with_formula(
            "finishedArea",
            area("pi * (OD - t) * L", vars, "Developed plate at mean diameter"),
        )
        .with_formula(
            "blankArea",
            area("(pi * (OD - t) + 2*a) * (L + 2*a)", &["OD", "t", "L", "a"], "Blank plate area"),
        )
        .with_formula("perimeter", length("2 * (pi * (OD - t) + L)", vars, "Blank cutting length"))
        .with_formula(
            "edgeLength",
            length("2 * L + 2 * pi * (OD - t)", vars, "Seam and end edges to bevel"),
        )
        .with_formula("weldLength", length("L", &["L"], "Longitudinal seam"))
        .with_blank_dimensions(
            "blank",
            rectangular_blank(
                "pi * (OD - t) + 2*a",
                &["OD", "t", "a"],
                "L + 2*a",
                &["L", "a"],
                "Flat plate before rolling",
            ),
        )
        .with_rule("wall_fits", "OD - 2*t", "Wall thickness must be less than half the outside diameter")
}

fn seamless_pipe() -> ShapeDefinition {
    let shell = "pi * ((OD/2)^2 - (OD/2 - t)^2) * L";
    let vars = &["OD", "t", "L"];
    ShapeDefinition::new("seamless_pipe", "Seamless Pipe", ShapeCategory::SeamlessPipe)
        .with_description("Pipe cut to length, both ends bevelled")
        .with_parameter(ShapeParameter::numeric("OD", "Outside Diameter", "mm").with_range(10.0, 1_200.0))
        .with_parameter(thickness())
        .with_parameter(ShapeParameter::numeric("L", "Length", "mm").with_range(10.0, 12_000.0))
        .with_formula("volume", volume(shell, vars))
        .with_formula("weight", weight(shell, vars))
        .with_formula("outerSurfaceArea", area("pi * OD * L", &["OD", "L"], "Outside surface"))
        .with_formula("innerSurfaceArea", area("pi * (OD - 2*t) * L", vars, "Inside surface"))
        .with_formula(
            "surfaceArea",
            area("pi * OD * L + pi * (OD - 2*t) * L", vars, "Inside plus outside surface"),
        )
        .with_formula("wettedArea", area("pi * (OD - 2*t) * L", vars, "Surface in contact with contents"))
        .with_formula("perimeter", length("2 * pi * OD", &["OD"], "Two end cuts"))
        .with_formula("edgeLength", length("2 * pi * OD", &["OD"], "Two end bevels"))
        .with_rule("wall_fits", "OD - 2*t", "Wall thickness must be less than half the outside diameter")
}

fn nozzle() -> ShapeDefinition {
    let neck = "pi * ((d/2)^2 - (d/2 - t)^2) * h";
    let vars = &["d", "t", "h"];
    ShapeDefinition::new("nozzle", "Nozzle Neck", ShapeCategory::Nozzle)
        .with_description("Set-on nozzle neck welded to the shell and to its flange")
        .with_parameter(ShapeParameter::numeric("d", "Neck Outside Diameter", "mm").with_range(20.0, 2_000.0))
        .with_parameter(thickness())
        .with_parameter(ShapeParameter::numeric("h", "Projection", "mm").with_range(20.0, 1_000.0).with_default(150.0))
        .with_formula("volume", volume(neck, vars))
        .with_formula("weight", weight(neck, vars))
        .with_formula("outerSurfaceArea", area("pi * d * h", &["d", "h"], "Outside surface"))
        .with_formula("innerSurfaceArea", area("pi * (d - 2*t) * h", vars, "Inside surface"))
        .with_formula(
            "surfaceArea",
            area("pi * d * h + pi * (d - 2*t) * h", vars, "Inside plus outside surface"),
        )
        .with_formula("wettedArea", area("pi * (d - 2*t) * h", vars, "Surface in contact with contents"))
        .with_formula("perimeter", length("2 * pi * d", &["d"], "Two end cuts"))
        .with_formula("edgeLength", length("2 * pi * d", &["d"], "Two end bevels"))
        .with_formula("weldLength", length("2 * pi * d", &["d"], "Shell and flange attachment welds"))
        .with_custom_formulas(
            "reinforcement",
            vec![
                NamedFormula {
                    name: "openingArea".to_string(),
                    formula: area("pi * (d - 2*t)^2 / 4", &["d", "t"], "Shell opening"),
                },
                NamedFormula {
                    name: "padDiameter".to_string(),
                    formula: length("2 * d", &["d"], "Reinforcement pad outside diameter"),
                },
            ],
        )
        .with_materials(&MaterialCategory::STEELS)
        .with_fabrication_cost(FabricationCostOverrides {
            base_cost: Some(750.0),
            labor_hours: Some(1.5),
            ..Default::default()
        })
        .with_rule("wall_fits", "d - 2*t", "Wall thickness must be less than half the neck diameter")
}

// ============================================================================
// Heads and cones
// ============================================================================

fn hemispherical_head() -> ShapeDefinition {
    let shell = "2 / 3 * pi * ((D/2 + t)^3 - (D/2)^3)";
    let blank_d = "sqrt(2) * (D + t)";
    ShapeDefinition::new("hemispherical_head", "Hemispherical Head", ShapeCategory::HemisphericalHead)
        .with_description("Pressed hemisphere from a circular blank")
        .with_parameter(ShapeParameter::numeric("D", "Inside Diameter", "mm").with_range(100.0, 6_000.0))
        .with_parameter(thickness())
        .with_parameter(allowance())
        .with_formula("volume", volume(shell, &["D", "t"]))
        .with_formula("weight", weight(shell, &["D", "t"]))
        .with_formula("innerSurfaceArea", area("2 * pi * (D/2)^2", &["D"], "Inside surface"))
        .with_formula("outerSurfaceArea", area("2 * pi * (D/2 + t)^2", &["D", "t"], "Outside surface"))
        .with_formula(
            "surfaceArea",
            area("2 * pi * (D/2)^2 + 2 * pi * (D/2 + t)^2", &["D", "t"], "Inside plus outside surface"),
        )
        .with_formula("wettedArea", area("2 * pi * (D/2)^2", &["D"], "Surface in contact with contents"))
        .with_formula(
            "finishedArea",
            area(&format!("pi * ({})^2 / 4", blank_d), &["D", "t"], "Circular blank area"),
        )
        .with_formula(
            "blankArea",
            area(&format!("({} + 2*a)^2", blank_d), &["D", "t", "a"], "Square plate the blank is cut from"),
        )
        .with_formula("perimeter", length(&format!("pi * {}", blank_d), &["D", "t"], "Blank cutting length"))
        .with_formula("weldLength", length("pi * (D + t)", &["D", "t"], "Head-to-shell seam"))
        .with_formula("edgeLength", length("pi * (D + 2*t)", &["D", "t"], "Skirt edge to bevel"))
        .with_blank_dimensions(
            "blank",
            circular_blank(&format!("{} + 2*a", blank_d), &["D", "t", "a"], "Circular pressing blank"),
        )
        .with_materials(&MaterialCategory::STEELS)
}

fn ellipsoidal_head() -> ShapeDefinition {
    let mean = "(1.084 * (D + t)^2 + pi * (D + t) * sf) * t";
    let blank_d = "(1.24 * (D + 2*t) + 2*sf)";
    let vars = &["D", "t", "sf"];
    ShapeDefinition::new("ellipsoidal_head", "2:1 Ellipsoidal Head", ShapeCategory::EllipsoidalHead)
        .with_description("Semi-ellipsoidal 2:1 dished head with straight flange")
        .with_parameter(ShapeParameter::numeric("D", "Inside Diameter", "mm").with_range(150.0, 6_000.0))
        .with_parameter(thickness())
        .with_parameter(ShapeParameter::numeric("sf", "Straight Flange", "mm").with_range(0.0, 150.0).with_default(40.0))
        .with_parameter(allowance())
        .with_formula("volume", volume(mean, vars))
        .with_formula("weight", weight(mean, vars))
        .with_formula(
            "innerSurfaceArea",
            area("1.084 * D^2 + pi * D * sf", &["D", "sf"], "Inside surface"),
        )
        .with_formula(
            "outerSurfaceArea",
            area("1.084 * (D + 2*t)^2 + pi * (D + 2*t) * sf", vars, "Outside surface"),
        )
        .with_formula(
            "surfaceArea",
            area(
                "1.084 * D^2 + pi * D * sf + 1.084 * (D + 2*t)^2 + pi * (D + 2*t) * sf",
                vars,
                "Inside plus outside surface",
            ),
        )
        .with_formula("wettedArea", area("1.084 * D^2 + pi * D * sf", &["D", "sf"], "Surface in contact with contents"))
        .with_formula(
            "finishedArea",
            area(&format!("pi * {}^2 / 4", blank_d), vars, "Circular blank area"),
        )
        .with_formula(
            "blankArea",
            area(&format!("({} + 2*a)^2", blank_d), &["D", "t", "sf", "a"], "Square plate the blank is cut from"),
        )
        .with_formula("perimeter", length(&format!("pi * {}", blank_d), vars, "Blank cutting length"))
        .with_formula("weldLength", length("pi * (D + t)", &["D", "t"], "Head-to-shell seam"))
        .with_formula("edgeLength", length("pi * (D + 2*t)", &["D", "t"], "Skirt edge to bevel"))
        .with_blank_dimensions(
            "blank",
            circular_blank(&format!("{} + 2*a", blank_d), &["D", "t", "sf", "a"], "Circular pressing blank"),
        )
        .with_materials(&MaterialCategory::STEELS)
}

fn conical_section() -> ShapeDefinition {
    let slant = "sqrt(H^2 + ((D1 - D2) / 2)^2)";
    let vars = &["D1", "D2", "H", "t"];
    let mean = format!("pi * (D1 + D2 + 2*t) / 2 * {} * t", slant);
    ShapeDefinition::new("conical_section", "Concentric Cone", ShapeCategory::ConicalSection)
        .with_description("Rolled concentric reducer cone with one longitudinal seam")
        .with_parameter(ShapeParameter::numeric("D1", "Large End Inside Diameter", "mm").with_range(50.0, 8_000.0))
        .with_parameter(ShapeParameter::numeric("D2", "Small End Inside Diameter", "mm").with_range(20.0, 8_000.0))
        .with_parameter(ShapeParameter::numeric("H", "Height", "mm").with_range(10.0, 10_000.0))
        .with_parameter(thickness())
        .with_formula("volume", volume(&mean, vars))
        .with_formula("weight", weight(&mean, vars))
        .with_formula(
            "innerSurfaceArea",
            area(&format!("pi * (D1 + D2) / 2 * {}", slant), &["D1", "D2", "H"], "Inside surface"),
        )
        .with_formula(
            "outerSurfaceArea",
            area(&format!("pi * (D1 + D2 + 4*t) / 2 * {}", slant), vars, "Outside surface"),
        )
        .with_formula(
            "surfaceArea",
            area(&format!("pi * (D1 + D2 + 2*t) * {}", slant), vars, "Inside plus outside surface"),
        )
        .with_formula(
            "wettedArea",
            area(&format!("pi * (D1 + D2) / 2 * {}", slant), &["D1", "D2", "H"], "Surface in contact with contents"),
        )
        .with_formula(
            "weldLength",
            length(&format!("{} + pi * (D1 + t) + pi * (D2 + t)", slant), vars, "Long seam and both girth seams"),
        )
        .with_formula(
            "edgeLength",
            length(&format!("2 * {} + pi * (D1 + t) + pi * (D2 + t)", slant), vars, "Seam and end edges to bevel"),
        )
        .with_formula(
            "perimeter",
            length(&format!("2 * {} + pi * (D1 + t) + pi * (D2 + t)", slant), vars, "Developed blank outline"),
        )
        .with_custom_formulas(
            "geometry",
            vec![
                NamedFormula {
                    name: "slantHeight".to_string(),
                    formula: length(slant, &["D1", "D2", "H"], "Slant height"),
                },
                NamedFormula {
                    name: "halfApexAngle".to_string(),
                    formula: FormulaDefinition::new("rad2deg(atan((D1 - D2) / (2 * H)))", &["D1", "D2", "H"], "°")
                        .describe("Half apex angle")
                        .with_expected_range(0.0, 60.0, "Half apex angle above 60° needs a toriconical design"),
                },
            ],
        )
        .with_rule("large_end_is_larger", "D1 - D2", "Large end diameter must exceed small end diameter")
}
