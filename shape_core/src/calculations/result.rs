//! # Calculation Result
//!
//! Output contract of the pipeline. Created fresh per request and owned by
//! the caller.
//!
//! ## JSON Example (abridged)
//!
//! ```json
//! {
//!   "shapeKey": "rectangular_plate",
//!   "density": 7850.0,
//!   "calculatedValues": { "volume": 10000000.0, "weight": 78.5, "perimeter": 4000.0 },
//!   "costEstimate": { "materialCost": 19625.0, "totalCost": 20577.0, "currency": "INR" },
//!   "quantity": 1.0,
//!   "totalWeight": 78.5,
//!   "totalCost": 20577.0
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fabrication::FabricationRates;
use crate::formula::RangeWarning;

/// One input parameter as it was used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterEcho {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// Geometric primitives of one piece. Volume in mm³, areas in mm², lengths in
/// mm, weights in kg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedValues {
    pub volume: f64,
    pub weight: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wetted_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blank_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrap_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weld_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perimeter: Option<f64>,

    /// Present when the scrap law applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrap_weight: Option<f64>,

    /// Evaluated blank dimensions (mm), keyed by dimension name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blank_dimensions: BTreeMap<String, f64>,

    /// Custom formula groups, keyed `group.name`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_values: BTreeMap<String, f64>,
}

/// Itemized cost of one piece, in `currency`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Finished weight × base price
    pub material_cost: f64,
    /// Finished plus scrap weight × base price
    pub material_cost_actual: f64,
    pub scrap_recovery_value: f64,

    pub cutting_cost: f64,
    pub edge_preparation_cost: f64,
    pub welding_cost: f64,
    pub surface_treatment_cost: f64,
    /// Base cost + weight-based cost + labor
    pub base_fabrication_cost: f64,
    pub total_fabrication_cost: f64,

    /// Net cost of one piece
    pub unit_total_cost: f64,
    pub total_cost: f64,
    pub effective_cost_per_kg: f64,
    pub currency: String,

    pub fabrication_rates: FabricationRates,
    pub welding_thickness_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub shape_key: String,
    pub shape_name: String,
    pub material_id: String,
    pub material_name: String,

    /// Density actually used (kg/m³)
    pub density: f64,
    pub parameters: Vec<ParameterEcho>,

    pub calculated_values: CalculatedValues,
    pub cost_estimate: CostEstimate,

    pub quantity: f64,
    pub total_weight: f64,
    pub total_cost: f64,

    /// Advisory messages; none of them invalidate the result
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub range_warnings: Vec<RangeWarning>,
}

impl CalculationResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
