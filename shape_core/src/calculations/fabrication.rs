//! # Fabrication Rates
//!
//! Resolves the per-operation rates the pipeline prices with. Resolution runs
//! before the pure cost computation and goes through the
//! [`FabricationRateResolver`] trait so callers can plug in their own rate
//! source.
//!
//! ## Precedence (per field)
//!
//! 1. User override
//! 2. Shape-level override from the catalog
//! 3. Engine default scaled by the material-category factor
//!
//! Labor hours fall back to the per-shape-category default instead of a flat
//! engine value.

use serde::{Deserialize, Serialize};

use crate::catalog::{FabricationCostOverrides, MaterialCategory, ShapeCategory};
use crate::settings::{EngineSettings, WeldMultiplierSettings};

/// One resolved rate per operation type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FabricationRates {
    pub cutting_per_meter: f64,
    pub edge_preparation_per_meter: f64,
    pub welding_per_meter: f64,
    pub surface_treatment_per_sqm: f64,
    /// Fixed cost per piece
    pub base_cost: f64,
    pub cost_per_kg: f64,
    pub labor_hours: f64,
    pub labor_rate_per_hour: f64,
}

impl Default for FabricationRates {
    fn default() -> Self {
        FabricationRates {
            cutting_per_meter: 50.0,
            edge_preparation_per_meter: 100.0,
            welding_per_meter: 500.0,
            surface_treatment_per_sqm: 50.0,
            base_cost: 0.0,
            cost_per_kg: 0.0,
            labor_hours: 0.0,
            labor_rate_per_hour: 500.0,
        }
    }
}

/// What a resolver gets to decide on
#[derive(Debug, Clone, Copy)]
pub struct RateRequest<'a> {
    pub shape_rates: Option<&'a FabricationCostOverrides>,
    pub shape_category: ShapeCategory,
    pub material_category: MaterialCategory,
    pub user_overrides: Option<&'a FabricationCostOverrides>,
}

pub trait FabricationRateResolver {
    fn resolve(&self, request: &RateRequest<'_>) -> FabricationRates;
}

/// Resolver backed by [`EngineSettings`]
#[derive(Debug, Clone, Copy)]
pub struct DefaultRateResolver<'a> {
    settings: &'a EngineSettings,
}

impl<'a> DefaultRateResolver<'a> {
    pub fn new(settings: &'a EngineSettings) -> Self {
        DefaultRateResolver { settings }
    }
}

impl FabricationRateResolver for DefaultRateResolver<'_> {
    fn resolve(&self, request: &RateRequest<'_>) -> FabricationRates {
        let defaults = &self.settings.default_rates;
        let factors = self.settings.factors_for(request.material_category);
        let category_hours = self.settings.labor_hours_for(request.shape_category);

        let rates = FabricationRates {
            cutting_per_meter: pick(request, |o| o.cutting_cost_per_meter, defaults.cutting_per_meter * factors.cutting),
            edge_preparation_per_meter: pick(
                request,
                |o| o.edge_preparation_cost_per_meter,
                defaults.edge_preparation_per_meter * factors.edge_preparation,
            ),
            welding_per_meter: pick(request, |o| o.welding_cost_per_meter, defaults.welding_per_meter * factors.welding),
            surface_treatment_per_sqm: pick(
                request,
                |o| o.surface_treatment_cost_per_sqm,
                defaults.surface_treatment_per_sqm * factors.surface_treatment,
            ),
            base_cost: pick(request, |o| o.base_cost, defaults.base_cost),
            cost_per_kg: pick(request, |o| o.cost_per_kg, defaults.cost_per_kg),
            labor_hours: pick(request, |o| o.labor_hours, category_hours * factors.labor),
            labor_rate_per_hour: pick(request, |o| o.labor_rate_per_hour, defaults.labor_rate_per_hour),
        };
        tracing::debug!(
            shape_category = ?request.shape_category,
            material_category = ?request.material_category,
            ?rates,
            "fabrication rates resolved"
        );
        rates
    }
}

fn pick(request: &RateRequest<'_>, field: impl Fn(&FabricationCostOverrides) -> Option<f64>, fallback: f64) -> f64 {
    request
        .user_overrides
        .and_then(&field)
        .or_else(|| request.shape_rates.and_then(&field))
        .unwrap_or(fallback)
}

/// Resolve through the default resolver in one call.
pub fn resolve_fabrication_rates(
    shape_rates: Option<&FabricationCostOverrides>,
    shape_category: ShapeCategory,
    material_category: MaterialCategory,
    user_overrides: Option<&FabricationCostOverrides>,
    settings: &EngineSettings,
) -> FabricationRates {
    DefaultRateResolver::new(settings).resolve(&RateRequest {
        shape_rates,
        shape_category,
        material_category,
        user_overrides,
    })
}

/// Thicker walls need more weld passes: `max(floor, 1 + (t - ref) / divisor)`.
/// Without a thickness the multiplier is 1.
pub fn welding_thickness_multiplier(thickness_mm: Option<f64>, settings: &WeldMultiplierSettings) -> f64 {
    match thickness_mm {
        Some(t) if t.is_finite() => {
            let scaled = 1.0 + (t - settings.reference_thickness) / settings.divisor;
            scaled.max(settings.floor)
        }
        _ => 1.0,
    }
}
