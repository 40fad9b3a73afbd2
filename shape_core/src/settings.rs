//! # Engine Settings
//!
//! Tunable constants of the calculation pipeline. Every field has a default,
//! so a settings file only needs the values it changes.
//!
//! ```json
//! {
//!   "defaultDensity": 7850.0,
//!   "scrapRecoveryRate": 0.3,
//!   "defaultRates": { "weldingPerMeter": 650.0 },
//!   "materialRateFactors": { "titanium": { "welding": 3.5 } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calculations::fabrication::FabricationRates;
use crate::catalog::{MaterialCategory, ShapeCategory};
use crate::errors::{CalcError, CalcResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    /// Density used when the material carries none (kg/m³)
    pub default_density: f64,

    /// Share of the scrap value credited back (0..=1)
    pub scrap_recovery_rate: f64,

    pub default_currency: String,

    /// Parameter holding plate/wall thickness in mm
    pub thickness_parameter: String,

    pub weld_multiplier: WeldMultiplierSettings,

    /// Rates used when neither the user nor the shape supplies one
    pub default_rates: FabricationRates,

    /// Per-material multipliers applied to the default rates
    pub material_rate_factors: BTreeMap<MaterialCategory, RateFactors>,

    /// Default labor hours per piece, by shape category
    pub category_labor_hours: BTreeMap<ShapeCategory, f64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_density: 7850.0,
            scrap_recovery_rate: 0.30,
            default_currency: "INR".to_string(),
            thickness_parameter: "t".to_string(),
            weld_multiplier: WeldMultiplierSettings::default(),
            default_rates: FabricationRates::default(),
            material_rate_factors: default_material_factors(),
            category_labor_hours: default_labor_hours(),
        }
    }
}

impl EngineSettings {
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !(self.default_density.is_finite() && self.default_density > 0.0) {
            return Err(CalcError::invalid_input(
                "defaultDensity",
                self.default_density.to_string(),
                "must be a positive number",
            ));
        }
        if !(0.0..=1.0).contains(&self.scrap_recovery_rate) {
            return Err(CalcError::invalid_input(
                "scrapRecoveryRate",
                self.scrap_recovery_rate.to_string(),
                "must lie between 0 and 1",
            ));
        }
        if self.weld_multiplier.divisor == 0.0 || !self.weld_multiplier.divisor.is_finite() {
            return Err(CalcError::invalid_input(
                "weldMultiplier.divisor",
                self.weld_multiplier.divisor.to_string(),
                "must be a non-zero number",
            ));
        }
        Ok(())
    }

    /// Rate factors for a material, neutral when none are configured
    pub fn factors_for(&self, category: MaterialCategory) -> RateFactors {
        self.material_rate_factors.get(&category).copied().unwrap_or_default()
    }

    pub fn labor_hours_for(&self, category: ShapeCategory) -> f64 {
        self.category_labor_hours
            .get(&category)
            .copied()
            .unwrap_or(self.default_rates.labor_hours)
    }
}

/// `max(floor, 1 + (t - reference) / divisor)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeldMultiplierSettings {
    pub reference_thickness: f64,
    pub divisor: f64,
    pub floor: f64,
}

impl Default for WeldMultiplierSettings {
    fn default() -> Self {
        WeldMultiplierSettings {
            reference_thickness: 10.0,
            divisor: 50.0,
            floor: 0.5,
        }
    }
}

/// Multipliers on the default rates for one material family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateFactors {
    pub cutting: f64,
    pub edge_preparation: f64,
    pub welding: f64,
    pub surface_treatment: f64,
    pub labor: f64,
}

impl Default for RateFactors {
    fn default() -> Self {
        RateFactors {
            cutting: 1.0,
            edge_preparation: 1.0,
            welding: 1.0,
            surface_treatment: 1.0,
            labor: 1.0,
        }
    }
}

impl RateFactors {
    fn new(cutting: f64, edge_preparation: f64, welding: f64, surface_treatment: f64, labor: f64) -> Self {
        RateFactors {
            cutting,
            edge_preparation,
            welding,
            surface_treatment,
            labor,
        }
    }
}

fn default_material_factors() -> BTreeMap<MaterialCategory, RateFactors> {
    // Carbon steel and "other" stay at 1.0
    [
        (MaterialCategory::AlloySteel, RateFactors::new(1.2, 1.2, 1.3, 1.0, 1.1)),
        (MaterialCategory::StainlessSteel, RateFactors::new(1.5, 1.3, 1.6, 1.2, 1.2)),
        (MaterialCategory::DuplexStainless, RateFactors::new(1.8, 1.5, 2.0, 1.2, 1.3)),
        (MaterialCategory::NickelAlloy, RateFactors::new(2.0, 1.6, 2.5, 1.3, 1.5)),
        (MaterialCategory::Aluminium, RateFactors::new(0.8, 0.9, 1.4, 1.1, 1.1)),
        (MaterialCategory::Copper, RateFactors::new(1.1, 1.0, 1.5, 1.1, 1.1)),
        (MaterialCategory::Titanium, RateFactors::new(2.5, 2.0, 3.0, 1.5, 1.8)),
    ]
    .into_iter()
    .collect()
}

fn default_labor_hours() -> BTreeMap<ShapeCategory, f64> {
    [
        (ShapeCategory::RectangularPlate, 0.5),
        (ShapeCategory::CircularPlate, 0.5),
        (ShapeCategory::AnnularPlate, 0.75),
        (ShapeCategory::RolledTube, 2.0),
        (ShapeCategory::SeamlessPipe, 0.5),
        (ShapeCategory::Nozzle, 1.0),
        (ShapeCategory::HemisphericalHead, 4.0),
        (ShapeCategory::EllipsoidalHead, 3.0),
        (ShapeCategory::ConicalSection, 3.0),
    ]
    .into_iter()
    .collect()
}
