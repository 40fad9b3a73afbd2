//! # Materials
//!
//! Material records as supplied by the pricing source. The engine only reads
//! density and price from them; it never fetches or mutates materials.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "id": "IS2062-E250",
//!   "name": "IS 2062 E250 BR",
//!   "category": "carbon_steel",
//!   "density": 7850.0,
//!   "currentPrice": { "amount": 68.5, "currency": "INR", "unit": "kg" }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Material family, used to restrict shapes and to scale fabrication rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    CarbonSteel,
    AlloySteel,
    StainlessSteel,
    DuplexStainless,
    NickelAlloy,
    Aluminium,
    Copper,
    Titanium,
    Other,
}

impl MaterialCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::CarbonSteel => "Carbon Steel",
            MaterialCategory::AlloySteel => "Alloy Steel",
            MaterialCategory::StainlessSteel => "Stainless Steel",
            MaterialCategory::DuplexStainless => "Duplex Stainless",
            MaterialCategory::NickelAlloy => "Nickel Alloy",
            MaterialCategory::Aluminium => "Aluminium",
            MaterialCategory::Copper => "Copper",
            MaterialCategory::Titanium => "Titanium",
            MaterialCategory::Other => "Other",
        }
    }

    /// Steels of every grade; the usual restriction for pressure parts
    pub const STEELS: [MaterialCategory; 4] = [
        MaterialCategory::CarbonSteel,
        MaterialCategory::AlloySteel,
        MaterialCategory::StainlessSteel,
        MaterialCategory::DuplexStainless,
    ];
}

/// Price per unit mass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
    /// Mass unit the amount is quoted per. Only "kg" is priced directly.
    #[serde(default = "default_price_unit")]
    pub unit: String,
}

fn default_price_unit() -> String {
    "kg".to_string()
}

impl Price {
    pub fn per_kg(amount: f64, currency: impl Into<String>) -> Self {
        Price {
            amount,
            currency: currency.into(),
            unit: default_price_unit(),
        }
    }

    /// Amount normalized to one kilogram
    pub fn amount_per_kg(&self) -> f64 {
        match self.unit.as_str() {
            "g" => self.amount * 1000.0,
            "t" | "tonne" | "MT" => self.amount / 1000.0,
            _ => self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category: MaterialCategory,

    /// Density in kg/m³; the engine default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Price>,
}

impl Material {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: MaterialCategory) -> Self {
        Material {
            id: id.into(),
            name: name.into(),
            category,
            density: None,
            current_price: None,
        }
    }

    pub fn with_density(mut self, density_kg_m3: f64) -> Self {
        self.density = Some(density_kg_m3);
        self
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Base price per kilogram, 0 when the material is unpriced
    pub fn price_per_kg(&self) -> f64 {
        self.current_price.as_ref().map(Price::amount_per_kg).unwrap_or(0.0)
    }

    pub fn currency(&self) -> Option<&str> {
        self.current_price.as_ref().map(|p| p.currency.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_json() {
        let json = r#"{
            "id": "SS304",
            "name": "SA 240 304",
            "category": "stainless_steel",
            "density": 7930,
            "currentPrice": { "amount": 240, "currency": "INR" }
        }"#;
        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.category, MaterialCategory::StainlessSteel);
        assert_eq!(material.density, Some(7930.0));
        assert_eq!(material.price_per_kg(), 240.0);
        assert_eq!(material.currency(), Some("INR"));
    }

    #[test]
    fn test_unpriced_material() {
        let material = Material::new("X", "Unpriced", MaterialCategory::Other);
        assert_eq!(material.price_per_kg(), 0.0);
        assert!(material.currency().is_none());
    }

    #[test]
    fn test_price_per_tonne_is_normalized() {
        let price = Price {
            amount: 65_000.0,
            currency: "INR".to_string(),
            unit: "t".to_string(),
        };
        assert_eq!(price.amount_per_kg(), 65.0);
    }
}
