//! # Unit Types
//!
//! Type-safe wrappers for the units the calculation pipeline converts between.
//! Catalog formulas work in millimetres (lengths, areas, volumes) and produce
//! weights in kilograms; fabrication rates are quoted per metre and per
//! square metre, and densities in kg/m³.
//!
//! ## Design Philosophy
//!
//! Simple `f64` newtypes rather than a full units library:
//! - The pipeline uses a small, fixed set of units
//! - JSON serialization stays clean (just numbers)
//! - Minimal runtime overhead
//!
//! ## Example
//!
//! ```rust
//! use shape_core::units::{Meters, Millimeters};
//!
//! let perimeter = Millimeters(4000.0);
//! let perimeter_m: Meters = perimeter.into();
//! assert_eq!(perimeter_m.0, 4.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Millimetres per metre
pub const MM_PER_M: f64 = 1_000.0;
/// Square millimetres per square metre
pub const MM2_PER_M2: f64 = 1_000_000.0;
/// Cubic millimetres per cubic metre
pub const MM3_PER_M3: f64 = 1_000_000_000.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / MM_PER_M)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * MM_PER_M)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMillimeters(pub f64);

/// Area in square metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

impl From<SquareMillimeters> for SquareMeters {
    fn from(mm2: SquareMillimeters) -> Self {
        SquareMeters(mm2.0 / MM2_PER_M2)
    }
}

impl Sub for SquareMillimeters {
    type Output = SquareMillimeters;
    fn sub(self, rhs: Self) -> Self::Output {
        SquareMillimeters(self.0 - rhs.0)
    }
}

/// Area × thickness gives volume
impl Mul<Millimeters> for SquareMillimeters {
    type Output = CubicMillimeters;
    fn mul(self, rhs: Millimeters) -> Self::Output {
        CubicMillimeters(self.0 * rhs.0)
    }
}

// ============================================================================
// Volume Units
// ============================================================================

/// Volume in cubic millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMillimeters(pub f64);

/// Volume in cubic metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMeters(pub f64);

impl From<CubicMillimeters> for CubicMeters {
    fn from(mm3: CubicMillimeters) -> Self {
        CubicMeters(mm3.0 / MM3_PER_M3)
    }
}

// ============================================================================
// Mass and Density
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Density in kilograms per cubic metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgPerCubicMeter(pub f64);

/// Volume × density gives mass
impl Mul<KgPerCubicMeter> for CubicMeters {
    type Output = Kilograms;
    fn mul(self, rhs: KgPerCubicMeter) -> Self::Output {
        Kilograms(self.0 * rhs.0)
    }
}

impl Add for Kilograms {
    type Output = Kilograms;
    fn add(self, rhs: Self) -> Self::Output {
        Kilograms(self.0 + rhs.0)
    }
}

impl Mul<f64> for Kilograms {
    type Output = Kilograms;
    fn mul(self, rhs: f64) -> Self::Output {
        Kilograms(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversion() {
        let m: Meters = Millimeters(2500.0).into();
        assert_eq!(m.0, 2.5);
        let mm: Millimeters = Meters(1.2).into();
        assert!((mm.0 - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_conversion() {
        let m2: SquareMeters = SquareMillimeters(2_000_000.0).into();
        assert_eq!(m2.0, 2.0);
    }

    #[test]
    fn test_plate_mass_from_volume() {
        // 1000 x 1000 x 10 mm steel plate
        let volume = SquareMillimeters(1_000_000.0) * Millimeters(10.0);
        let mass = CubicMeters::from(volume) * KgPerCubicMeter(7850.0);
        assert!((mass.0 - 78.5).abs() < 1e-9);
    }

    #[test]
    fn test_transparent_serialization() {
        let json = serde_json::to_string(&Kilograms(12.5)).unwrap();
        assert_eq!(json, "12.5");
    }
}
