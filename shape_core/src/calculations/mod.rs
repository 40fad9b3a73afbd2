//! # Calculations
//!
//! Fabrication rate resolution and the shape calculation pipeline. Follows
//! the usual pattern:
//!
//! - [`ShapeCalculationInput`] - Input contract (JSON-serializable)
//! - [`CalculationResult`] - Output contract (JSON-serializable)
//! - `calculate(input) -> CalcResult<CalculationResult>` - Pure calculation function
//!
//! ## Modules
//!
//! - [`fabrication`] - Rate resolution and the weld thickness multiplier
//! - [`pipeline`] - The calculation itself
//! - [`result`] - Result records

pub mod fabrication;
pub mod pipeline;
pub mod result;

pub use fabrication::{
    resolve_fabrication_rates, welding_thickness_multiplier, DefaultRateResolver, FabricationRateResolver,
    FabricationRates, RateRequest,
};
pub use pipeline::{calculate, calculate_with, calculate_with_rates, ShapeCalculationInput, REQUIRED_FORMULAS};
pub use result::{CalculatedValues, CalculationResult, CostEstimate, ParameterEcho};
