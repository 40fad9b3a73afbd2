//! # shape_core - Parametric Shape Calculation Engine
//!
//! `shape_core` evaluates catalog-defined formulas against chosen parameters
//! to derive volume, weight, surface areas, blank and scrap requirements, and
//! an itemized fabrication cost for plates, tubes, nozzles, heads and cones.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **Catalog-Driven**: Shapes are data; new shapes need no new code
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use shape_core::calculations::{calculate, ShapeCalculationInput};
//! use shape_core::catalog::{Material, MaterialCategory, Price, ShapeRegistry};
//!
//! let registry = ShapeRegistry::builtin();
//! let tube = registry.find("rolled_tube").unwrap();
//! assert_eq!(tube.code.as_deref(), Some("TUB-001"));
//!
//! let material = Material::new("SS304", "SA 240 304", MaterialCategory::StainlessSteel)
//!     .with_density(7930.0)
//!     .with_price(Price::per_kg(240.0, "INR"));
//! let input = ShapeCalculationInput::new(tube, material)
//!     .with_parameter("OD", 500.0)
//!     .with_parameter("t", 10.0)
//!     .with_parameter("L", 3000.0)
//!     .with_quantity(2.0);
//!
//! let result = calculate(&input).unwrap();
//! assert!(result.total_cost > 0.0);
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`formula`] - Expression evaluator and batch evaluator
//! - [`catalog`] - Shapes, materials, the built-in catalog and the registry
//! - [`calculations`] - Fabrication rates and the calculation pipeline
//! - [`settings`] - Engine configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod catalog;
pub mod errors;
pub mod formula;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, CalculationResult, ShapeCalculationInput};
pub use catalog::{Material, ShapeDefinition, ShapeRegistry};
pub use errors::{CalcError, CalcResult};
pub use formula::{evaluate, evaluate_all, FormulaDefinition};
pub use settings::EngineSettings;
