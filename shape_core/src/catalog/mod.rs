//! # Catalog
//!
//! Shape archetypes, material records and the registry that serves them.
//!
//! ## Modules
//!
//! - [`shape`] - Shape definitions, parameters, formula entries, consistency checks
//! - [`material`] - Material records and prices
//! - [`builtin`] - The static built-in shape catalog
//! - [`registry`] - Category-group lookup with stable ids and codes

pub mod builtin;
pub mod material;
pub mod registry;
pub mod shape;

pub use builtin::{builtin_shape, builtin_shapes};
pub use material::{Material, MaterialCategory, Price};
pub use registry::{shape_id, CategoryGroup, ShapeRegistry};
pub use shape::{
    BlankDimensionSpec, BlankShape, ConsistencyIssue, FabricationCostOverrides, FormulaEntry, NamedFormula,
    ParameterDomain, ParameterIssue, ParameterOption, ShapeCategory, ShapeDefinition, ShapeParameter,
    ValidationRule,
};
