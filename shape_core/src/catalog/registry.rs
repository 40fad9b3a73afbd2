//! # Shape Registry
//!
//! Read-only lookup over a shape catalog. Shapes are filtered by category
//! group and returned as clones stamped with a stable id and a display code.
//!
//! ## Stamping
//!
//! - `id`: UUID v5 of the shape key, so the same shape always gets the same id
//! - `code`: group prefix plus 1-based position within the shape's primary
//!   group, e.g. `PLT-001`
//!
//! ```rust
//! use shape_core::catalog::{CategoryGroup, ShapeRegistry};
//!
//! let registry = ShapeRegistry::builtin();
//! let plates = registry.shapes_in(CategoryGroup::Plates);
//! assert_eq!(plates[0].code.as_deref(), Some("PLT-001"));
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::builtin::builtin_shapes;
use super::shape::{ShapeCategory, ShapeDefinition};
use crate::errors::{CalcError, CalcResult};

/// Namespace for shape ids derived from catalog keys
const SHAPE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_83d5_4b0a_9e27_51c8_d3f0_a6b4);

/// Coarse grouping of shape categories used for browsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryGroup {
    All,
    Plates,
    Tubes,
    Nozzles,
    Heads,
    Cones,
}

impl CategoryGroup {
    /// Concrete groups, in browsing order. `All` is not listed.
    pub const GROUPS: [CategoryGroup; 5] = [
        CategoryGroup::Plates,
        CategoryGroup::Tubes,
        CategoryGroup::Nozzles,
        CategoryGroup::Heads,
        CategoryGroup::Cones,
    ];

    pub fn from_name(name: &str) -> CalcResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(CategoryGroup::All),
            "plates" => Ok(CategoryGroup::Plates),
            "tubes" => Ok(CategoryGroup::Tubes),
            "nozzles" => Ok(CategoryGroup::Nozzles),
            "heads" => Ok(CategoryGroup::Heads),
            "cones" => Ok(CategoryGroup::Cones),
            _ => Err(CalcError::UnknownCategoryGroup {
                group: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CategoryGroup::All => "all",
            CategoryGroup::Plates => "plates",
            CategoryGroup::Tubes => "tubes",
            CategoryGroup::Nozzles => "nozzles",
            CategoryGroup::Heads => "heads",
            CategoryGroup::Cones => "cones",
        }
    }

    /// Shape categories belonging to this group
    pub fn categories(&self) -> &'static [ShapeCategory] {
        match self {
            CategoryGroup::All => &[
                ShapeCategory::RectangularPlate,
                ShapeCategory::CircularPlate,
                ShapeCategory::AnnularPlate,
                ShapeCategory::RolledTube,
                ShapeCategory::SeamlessPipe,
                ShapeCategory::Nozzle,
                ShapeCategory::HemisphericalHead,
                ShapeCategory::EllipsoidalHead,
                ShapeCategory::ConicalSection,
            ],
            CategoryGroup::Plates => &[
                ShapeCategory::RectangularPlate,
                ShapeCategory::CircularPlate,
                ShapeCategory::AnnularPlate,
            ],
            CategoryGroup::Tubes => &[ShapeCategory::RolledTube, ShapeCategory::SeamlessPipe],
            CategoryGroup::Nozzles => &[ShapeCategory::Nozzle],
            CategoryGroup::Heads => &[ShapeCategory::HemisphericalHead, ShapeCategory::EllipsoidalHead],
            CategoryGroup::Cones => &[ShapeCategory::ConicalSection],
        }
    }

    pub fn contains(&self, category: ShapeCategory) -> bool {
        self.categories().contains(&category)
    }

    pub fn code_prefix(&self) -> &'static str {
        match self {
            CategoryGroup::All => "SHP",
            CategoryGroup::Plates => "PLT",
            CategoryGroup::Tubes => "TUB",
            CategoryGroup::Nozzles => "NOZ",
            CategoryGroup::Heads => "HED",
            CategoryGroup::Cones => "CON",
        }
    }

    /// The one concrete group a category belongs to
    pub fn group_of(category: ShapeCategory) -> CategoryGroup {
        CategoryGroup::GROUPS
            .into_iter()
            .find(|g| g.contains(category))
            .unwrap_or(CategoryGroup::All)
    }
}

/// Deterministic id for a catalog key
pub fn shape_id(key: &str) -> Uuid {
    Uuid::new_v5(&SHAPE_NAMESPACE, key.as_bytes())
}

/// Read-only view over a catalog
#[derive(Debug, Clone, Copy)]
pub struct ShapeRegistry<'a> {
    shapes: &'a [ShapeDefinition],
}

impl ShapeRegistry<'static> {
    /// Registry over the built-in catalog
    pub fn builtin() -> Self {
        ShapeRegistry {
            shapes: builtin_shapes(),
        }
    }
}

impl<'a> ShapeRegistry<'a> {
    pub fn new(shapes: &'a [ShapeDefinition]) -> Self {
        ShapeRegistry { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Stamped clones of every shape in `group`, in catalog order
    pub fn shapes_in(&self, group: CategoryGroup) -> Vec<ShapeDefinition> {
        self.shapes
            .iter()
            .filter(|s| group.contains(s.category))
            .map(|s| self.stamp(s))
            .collect()
    }

    /// Same as [`shapes_in`](Self::shapes_in), parsing the group name first.
    pub fn shapes_by_group_name(&self, group: &str) -> CalcResult<Vec<ShapeDefinition>> {
        CategoryGroup::from_name(group).map(|g| self.shapes_in(g))
    }

    pub fn find(&self, key: &str) -> CalcResult<ShapeDefinition> {
        self.shapes
            .iter()
            .find(|s| s.key == key)
            .map(|s| self.stamp(s))
            .ok_or_else(|| CalcError::shape_not_found(key))
    }

    /// Concrete groups with the number of shapes in each
    pub fn groups(&self) -> Vec<(CategoryGroup, usize)> {
        CategoryGroup::GROUPS
            .into_iter()
            .map(|g| (g, self.shapes.iter().filter(|s| g.contains(s.category)).count()))
            .collect()
    }

    fn stamp(&self, shape: &ShapeDefinition) -> ShapeDefinition {
        let group = CategoryGroup::group_of(shape.category);
        let position = self
            .shapes
            .iter()
            .filter(|s| group.contains(s.category))
            .position(|s| s.key == shape.key)
            .unwrap_or(0)
            + 1;

        let mut stamped = shape.clone();
        stamped.id = Some(shape_id(&shape.key));
        stamped.code = Some(format!("{}-{:03}", group.code_prefix(), position));
        stamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_names() {
        assert_eq!(CategoryGroup::from_name("Plates").unwrap(), CategoryGroup::Plates);
        assert_eq!(CategoryGroup::from_name(" all ").unwrap(), CategoryGroup::All);
        let err = CategoryGroup::from_name("flanges").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_CATEGORY_GROUP");
    }

    #[test]
    fn test_every_category_has_one_group() {
        for category in CategoryGroup::All.categories() {
            let owners = CategoryGroup::GROUPS.iter().filter(|g| g.contains(*category)).count();
            assert_eq!(owners, 1, "{:?}", category);
        }
    }

    #[test]
    fn test_plates_are_stamped_in_order() {
        let registry = ShapeRegistry::builtin();
        let plates = registry.shapes_in(CategoryGroup::Plates);
        let codes: Vec<_> = plates.iter().map(|s| s.code.clone().unwrap()).collect();
        assert_eq!(codes, vec!["PLT-001", "PLT-002", "PLT-003"]);
        assert!(plates.iter().all(|s| s.id.is_some()));
    }

    #[test]
    fn test_stamping_is_deterministic() {
        let registry = ShapeRegistry::builtin();
        let first = registry.shapes_in(CategoryGroup::All);
        let second = registry.shapes_in(CategoryGroup::All);
        assert_eq!(first, second);

        // Code comes from the primary group, not from the filter used
        let tube = registry.find("seamless_pipe").unwrap();
        assert_eq!(tube.code.as_deref(), Some("TUB-002"));
        assert_eq!(tube.id, first.iter().find(|s| s.key == "seamless_pipe").unwrap().id);
    }

    #[test]
    fn test_catalog_is_not_mutated() {
        let registry = ShapeRegistry::builtin();
        let _ = registry.shapes_in(CategoryGroup::All);
        assert!(builtin_shapes().iter().all(|s| s.id.is_none() && s.code.is_none()));
    }

    #[test]
    fn test_find_unknown_key() {
        let err = ShapeRegistry::builtin().find("teapot").unwrap_err();
        assert_eq!(err, CalcError::shape_not_found("teapot"));
    }

    #[test]
    fn test_group_counts() {
        let counts = ShapeRegistry::builtin().groups();
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, builtin_shapes().len());
        assert_eq!(counts[0], (CategoryGroup::Plates, 3));
    }

    #[test]
    fn test_custom_catalog() {
        let shapes = vec![ShapeDefinition::new("x", "X", ShapeCategory::Nozzle)];
        let registry = ShapeRegistry::new(&shapes);
        assert_eq!(registry.shapes_by_group_name("nozzles").unwrap().len(), 1);
        assert!(registry.shapes_by_group_name("tubes").unwrap().is_empty());
        assert!(registry.shapes_by_group_name("nope").is_err());
    }
}
