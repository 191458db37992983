//! prodstruct domain model
//!
//! Polymorphic product-structure graph: product types, part links, recipes
//! and workplans, described by a registration-time metadata table instead of
//! runtime introspection.
//!
//! # Core Concepts
//!
//! - [`TypeMetadataRegistry`]: stable tag → type definition, built once
//! - [`ProductTypeDefinition`]: declared properties, part links and files of a type
//! - [`ProductType`]: a product instance carrying its definition
//! - [`PartLink`]: relation from a product to a child product
//! - [`Recipe`] / [`RecipeClassification`]: recipes with tagged-union classification
//! - [`PropertyValue`] / [`ValueKind`]: typed declared property values
//!
//! # Example
//!
//! ```rust,ignore
//! use prodstruct_model::{ProductTypeDefinition, PropertyDefinition, TypeMetadataRegistry, ValueKind};
//!
//! let registry = TypeMetadataRegistry::builder()
//!     .register_product(
//!         ProductTypeDefinition::new("NeedleType")
//!             .with_property(PropertyDefinition::new("Length", ValueKind::Float)),
//!     )?
//!     .build()?;
//!
//! let needle = registry.instantiate("NeedleType")?;
//! assert_eq!(needle.type_tag(), "NeedleType");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod definition;
mod ids;
mod product;
mod property;
mod recipe;
mod registry;
mod value;

pub use definition::{
    Cardinality, FileDefinition, LinkTypeDefinition, PartLinkDefinition, ProductTypeDefinition,
    PropertyDefinition, RecipeTypeDefinition,
};
pub use ids::{LinkId, ProductId, RecipeId, WorkplanId};
pub use product::{
    LinkSlot, PartLink, ProductFile, ProductIdentity, ProductState, ProductType, ProductTypeError,
};
pub use property::{PropertyBag, PropertyHost};
pub use recipe::{
    ClassificationBitsError, ClassificationKind, Recipe, RecipeClassification, RecipeState, Workplan,
    WorkplanState,
};
pub use registry::{RegistryBuilder, RegistryError, TypeMetadataRegistry};
pub use value::{PropertyError, PropertyValue, ValueKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
