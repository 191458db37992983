//! prodstruct transfer models
//!
//! Wire representation exchanged with remote clients. Field names are
//! normative (`PascalCase`); optional sections are omitted when absent.
//!
//! A product model is either *flat* (identity fields only) or *full*
//! (`Properties`, `Files`, `FileModels`, `Recipes`, `Parts`). Products nested
//! inside a [`PartModel`] are always flat.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod entry;
mod models;

pub use entry::{Entry, EntryValue, EntryValueType};
pub use models::{
    PartConnector, PartModel, ProductDefinitionModel, ProductFileModel, ProductModel,
    RecipeClassificationModel, RecipeModel, WorkplanModel,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
