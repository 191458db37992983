//! prodstruct conversion engine
//!
//! Converts a typed product-structure graph into flat, tree-shaped transfer
//! models and applies edited transfer models back onto the graph.
//!
//! # Core Concepts
//!
//! - [`GraphEncoder`]: product graph → [`ProductModel`](prodstruct_transfer::ProductModel), one level deep
//! - [`RecipeCodec`]: recipes ↔ recipe models, classification and workplans
//! - [`CollectionReconciler`]: identity-based merge of part-link collections
//! - [`GraphDecoder`]: atomic application of a product model
//! - [`ProductConverter`]: facade over the above and the collaborators
//! - [`MemoryStore`]: in-memory [`ProductLoader`], [`RecipeStore`] and [`WorkplanLoader`]
//!
//! # Example
//!
//! ```rust,ignore
//! let store = Arc::new(MemoryStore::new());
//! let converter = ProductConverter::new(registry, store.clone(), store.clone(), store.clone());
//!
//! let watch = store.load_type(ProductId::new(7))?;
//! let mut model = converter.encode_product(&watch, false)?;
//! model.name = "Chronograph".into();
//!
//! let mut edited = (*watch).clone();
//! converter.decode_product(&model, &mut edited)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod collaborators;
mod config;
mod converter;
mod decoder;
mod encoder;
mod entries;
mod error;
mod memory;
mod recipe_codec;
mod reconciler;

pub use collaborators::{ProductLoader, RecipeStore, WorkplanLoader};
pub use config::ConverterConfig;
pub use converter::ProductConverter;
pub use decoder::GraphDecoder;
pub use encoder::GraphEncoder;
pub use entries::{apply_entries, encode_entry, encode_properties, encode_templates};
pub use error::{ContractViolation, ConvertError, EntityKind};
pub use memory::MemoryStore;
pub use recipe_codec::RecipeCodec;
pub use reconciler::{CollectionReconciler, ReconcileOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
