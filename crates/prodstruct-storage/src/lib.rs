//! prodstruct generic storage mapping
//!
//! Projects the declared properties of a concrete type onto untyped storage
//! slots, so that a storage engine only ever sees a fixed row layout of
//! integer, float, text, boolean and binary columns.
//!
//! # Core Concepts
//!
//! - [`StorageSlots`]: one generic row (`Integer1..8`, `Float1..8`, ...)
//! - [`StorageConfig`]: per type, which property lives in which slot
//! - [`EntityMapper`]: read/write/change detection for one concrete type
//! - [`Predicate`]: query AST, rewritten from properties to slots
//!
//! # Example
//!
//! ```rust,ignore
//! let config = StorageConfig::from_toml_str(r#"
//!     [[type]]
//!     target_type = "NeedleType"
//!     properties = [{ property = "Length", slot = "Float1" }]
//! "#)?;
//! let mapper = EntityMapper::for_type(needle_definition, &config)?;
//!
//! let mut row = StorageSlots::new();
//! mapper.write(&needle, &mut row)?;
//! assert!(!mapper.has_changed(&row, &needle)?);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod mapper;
mod predicate;
mod slots;

pub use config::{PropertyMapping, StorageConfig, TypeMappingConfig};
pub use error::MappingError;
pub use mapper::EntityMapper;
pub use predicate::{CompareOp, Predicate, PropertyComparison, SlotComparison};
pub use slots::{SlotId, SlotKind, SlotParseError, SlotValue, StorageSlots, SLOTS_PER_KIND};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
