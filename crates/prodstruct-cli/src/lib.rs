//! prodstruct command line front end
//!
//! Loads a JSON catalog of type definitions, workplans and products into an
//! in-memory store and exposes the converter and the storage mapping as
//! subcommands.
//!
//! # Core Concepts
//!
//! - [`Catalog`]: serialized registry plus seed data
//! - [`CliConfig`]: TOML configuration (`[converter]`, `[[storage.type]]`, `[log]`)
//! - [`Session`]: loaded registry, store and converter the commands run against
//!
//! # Example
//!
//! ```rust,ignore
//! let config = CliConfig::from_path("prodstruct.toml")?;
//! let session = Catalog::from_path("catalog.json")?.load(config.converter)?;
//! println!("{}", commands::encode(&session, ProductId::new(7), false)?);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod catalog;
pub mod commands;
mod config;

pub use catalog::{Catalog, CatalogError, Session};
pub use config::{CliConfig, LogConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
