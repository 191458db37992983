//! CLI configuration

use anyhow::Context;
use prodstruct_convert::ConverterConfig;
use prodstruct_storage::StorageConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration file
///
/// ```toml
/// [converter]
/// persist_recipes = true
///
/// [[storage.type]]
/// target_type = "NeedleType"
/// properties = [{ property = "Length", slot = "Float1" }]
///
/// [log]
/// filter = "prodstruct_convert=debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Conversion options
    pub converter: ConverterConfig,
    /// Storage slot mappings
    pub storage: StorageConfig,
    /// Logging setup
    pub log: LogConfig,
}

impl CliConfig {
    /// # Errors
    /// Returns error on malformed TOML.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("malformed configuration")
    }

    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}
