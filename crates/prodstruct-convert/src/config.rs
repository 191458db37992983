//! Converter configuration

use serde::{Deserialize, Serialize};

/// Behaviour switches of [`ProductConverter`](crate::ProductConverter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Save decoded recipes through the recipe store
    pub persist_recipes: bool,
    /// Embed a workplan summary next to each recipe's workplan id
    pub include_workplan_models: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            persist_recipes: true,
            include_workplan_models: true,
        }
    }
}

impl ConverterConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether decoded recipes are saved
    #[must_use]
    pub fn with_persist_recipes(mut self, persist: bool) -> Self {
        self.persist_recipes = persist;
        self
    }

    /// Set whether recipes embed their workplan summary
    #[must_use]
    pub fn with_workplan_models(mut self, include: bool) -> Self {
        self.include_workplan_models = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ConverterConfig =
            serde_json::from_str(r#"{ "persist_recipes": false }"#).unwrap();
        assert_eq!(config, ConverterConfig::new().with_persist_recipes(false));
        assert!(config.include_workplan_models);
    }
}
