//! Storage mapping configuration
//!
//! ```toml
//! [[type]]
//! target_type = "WatchType"
//! properties = [
//!     { property = "Weight", slot = "Float1" },
//!     { property = "Color", slot = "Integer1" },
//! ]
//! ```

use crate::error::MappingError;
use crate::slots::{SlotId, SlotKind, SLOTS_PER_KIND};
use prodstruct_model::{PropertyDefinition, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Slot assignment of one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMapping {
    /// Declared property name
    pub property: String,
    /// Slot holding the property
    pub slot: SlotId,
}

/// Slot assignments of one concrete type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMappingConfig {
    /// Tag of the mapped product type
    pub target_type: String,
    /// Property to slot assignments
    #[serde(default)]
    pub properties: Vec<PropertyMapping>,
}

impl TypeMappingConfig {
    /// Assign the next free slot of the natural kind to every declared property
    ///
    /// Enums go to integer slots.
    ///
    /// # Errors
    /// Returns error if a kind runs out of slots.
    pub fn allocate(
        target_type: impl Into<String>,
        declared: &[PropertyDefinition],
    ) -> Result<Self, MappingError> {
        let target_type = target_type.into();
        let mut next: HashMap<SlotKind, u8> = HashMap::new();
        let mut properties = Vec::with_capacity(declared.len());
        for def in declared {
            let kind = natural_slot_kind(&def.kind);
            let counter = next.entry(kind).or_insert(0);
            *counter += 1;
            let slot = SlotId::new(kind, *counter).map_err(|_| MappingError::SlotsExhausted {
                type_tag: target_type.clone(),
                kind,
            })?;
            properties.push(PropertyMapping {
                property: def.name.clone(),
                slot,
            });
        }
        Ok(Self {
            target_type,
            properties,
        })
    }

    /// Slot assigned to `property`
    #[must_use]
    pub fn slot_of(&self, property: &str) -> Option<SlotId> {
        self.properties
            .iter()
            .find(|m| m.property == property)
            .map(|m| m.slot)
    }
}

/// Default slot kind for a declared kind
pub(crate) fn natural_slot_kind(kind: &ValueKind) -> SlotKind {
    match kind {
        ValueKind::Boolean => SlotKind::Boolean,
        ValueKind::Int32 | ValueKind::Int64 | ValueKind::Enum(_) => SlotKind::Integer,
        ValueKind::Float => SlotKind::Float,
        ValueKind::Text => SlotKind::Text,
        ValueKind::Binary => SlotKind::Binary,
    }
}

/// Slot assignments of every mapped type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Mappings, one per product type
    #[serde(default, rename = "type")]
    pub types: Vec<TypeMappingConfig>,
}

impl StorageConfig {
    /// Parse TOML configuration
    ///
    /// # Errors
    /// Returns [`MappingError::Config`] on malformed input or slot names.
    pub fn from_toml_str(text: &str) -> Result<Self, MappingError> {
        toml::from_str(text).map_err(|e| MappingError::Config(e.to_string()))
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns [`MappingError::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, MappingError> {
        toml::to_string(self).map_err(|e| MappingError::Config(e.to_string()))
    }

    /// Mapping of a product type
    #[must_use]
    pub fn for_type(&self, tag: &str) -> Option<&TypeMappingConfig> {
        self.types.iter().find(|t| t.target_type == tag)
    }

    /// Add or replace the configuration of one type
    pub fn upsert(&mut self, config: TypeMappingConfig) {
        match self
            .types
            .iter_mut()
            .find(|t| t.target_type == config.target_type)
        {
            Some(existing) => *existing = config,
            None => self.types.push(config),
        }
    }
}
