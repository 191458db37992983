//! Declared property storage
//!
//! [`PropertyBag`] holds exactly one value per declared property, in
//! declaration order. It can only be mutated through [`PropertyHost`], which
//! validates names against the declared set and coerces values.

use crate::definition::PropertyDefinition;
use crate::value::{PropertyError, PropertyValue};
use indexmap::IndexMap;

/// Values of the declared extension properties of one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag(IndexMap<String, PropertyValue>);

impl PropertyBag {
    /// Bag with every declared property at its type default
    #[must_use]
    pub fn with_defaults(declared: &[PropertyDefinition]) -> Self {
        Self(
            declared
                .iter()
                .map(|def| (def.name.clone(), def.kind.default_value()))
                .collect(),
        )
    }

    /// Current value of a property
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// Iterate `(name, value)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no property is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: &str, value: PropertyValue) {
        if let Some(slot) = self.0.get_mut(name) {
            *slot = value;
        }
    }
}

/// An entity with a declared set of extension properties
///
/// Implemented by products, part links and recipes so that property
/// encoding, decoding and storage mapping share one code path.
pub trait PropertyHost {
    /// Declared properties of the entity's concrete type
    fn declared_properties(&self) -> &[PropertyDefinition];

    /// Current values
    fn properties(&self) -> &PropertyBag;

    #[doc(hidden)]
    fn properties_mut(&mut self) -> &mut PropertyBag;

    /// Current value of a declared property
    #[inline]
    fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties().get(name)
    }

    /// Assign one declared property
    ///
    /// # Errors
    /// Returns error if the name is undeclared or the value does not coerce
    /// into the declared kind. The entity is unchanged on error.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        let def = self
            .declared_properties()
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| PropertyError::Undeclared(name.to_string()))?;
        let value = def.kind.coerce(value)?;
        self.properties_mut().insert(name, value);
        Ok(())
    }

    /// Assign several declared properties at once
    ///
    /// All values are validated before any is written.
    ///
    /// # Errors
    /// Returns the first failing property name with its error.
    fn set_properties(
        &mut self,
        values: Vec<(String, PropertyValue)>,
    ) -> Result<(), (String, PropertyError)> {
        let mut staged = Vec::with_capacity(values.len());
        for (name, value) in values {
            let Some(def) = self.declared_properties().iter().find(|d| d.name == name) else {
                return Err((name.clone(), PropertyError::Undeclared(name)));
            };
            match def.kind.coerce(value) {
                Ok(value) => staged.push((name, value)),
                Err(e) => return Err((name, e)),
            }
        }
        let bag = self.properties_mut();
        for (name, value) in staged {
            bag.insert(&name, value);
        }
        Ok(())
    }
}
