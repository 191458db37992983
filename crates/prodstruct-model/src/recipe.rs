//! Recipes and workplans
//!
//! Classification is held as a tagged union `{kind, is_clone}`. The combined
//! bitmask exists only at the storage boundary ([`RecipeClassification::bits`]
//! and [`RecipeClassification::from_bits`]).

use crate::definition::{PropertyDefinition, RecipeTypeDefinition};
use crate::ids::{ProductId, RecipeId, WorkplanId};
use crate::property::{PropertyBag, PropertyHost};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Role of a recipe for its product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationKind {
    #[default]
    Unset,
    Default,
    Alternative,
    Intermediate,
    Part,
}

impl ClassificationKind {
    /// All kinds in wire order
    pub const ALL: [Self; 5] = [
        Self::Unset,
        Self::Default,
        Self::Alternative,
        Self::Intermediate,
        Self::Part,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Unset => 0x00,
            Self::Default => 0x01,
            Self::Alternative => 0x02,
            Self::Intermediate => 0x04,
            Self::Part => 0x08,
        }
    }
}

/// Recipe classification: base kind plus clone lineage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeClassification {
    /// Base kind
    pub kind: ClassificationKind,
    /// Set for recipes cloned from another one
    pub is_clone: bool,
}

impl RecipeClassification {
    /// Reserved combinator bit marking a clone
    pub const CLONE_BIT: u8 = 0x40;

    /// Original recipe of the given kind
    #[inline]
    #[must_use]
    pub const fn new(kind: ClassificationKind) -> Self {
        Self {
            kind,
            is_clone: false,
        }
    }

    /// Classification of a recipe cloned from one of `kind`
    #[inline]
    #[must_use]
    pub const fn clone_of(kind: ClassificationKind) -> Self {
        Self {
            kind,
            is_clone: true,
        }
    }

    /// Combined storage bitmask
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        if self.is_clone {
            self.kind.bit() | Self::CLONE_BIT
        } else {
            self.kind.bit()
        }
    }

    /// Parse a storage bitmask
    ///
    /// # Errors
    /// Returns error unless the mask is exactly one base kind, optionally
    /// combined with [`Self::CLONE_BIT`].
    pub fn from_bits(bits: u8) -> Result<Self, ClassificationBitsError> {
        let is_clone = bits & Self::CLONE_BIT != 0;
        let base = bits & !Self::CLONE_BIT;
        let kind = ClassificationKind::ALL
            .into_iter()
            .find(|k| k.bit() == base)
            .ok_or(ClassificationBitsError(bits))?;
        Ok(Self { kind, is_clone })
    }
}

/// Bitmask that does not describe a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid recipe classification bits {0:#04x}")]
pub struct ClassificationBitsError(pub u8);

/// Lifecycle state of a recipe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeState {
    #[default]
    New,
    Released,
    Revoked,
}

/// Lifecycle state of a workplan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkplanState {
    #[default]
    New,
    Released,
    Revoked,
}

/// Reusable process graph referenced by workplan-based recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workplan {
    /// Storage id
    pub id: WorkplanId,
    /// Display name
    pub name: String,
    /// Version number
    pub version: i32,
    /// Lifecycle state
    #[serde(default)]
    pub state: WorkplanState,
}

impl Workplan {
    /// New workplan in the `New` state
    #[must_use]
    pub fn new(id: WorkplanId, name: impl Into<String>, version: i32) -> Self {
        Self {
            id,
            name: name.into(),
            version,
            state: WorkplanState::New,
        }
    }
}

/// Process definition attached to a product
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    /// Storage id; `0` until saved
    pub id: RecipeId,
    /// Display name
    pub name: String,
    /// Revision number
    pub revision: i32,
    /// Lifecycle state
    pub state: RecipeState,
    /// Base kind and clone marker
    pub classification: RecipeClassification,
    /// Owning product, assigned once
    pub product: Option<ProductId>,
    workplan: Option<Workplan>,
    definition: Arc<RecipeTypeDefinition>,
    properties: PropertyBag,
}

impl Recipe {
    /// Fresh, unsaved recipe of the given type
    #[must_use]
    pub fn new(definition: Arc<RecipeTypeDefinition>) -> Self {
        let properties = PropertyBag::with_defaults(&definition.properties);
        Self {
            id: RecipeId::UNSAVED,
            name: String::new(),
            revision: 0,
            state: RecipeState::default(),
            classification: RecipeClassification::default(),
            product: None,
            workplan: None,
            definition,
            properties,
        }
    }

    /// Tag of the recipe type
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.definition.tag
    }

    /// Type metadata of this recipe
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &Arc<RecipeTypeDefinition> {
        &self.definition
    }

    /// True if the recipe type references a workplan
    #[inline]
    #[must_use]
    pub fn is_workplan_based(&self) -> bool {
        self.definition.workplan_based
    }

    /// Attached workplan, if any
    #[inline]
    #[must_use]
    pub fn workplan(&self) -> Option<&Workplan> {
        self.workplan.as_ref()
    }

    /// Attach or detach the workplan
    ///
    /// Ignored for recipe types that are not workplan based.
    pub fn set_workplan(&mut self, workplan: Option<Workplan>) {
        if self.definition.workplan_based {
            self.workplan = workplan;
        }
    }
}

impl PropertyHost for Recipe {
    fn declared_properties(&self) -> &[PropertyDefinition] {
        &self.definition.properties
    }

    fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clone_bit_combines_with_kind() {
        let c = RecipeClassification::clone_of(ClassificationKind::Part);
        assert_eq!(c.bits(), 0x48);
        assert_eq!(RecipeClassification::from_bits(0x48), Ok(c));
        assert_eq!(
            RecipeClassification::from_bits(0x02),
            Ok(RecipeClassification::new(ClassificationKind::Alternative))
        );
    }

    #[test]
    fn invalid_bit_patterns_rejected() {
        // two base kinds at once
        assert!(RecipeClassification::from_bits(0x03).is_err());
        assert!(RecipeClassification::from_bits(0x10).is_err());
        assert!(RecipeClassification::from_bits(0x80).is_err());
    }

    #[test]
    fn workplan_only_on_workplan_based_types() {
        let plain = Arc::new(RecipeTypeDefinition::new("SetupRecipe"));
        let mut recipe = plain.instantiate();
        recipe.set_workplan(Some(Workplan::new(WorkplanId::new(1), "Assembly", 1)));
        assert!(recipe.workplan().is_none());

        let wp = Arc::new(RecipeTypeDefinition::new("ProductionRecipe").workplan_based());
        let mut recipe = wp.instantiate();
        recipe.set_workplan(Some(Workplan::new(WorkplanId::new(1), "Assembly", 1)));
        assert_eq!(recipe.workplan().map(|w| w.id), Some(WorkplanId::new(1)));
    }

    proptest! {
        #[test]
        fn prop_bits_round_trip(kind_index in 0..5usize, is_clone in any::<bool>()) {
            let c = RecipeClassification { kind: ClassificationKind::ALL[kind_index], is_clone };
            prop_assert_eq!(RecipeClassification::from_bits(c.bits()), Ok(c));
        }
    }
}
