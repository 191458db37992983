//! Storage mapping errors
//!
//! Configuration errors surface while building a mapper; data-contract
//! errors surface while mapping values and are never resolved by truncation.

use crate::predicate::CompareOp;
use crate::slots::{SlotId, SlotKind};
use prodstruct_model::PropertyError;

/// Errors of the generic storage mapping
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    /// Declared property has no slot assigned
    #[error("`{type_tag}.{property}` has no storage slot assigned")]
    MissingSlot { type_tag: String, property: String },

    /// Assigned slot cannot hold the declared kind
    #[error("`{type_tag}.{property}` of kind {kind} cannot be stored in {slot}")]
    IncompatibleSlot {
        type_tag: String,
        property: String,
        kind: &'static str,
        slot: SlotId,
    },

    /// Two properties share one slot
    #[error("slot {slot} of `{type_tag}` is assigned to `{first}` and `{second}`")]
    SlotCollision {
        type_tag: String,
        slot: SlotId,
        first: String,
        second: String,
    },

    /// Configuration names a property the type does not declare
    #[error("`{type_tag}` has a slot for undeclared property `{property}`")]
    UndeclaredProperty { type_tag: String, property: String },

    /// Configuration maps one property twice
    #[error("`{type_tag}.{property}` is mapped more than once")]
    DuplicateMapping { type_tag: String, property: String },

    /// No configuration for a type that declares properties
    #[error("no storage mapping configured for `{0}`")]
    MissingTypeConfig(String),

    /// Automatic allocation ran out of slots
    #[error("`{type_tag}` needs more than the available {kind} slots")]
    SlotsExhausted { type_tag: String, kind: SlotKind },

    /// Configuration text could not be parsed
    #[error("invalid storage configuration: {0}")]
    Config(String),

    /// Stored or queried value violates the declared kind
    #[error("value for `{property}` in {slot} violates its declared kind: {source}")]
    DataContract {
        property: String,
        slot: SlotId,
        #[source]
        source: PropertyError,
    },

    /// Slot holds a value of another primitive kind
    #[error("slot {slot} holds a {found} value")]
    SlotKindMismatch { slot: SlotId, found: SlotKind },

    /// Predicate references a property without a slot
    #[error("predicate references unmapped property `{0}`")]
    UnknownProperty(String),

    /// Operator does not apply to the property's kind
    #[error("operator {op:?} cannot be applied to `{property}`")]
    UnsupportedOperator { property: String, op: CompareOp },
}

impl MappingError {
    /// True for errors raised while building a mapper
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingSlot { .. }
                | Self::IncompatibleSlot { .. }
                | Self::SlotCollision { .. }
                | Self::UndeclaredProperty { .. }
                | Self::DuplicateMapping { .. }
                | Self::MissingTypeConfig(_)
                | Self::SlotsExhausted { .. }
                | Self::Config(_)
        )
    }
}
