//! Conversion errors
//!
//! Partial success is never reported: any error leaves the target product and
//! the collaborators as they were before the call.

use prodstruct_model::PropertyError;
use std::fmt;

/// Kind of entity a collaborator failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Product,
    Recipe,
    Workplan,
    ProductType,
    RecipeType,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Product => "product",
            Self::Recipe => "recipe",
            Self::Workplan => "workplan",
            Self::ProductType => "product type",
            Self::RecipeType => "recipe type",
        };
        f.write_str(name)
    }
}

/// Incoming transfer model that cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    /// Single-valued connector received more than one part model
    #[error("connector `{connector}` is single-valued but received {count} parts")]
    MultipleSingleParts { connector: String, count: usize },

    /// Classification code outside the known base kinds
    #[error("recipe classification {0} is out of range")]
    ClassificationOutOfRange(i64),

    /// Connector name is not a declared part-link property
    #[error("`{type_tag}` has no part link `{connector}`")]
    UnknownConnector { type_tag: String, connector: String },

    /// `IsCollection` disagrees with the declared cardinality
    #[error("connector `{connector}` declares collection={declared}, model says {received}")]
    ConnectorKindMismatch {
        connector: String,
        declared: bool,
        received: bool,
    },

    /// File model names an undeclared file property
    #[error("`{type_tag}` has no file property `{property}`")]
    UnknownFileProperty { type_tag: String, property: String },

    /// Linked product is not assignable to the connector's target type
    #[error("connector `{connector}` expects `{expected}`, got `{found}`")]
    PartTypeMismatch {
        connector: String,
        expected: String,
        found: String,
    },

    /// Part model references a product that was never saved
    #[error("part in connector `{connector}` references an unsaved product")]
    MissingPartProduct { connector: String },

    /// Model type tag disagrees with the target product
    #[error("model of type `{found}` cannot be applied to `{expected}`")]
    ProductTypeMismatch { expected: String, found: String },
}

/// Errors of the conversion engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// Collaborator has no entity with this id or tag
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    /// Tag resolves to more than one registered type
    #[error("type tag `{tag}` is ambiguous: {matches:?}")]
    AmbiguousType { tag: String, matches: Vec<String> },

    /// Incoming model violates the transfer contract
    #[error("contract violation: {0}")]
    ContractViolation(#[from] ContractViolation),

    /// Declared property could not be updated
    #[error("cannot update property `{property}`: {source}")]
    PropertyUpdate {
        property: String,
        #[source]
        source: PropertyError,
    },

    /// Collaborator backend failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl ConvertError {
    /// Missing entity of `entity` kind
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True if the incoming model, not the environment, is at fault
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation(_) | Self::PropertyUpdate { .. })
    }
}
