//! Type definitions
//!
//! A definition is the registration-time metadata table of one concrete type:
//! which extension properties, part links and file properties it declares.
//! Conversion code consults these tables instead of inspecting instances.

use crate::product::ProductType;
use crate::recipe::Recipe;
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Declared extension property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    /// Member name, unique within the type
    pub name: String,
    /// Name shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared value kind
    pub kind: ValueKind,
}

impl PropertyDefinition {
    /// Property of the given kind
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            kind,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Display name, falling back to the property name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Element type of a part-link property
///
/// Every link created for the property is an instance of this type and
/// carries its declared properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTypeDefinition {
    /// Element type tag
    pub tag: String,
    /// Properties carried by each link
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

impl LinkTypeDefinition {
    /// Link type without properties
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: Vec::new(),
        }
    }

    /// Declare a link property
    #[must_use]
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }
}

/// Single reference or ordered collection of links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    Single,
    Collection,
}

/// Declared part-link property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartLinkDefinition {
    /// Member name, unique within the type
    pub name: String,
    /// Name shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Tag of the product type the links point to
    pub target: String,
    /// Single link or collection
    pub cardinality: Cardinality,
    /// Element type of the links
    pub link_type: Arc<LinkTypeDefinition>,
}

impl PartLinkDefinition {
    /// Single-valued link property
    #[must_use]
    pub fn single(
        name: impl Into<String>,
        target: impl Into<String>,
        link_type: LinkTypeDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            target: target.into(),
            cardinality: Cardinality::Single,
            link_type: Arc::new(link_type),
        }
    }

    /// Collection link property
    #[must_use]
    pub fn collection(
        name: impl Into<String>,
        target: impl Into<String>,
        link_type: LinkTypeDefinition,
    ) -> Self {
        Self {
            cardinality: Cardinality::Collection,
            ..Self::single(name, target, link_type)
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Display name, falling back to the member name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// True for a collection of links
    #[inline]
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.cardinality == Cardinality::Collection
    }
}

/// Declared file-valued property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDefinition {
    /// Member name, unique within the type
    pub name: String,
    /// Name shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl FileDefinition {
    /// File property without display name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
        }
    }
}

/// Metadata table of one concrete product type
///
/// # Invariants (checked by the registry)
/// - `tag` is unique across all registered types
/// - member names are unique across properties, part links and files
/// - every part-link target and the base tag are registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeDefinition {
    /// Unique type tag
    pub tag: String,
    /// Name shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Tag of the base type; its members are inherited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Declared scalar properties
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    /// Declared part links
    #[serde(default)]
    pub part_links: Vec<PartLinkDefinition>,
    /// Declared file properties
    #[serde(default)]
    pub files: Vec<FileDefinition>,
}

impl ProductTypeDefinition {
    /// Type without members
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            display_name: None,
            base: None,
            properties: Vec::new(),
            part_links: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Inherit the members of `base`
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Declare a property
    #[must_use]
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    /// Declare a part link
    #[must_use]
    pub fn with_part_link(mut self, link: PartLinkDefinition) -> Self {
        self.part_links.push(link);
        self
    }

    /// Declare a file property
    #[must_use]
    pub fn with_file(mut self, file: FileDefinition) -> Self {
        self.files.push(file);
        self
    }

    /// Display name, falling back to the tag
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.tag)
    }

    /// Declared property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Declared part link by name
    #[must_use]
    pub fn part_link(&self, name: &str) -> Option<&PartLinkDefinition> {
        self.part_links.iter().find(|l| l.name == name)
    }

    /// Declared file property by name
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&FileDefinition> {
        self.files.iter().find(|f| f.name == name)
    }

    /// All member names in declaration order
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.part_links.iter().map(|l| l.name.as_str()))
            .chain(self.files.iter().map(|f| f.name.as_str()))
    }

    /// Construct a fresh, unsaved instance of this type
    #[must_use]
    pub fn instantiate(self: &Arc<Self>) -> ProductType {
        ProductType::new(Arc::clone(self))
    }
}

/// Metadata table of one concrete recipe type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeTypeDefinition {
    /// Unique recipe type tag
    pub tag: String,
    /// Name shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Recipes of this type reference a workplan
    #[serde(default)]
    pub workplan_based: bool,
    /// Declared properties
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

impl RecipeTypeDefinition {
    /// Recipe type without properties
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            display_name: None,
            workplan_based: false,
            properties: Vec::new(),
        }
    }

    /// Mark recipes of this type as workplan based
    #[must_use]
    pub fn workplan_based(mut self) -> Self {
        self.workplan_based = true;
        self
    }

    /// Declare a property
    #[must_use]
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    /// Construct a fresh, unsaved recipe of this type
    #[must_use]
    pub fn instantiate(self: &Arc<Self>) -> Recipe {
        Recipe::new(Arc::clone(self))
    }
}
