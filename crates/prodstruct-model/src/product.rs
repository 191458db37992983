//! Product types and part links
//!
//! A [`ProductType`] instance carries the `Arc` of its definition, so every
//! conversion looks its metadata up by type identity. Links own their
//! properties but only share the child product: the child is an independently
//! owned snapshot handed out by the product store.

use crate::definition::{LinkTypeDefinition, ProductTypeDefinition, PropertyDefinition};
use crate::ids::{LinkId, ProductId};
use crate::property::{PropertyBag, PropertyHost};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier + revision of a product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductIdentity {
    /// Business identifier
    pub identifier: String,
    /// Revision of the identifier
    pub revision: i32,
}

impl ProductIdentity {
    /// Identity from identifier and revision
    #[inline]
    #[must_use]
    pub fn new(identifier: impl Into<String>, revision: i32) -> Self {
        Self {
            identifier: identifier.into(),
            revision,
        }
    }
}

impl std::fmt::Display for ProductIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.identifier, self.revision)
    }
}

/// Lifecycle state of a product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductState {
    #[default]
    Created,
    Released,
    Deprecated,
}

/// File attached to a product
///
/// A file with every field unset is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductFile {
    /// Original file name
    pub name: Option<String>,
    /// Content hash
    pub file_hash: Option<String>,
    /// Location in the file store
    pub file_path: Option<String>,
    /// Content type
    pub mime_type: Option<String>,
}

impl ProductFile {
    /// True when every field is unset
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.file_hash.is_none()
            && self.file_path.is_none()
            && self.mime_type.is_none()
    }
}

/// Relation from an owning product to a child product
#[derive(Debug, Clone, PartialEq)]
pub struct PartLink {
    /// Storage id; `0` until saved
    pub id: LinkId,
    product: Option<Arc<ProductType>>,
    link_type: Arc<LinkTypeDefinition>,
    properties: PropertyBag,
}

impl PartLink {
    /// Fresh, unsaved link of the given element type
    #[must_use]
    pub fn new(link_type: Arc<LinkTypeDefinition>) -> Self {
        let properties = PropertyBag::with_defaults(&link_type.properties);
        Self {
            id: LinkId::UNSAVED,
            product: None,
            link_type,
            properties,
        }
    }

    /// Set the link id
    #[must_use]
    pub fn with_id(mut self, id: LinkId) -> Self {
        self.id = id;
        self
    }

    /// Point the link at `product`
    #[must_use]
    pub fn with_product(mut self, product: Arc<ProductType>) -> Self {
        self.product = Some(product);
        self
    }

    /// Child product, if assigned
    #[inline]
    #[must_use]
    pub fn product(&self) -> Option<&Arc<ProductType>> {
        self.product.as_ref()
    }

    /// Id of the child product
    #[inline]
    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        self.product.as_ref().map(|p| p.id)
    }

    /// Replace the child product
    #[inline]
    pub fn set_product(&mut self, product: Option<Arc<ProductType>>) {
        self.product = product;
    }

    /// Element type of this link
    #[inline]
    #[must_use]
    pub fn link_type(&self) -> &Arc<LinkTypeDefinition> {
        &self.link_type
    }
}

impl PropertyHost for PartLink {
    fn declared_properties(&self) -> &[PropertyDefinition] {
        &self.link_type.properties
    }

    fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }
}

/// Current value of a part-link property
#[derive(Debug, Clone, PartialEq)]
pub enum LinkSlot {
    Single(Option<PartLink>),
    Collection(Vec<PartLink>),
}

impl LinkSlot {
    /// Currently held links
    #[must_use]
    pub fn as_slice(&self) -> &[PartLink] {
        match self {
            Self::Single(Some(link)) => std::slice::from_ref(link),
            Self::Single(None) => &[],
            Self::Collection(links) => links,
        }
    }

    /// True for a collection slot
    #[inline]
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

/// Errors addressing product members that are not declared
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductTypeError {
    #[error("`{type_tag}` declares no part link `{name}`")]
    UnknownPartLink { type_tag: String, name: String },

    #[error("`{type_tag}` declares no file property `{name}`")]
    UnknownFile { type_tag: String, name: String },
}

/// Polymorphic product node
///
/// # Invariants
/// - properties, link slots and file slots exist for exactly the members
///   declared by `definition`
/// - `id == ProductId::UNSAVED` until storage assigns one
#[derive(Debug, Clone, PartialEq)]
pub struct ProductType {
    /// Storage id; `0` until saved
    pub id: ProductId,
    /// Identifier and revision, if any
    pub identity: Option<ProductIdentity>,
    /// Display name
    pub name: String,
    /// Lifecycle state
    pub state: ProductState,
    definition: Arc<ProductTypeDefinition>,
    properties: PropertyBag,
    links: IndexMap<String, LinkSlot>,
    files: IndexMap<String, Option<ProductFile>>,
}

impl ProductType {
    /// Fresh instance with every declared member at its default
    #[must_use]
    pub fn new(definition: Arc<ProductTypeDefinition>) -> Self {
        let properties = PropertyBag::with_defaults(&definition.properties);
        let links = definition
            .part_links
            .iter()
            .map(|l| {
                let slot = if l.is_collection() {
                    LinkSlot::Collection(Vec::new())
                } else {
                    LinkSlot::Single(None)
                };
                (l.name.clone(), slot)
            })
            .collect();
        let files = definition
            .files
            .iter()
            .map(|f| (f.name.clone(), None))
            .collect();
        Self {
            id: ProductId::UNSAVED,
            identity: None,
            name: String::new(),
            state: ProductState::default(),
            definition,
            properties,
            links,
            files,
        }
    }

    /// Stable tag of the concrete type
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.definition.tag
    }

    /// Type metadata of this product
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &Arc<ProductTypeDefinition> {
        &self.definition
    }

    /// Part-link slot by name
    #[inline]
    #[must_use]
    pub fn link(&self, name: &str) -> Option<&LinkSlot> {
        self.links.get(name)
    }

    /// Mutable part-link slot by name
    #[inline]
    pub fn link_mut(&mut self, name: &str) -> Option<&mut LinkSlot> {
        self.links.get_mut(name)
    }

    /// Iterate part-link slots in declaration order
    pub fn links(&self) -> impl Iterator<Item = (&str, &LinkSlot)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attach `child` through the named part-link property
    ///
    /// Appends to a collection; replaces the link of a single-valued
    /// property.
    ///
    /// # Errors
    /// Returns error if the property is not declared.
    pub fn add_part(
        &mut self,
        link_name: &str,
        child: Arc<ProductType>,
    ) -> Result<&mut PartLink, ProductTypeError> {
        let link_type = self
            .definition
            .part_link(link_name)
            .map(|l| Arc::clone(&l.link_type))
            .ok_or_else(|| ProductTypeError::UnknownPartLink {
                type_tag: self.definition.tag.clone(),
                name: link_name.to_string(),
            })?;
        let link = PartLink::new(link_type).with_product(child);
        match self.links.get_mut(link_name) {
            Some(LinkSlot::Collection(links)) => {
                links.push(link);
                let last = links.len() - 1;
                Ok(&mut links[last])
            }
            Some(LinkSlot::Single(slot)) => Ok(slot.insert(link)),
            None => Err(ProductTypeError::UnknownPartLink {
                type_tag: self.definition.tag.clone(),
                name: link_name.to_string(),
            }),
        }
    }

    /// Attached file of a declared file property
    #[inline]
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&ProductFile> {
        self.files.get(name).and_then(Option::as_ref)
    }

    /// Iterate file slots in declaration order
    pub fn files(&self) -> impl Iterator<Item = (&str, Option<&ProductFile>)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Assign a file property; an empty file clears it
    ///
    /// # Errors
    /// Returns error if the file property is not declared.
    pub fn set_file(
        &mut self,
        name: &str,
        file: Option<ProductFile>,
    ) -> Result<(), ProductTypeError> {
        let slot = self
            .files
            .get_mut(name)
            .ok_or_else(|| ProductTypeError::UnknownFile {
                type_tag: self.definition.tag.clone(),
                name: name.to_string(),
            })?;
        *slot = file.filter(|f| !f.is_empty());
        Ok(())
    }
}

impl PropertyHost for ProductType {
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
    use crate::definition::{FileDefinition, PartLinkDefinition};
    use crate::value::{PropertyValue, ValueKind};

    fn definition() -> Arc<ProductTypeDefinition> {
        Arc::new(
            ProductTypeDefinition::new("WatchType")
                .with_property(PropertyDefinition::new("Weight", ValueKind::Float))
                .with_part_link(PartLinkDefinition::single(
                    "Face",
                    "FaceType",
                    LinkTypeDefinition::new("FacePart"),
                ))
                .with_part_link(PartLinkDefinition::collection(
                    "Needles",
                    "NeedleType",
                    LinkTypeDefinition::new("NeedlePart")
                        .with_property(PropertyDefinition::new("Position", ValueKind::Int32)),
                ))
                .with_file(FileDefinition::new("Manual")),
        )
    }

    fn child(id: i64) -> Arc<ProductType> {
        let def = Arc::new(ProductTypeDefinition::new("NeedleType"));
        let mut p = def.instantiate();
        p.id = ProductId::new(id);
        Arc::new(p)
    }

    #[test]
    fn instance_mirrors_definition() {
        let p = definition().instantiate();
        assert!(p.id.is_unsaved());
        assert_eq!(p.type_tag(), "WatchType");
        assert_eq!(p.property("Weight"), Some(&PropertyValue::Float(0.0)));
        assert_eq!(p.link("Face"), Some(&LinkSlot::Single(None)));
        assert!(p.link("Needles").is_some_and(LinkSlot::is_collection));
        assert!(p.file("Manual").is_none());
    }

    #[test]
    fn add_part_respects_cardinality() {
        let mut p = definition().instantiate();
        p.add_part("Needles", child(1)).unwrap();
        p.add_part("Needles", child(2)).unwrap();
        p.add_part("Face", child(3)).unwrap();
        p.add_part("Face", child(4)).unwrap();

        let needles: Vec<_> = p.link("Needles").unwrap().as_slice().iter().map(PartLink::product_id).collect();
        assert_eq!(needles, [Some(ProductId::new(1)), Some(ProductId::new(2))]);
        assert_eq!(p.link("Face").unwrap().as_slice().len(), 1);
        assert_eq!(p.link("Face").unwrap().as_slice()[0].product_id(), Some(ProductId::new(4)));
        assert!(p.add_part("Bezel", child(5)).is_err());
    }

    #[test]
    fn link_properties_use_link_type() {
        let mut p = definition().instantiate();
        let link = p.add_part("Needles", child(1)).unwrap();
        assert_eq!(link.property("Position"), Some(&PropertyValue::Integer(0)));
        link.set_property("Position", PropertyValue::Integer(2)).unwrap();
        assert!(link.set_property("Weight", PropertyValue::Float(1.0)).is_err());
    }

    #[test]
    fn empty_file_clears_slot() {
        let mut p = definition().instantiate();
        let manual = ProductFile {
            name: Some("manual.pdf".into()),
            ..ProductFile::default()
        };
        p.set_file("Manual", Some(manual.clone())).unwrap();
        assert_eq!(p.file("Manual"), Some(&manual));
        p.set_file("Manual", Some(ProductFile::default())).unwrap();
        assert!(p.file("Manual").is_none());
        assert!(p.set_file("Drawing", None).is_err());
    }
}
