//! Type metadata registry
//!
//! Maps stable tags to type definitions. Tags are unique across product and
//! recipe types; duplicates are rejected while registering, so resolution by
//! tag can never be ambiguous at conversion time.

use crate::definition::{
    FileDefinition, PartLinkDefinition, ProductTypeDefinition, PropertyDefinition,
    RecipeTypeDefinition,
};
use crate::product::ProductType;
use crate::recipe::Recipe;
use crate::value::ValueKind;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Errors building or querying the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Tag already registered
    #[error("type tag `{0}` is already registered")]
    DuplicateTag(String),

    /// Tag does not resolve to a registered type
    #[error("type tag `{0}` does not resolve to a registered type")]
    UnknownTag(String),

    /// Two members of one type share a name
    #[error("`{type_tag}` declares member `{name}` more than once")]
    DuplicateMember { type_tag: String, name: String },

    /// Enum property without variants
    #[error("`{type_tag}.{property}` is an enum without variants")]
    EmptyEnum { type_tag: String, property: String },

    /// Part link targets an unregistered type
    #[error("`{type_tag}.{link}` targets unregistered type `{target}`")]
    UnknownTarget {
        type_tag: String,
        link: String,
        target: String,
    },

    /// Base type is not registered
    #[error("`{type_tag}` derives from unregistered type `{base}`")]
    UnknownBase { type_tag: String, base: String },

    /// Base chain loops back
    #[error("base type chain of `{0}` is cyclic")]
    CyclicBase(String),
}

/// Collects definitions and validates them into a [`TypeMetadataRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    products: IndexMap<String, ProductTypeDefinition>,
    recipes: IndexMap<String, RecipeTypeDefinition>,
}

impl RegistryBuilder {
    /// Empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product type
    ///
    /// # Errors
    /// Returns error on a duplicate tag, duplicate member names or an enum
    /// property without variants.
    pub fn register_product(mut self, def: ProductTypeDefinition) -> Result<Self, RegistryError> {
        self.check_tag(&def.tag)?;
        check_members(&def.tag, def.member_names())?;
        check_enums(&def.tag, &def.properties)?;
        for link in &def.part_links {
            check_enums(&def.tag, &link.link_type.properties)?;
        }
        self.products.insert(def.tag.clone(), def);
        Ok(self)
    }

    /// Register a recipe type
    ///
    /// # Errors
    /// Returns error on a duplicate tag or invalid properties.
    pub fn register_recipe(mut self, def: RecipeTypeDefinition) -> Result<Self, RegistryError> {
        self.check_tag(&def.tag)?;
        check_members(&def.tag, def.properties.iter().map(|p| p.name.as_str()))?;
        check_enums(&def.tag, &def.properties)?;
        self.recipes.insert(def.tag.clone(), def);
        Ok(self)
    }

    /// Resolve inheritance and cross references
    ///
    /// Derived types inherit the members of their base, base members first.
    ///
    /// # Errors
    /// Returns error on unknown bases or link targets, cyclic base chains,
    /// or members redeclared by a derived type.
    pub fn build(self) -> Result<TypeMetadataRegistry, RegistryError> {
        let mut resolved = IndexMap::with_capacity(self.products.len());
        for tag in self.products.keys() {
            let mut visiting = HashSet::new();
            self.resolve(tag, &mut resolved, &mut visiting)?;
        }
        // keep registration order
        let products = self
            .products
            .keys()
            .filter_map(|tag| resolved.get(tag).map(|def| (tag.clone(), Arc::clone(def))))
            .collect();
        let recipes = self
            .recipes
            .into_iter()
            .map(|(tag, def)| (tag, Arc::new(def)))
            .collect();
        Ok(TypeMetadataRegistry { products, recipes })
    }

    fn check_tag(&self, tag: &str) -> Result<(), RegistryError> {
        if self.products.contains_key(tag) || self.recipes.contains_key(tag) {
            return Err(RegistryError::DuplicateTag(tag.to_string()));
        }
        Ok(())
    }

    fn resolve(
        &self,
        tag: &str,
        resolved: &mut IndexMap<String, Arc<ProductTypeDefinition>>,
        visiting: &mut HashSet<String>,
    ) -> Result<Arc<ProductTypeDefinition>, RegistryError> {
        if let Some(def) = resolved.get(tag) {
            return Ok(Arc::clone(def));
        }
        if !visiting.insert(tag.to_string()) {
            return Err(RegistryError::CyclicBase(tag.to_string()));
        }
        let own = self
            .products
            .get(tag)
            .ok_or_else(|| RegistryError::UnknownTag(tag.to_string()))?;

        let mut merged = own.clone();
        if let Some(base_tag) = &own.base {
            if !self.products.contains_key(base_tag) {
                return Err(RegistryError::UnknownBase {
                    type_tag: tag.to_string(),
                    base: base_tag.clone(),
                });
            }
            let base = self.resolve(base_tag, resolved, visiting)?;
            merged.properties = inherit(&base.properties, &own.properties);
            merged.part_links = inherit(&base.part_links, &own.part_links);
            merged.files = inherit::<FileDefinition>(&base.files, &own.files);
            check_members(tag, merged.member_names())?;
        }

        for link in &merged.part_links {
            if !self.products.contains_key(&link.target) {
                return Err(RegistryError::UnknownTarget {
                    type_tag: tag.to_string(),
                    link: link.name.clone(),
                    target: link.target.clone(),
                });
            }
        }

        let merged = Arc::new(merged);
        resolved.insert(tag.to_string(), Arc::clone(&merged));
        Ok(merged)
    }
}

fn inherit<T: Clone>(base: &[T], own: &[T]) -> Vec<T> {
    base.iter().chain(own).cloned().collect()
}

fn check_members<'a>(
    type_tag: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RegistryError::DuplicateMember {
                type_tag: type_tag.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_enums(type_tag: &str, properties: &[PropertyDefinition]) -> Result<(), RegistryError> {
    for p in properties {
        if matches!(&p.kind, ValueKind::Enum(variants) if variants.is_empty()) {
            return Err(RegistryError::EmptyEnum {
                type_tag: type_tag.to_string(),
                property: p.name.clone(),
            });
        }
    }
    Ok(())
}

/// Registration-time metadata table for every concrete type
#[derive(Debug, Clone, Default)]
pub struct TypeMetadataRegistry {
    products: IndexMap<String, Arc<ProductTypeDefinition>>,
    recipes: IndexMap<String, Arc<RecipeTypeDefinition>>,
}

impl TypeMetadataRegistry {
    /// Builder for a new registry
    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolve a product type by its tag
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownTag`] if no type carries the tag.
    pub fn resolve_type_by_tag(
        &self,
        tag: &str,
    ) -> Result<&Arc<ProductTypeDefinition>, RegistryError> {
        self.products
            .get(tag)
            .ok_or_else(|| RegistryError::UnknownTag(tag.to_string()))
    }

    /// Resolve a recipe type by its tag
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownTag`] if no recipe type carries the tag.
    pub fn resolve_recipe_type(
        &self,
        tag: &str,
    ) -> Result<&Arc<RecipeTypeDefinition>, RegistryError> {
        self.recipes
            .get(tag)
            .ok_or_else(|| RegistryError::UnknownTag(tag.to_string()))
    }

    /// # Errors
    /// Returns error if the tag is unknown.
    pub fn declared_properties(&self, tag: &str) -> Result<&[PropertyDefinition], RegistryError> {
        Ok(&self.resolve_type_by_tag(tag)?.properties)
    }

    /// # Errors
    /// Returns error if the tag is unknown.
    pub fn declared_part_links(&self, tag: &str) -> Result<&[PartLinkDefinition], RegistryError> {
        Ok(&self.resolve_type_by_tag(tag)?.part_links)
    }

    /// # Errors
    /// Returns error if the tag is unknown.
    pub fn declared_files(&self, tag: &str) -> Result<&[FileDefinition], RegistryError> {
        Ok(&self.resolve_type_by_tag(tag)?.files)
    }

    /// Construct a fresh product of the tagged type
    ///
    /// # Errors
    /// Returns error if the tag is unknown.
    pub fn instantiate(&self, tag: &str) -> Result<ProductType, RegistryError> {
        Ok(self.resolve_type_by_tag(tag)?.instantiate())
    }

    /// Construct a fresh recipe of the tagged type
    ///
    /// # Errors
    /// Returns error if the tag is unknown.
    pub fn instantiate_recipe(&self, tag: &str) -> Result<Recipe, RegistryError> {
        Ok(self.resolve_recipe_type(tag)?.instantiate())
    }

    /// True if `tag` is `target` or derives from it
    #[must_use]
    pub fn is_assignable(&self, tag: &str, target: &str) -> bool {
        let mut current = Some(tag);
        // chains are acyclic after build
        while let Some(t) = current {
            if t == target {
                return true;
            }
            current = self.products.get(t).and_then(|d| d.base.as_deref());
        }
        false
    }

    /// Registered product types in registration order
    pub fn product_types(&self) -> impl Iterator<Item = &Arc<ProductTypeDefinition>> {
        self.products.values()
    }

    /// Registered recipe types in registration order
    pub fn recipe_types(&self) -> impl Iterator<Item = &Arc<RecipeTypeDefinition>> {
        self.recipes.values()
    }

    /// Number of registered product types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len() + self.recipes.len()
    }

    /// True when no product type is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.recipes.is_empty()
    }
}
