//! In-memory collaborators
//!
//! Reference implementation of [`ProductLoader`], [`RecipeStore`] and
//! [`WorkplanLoader`] backed by concurrent maps. Ids come from one shared
//! sequence, so products, links, recipes and workplans never collide.

use crate::collaborators::{ProductLoader, RecipeStore, WorkplanLoader};
use crate::error::{ConvertError, EntityKind};
use dashmap::DashMap;
use prodstruct_model::{
    LinkId, LinkSlot, PartLink, ProductId, ProductType, Recipe, RecipeId, Workplan, WorkplanId,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Concurrent in-memory product, recipe and workplan store
#[derive(Debug)]
pub struct MemoryStore {
    products: DashMap<ProductId, Arc<ProductType>>,
    recipes: DashMap<RecipeId, Recipe>,
    workplans: DashMap<WorkplanId, Workplan>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create new empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            recipes: DashMap::new(),
            workplans: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn reserve(&self, raw: i64) {
        self.next_id.fetch_max(raw + 1, Ordering::Relaxed);
    }

    /// Save a product snapshot, assigning ids to it and its unsaved links
    pub fn save_product(&self, mut product: ProductType) -> Arc<ProductType> {
        if product.id.is_unsaved() {
            product.id = ProductId::new(self.allocate());
        } else {
            self.reserve(product.id.get());
        }

        let names: Vec<String> = product
            .definition()
            .part_links
            .iter()
            .map(|l| l.name.clone())
            .collect();
        for name in names {
            match product.link_mut(&name) {
                Some(LinkSlot::Collection(links)) => {
                    links.iter_mut().for_each(|link| self.assign_link_id(link));
                }
                Some(LinkSlot::Single(Some(link))) => self.assign_link_id(link),
                Some(LinkSlot::Single(None)) | None => {}
            }
        }

        tracing::info!("Saved product {} ({})", product.id, product.type_tag());
        let product = Arc::new(product);
        self.products.insert(product.id, Arc::clone(&product));
        product
    }

    fn assign_link_id(&self, link: &mut PartLink) {
        if link.id.is_unsaved() {
            link.id = LinkId::new(self.allocate());
        } else {
            self.reserve(link.id.get());
        }
    }

    /// Save a workplan, assigning an id if unsaved
    pub fn save_workplan(&self, mut workplan: Workplan) -> WorkplanId {
        if workplan.id.is_unsaved() {
            workplan.id = WorkplanId::new(self.allocate());
        } else {
            self.reserve(workplan.id.get());
        }
        let id = workplan.id;
        self.workplans.insert(id, workplan);
        id
    }

    /// All products ordered by id
    #[must_use]
    pub fn products(&self) -> Vec<Arc<ProductType>> {
        let mut products: Vec<_> = self.products.iter().map(|e| Arc::clone(e.value())).collect();
        products.sort_by_key(|p| p.id);
        products
    }

    /// Number of stored products
    #[inline]
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Number of stored recipes
    #[inline]
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Number of stored workplans
    #[inline]
    #[must_use]
    pub fn workplan_count(&self) -> usize {
        self.workplans.len()
    }
}

impl ProductLoader for MemoryStore {
    fn load_type(&self, id: ProductId) -> Result<Arc<ProductType>, ConvertError> {
        self.products
            .get(&id)
            .map(|p| Arc::clone(p.value()))
            .ok_or_else(|| ConvertError::not_found(EntityKind::Product, id))
    }
}

impl RecipeStore for MemoryStore {
    fn get_all_by_product(&self, product_id: ProductId) -> Result<Vec<Recipe>, ConvertError> {
        let mut recipes: Vec<Recipe> = self
            .recipes
            .iter()
            .filter(|r| r.product == Some(product_id))
            .map(|r| r.value().clone())
            .collect();
        recipes.sort_by_key(|r| r.id);
        Ok(recipes)
    }

    fn get(&self, id: RecipeId) -> Result<Recipe, ConvertError> {
        self.recipes
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| ConvertError::not_found(EntityKind::Recipe, id))
    }

    fn save(&self, product_id: ProductId, recipes: &[Recipe]) -> Result<Vec<RecipeId>, ConvertError> {
        let staged: Vec<Recipe> = recipes
            .iter()
            .cloned()
            .map(|mut recipe| {
                if recipe.id.is_unsaved() {
                    recipe.id = RecipeId::new(self.allocate());
                } else {
                    self.reserve(recipe.id.get());
                }
                recipe.product.get_or_insert(product_id);
                recipe
            })
            .collect();

        let ids = staged.iter().map(|r| r.id).collect();
        for recipe in staged {
            tracing::info!("Recipe {} of product {} changed", recipe.id, product_id);
            self.recipes.insert(recipe.id, recipe);
        }
        Ok(ids)
    }
}

impl WorkplanLoader for MemoryStore {
    fn load_workplan(&self, id: WorkplanId) -> Result<Workplan, ConvertError> {
        self.workplans
            .get(&id)
            .map(|w| w.value().clone())
            .ok_or_else(|| ConvertError::not_found(EntityKind::Workplan, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodstruct_model::{
        ClassificationKind, LinkTypeDefinition, PartLinkDefinition, ProductTypeDefinition,
        RecipeClassification, RecipeTypeDefinition,
    };

    fn watch_definition() -> Arc<ProductTypeDefinition> {
        Arc::new(ProductTypeDefinition::new("WatchType").with_part_link(
            PartLinkDefinition::collection("Needles", "WatchType", LinkTypeDefinition::new("NeedlePart")),
        ))
    }

    #[test]
    fn save_product_assigns_ids() {
        let store = MemoryStore::new();
        let child = store.save_product(watch_definition().instantiate());
        let mut parent = watch_definition().instantiate();
        parent.add_part("Needles", Arc::clone(&child)).unwrap();

        let parent = store.save_product(parent);
        assert!(!parent.id.is_unsaved());
        assert_ne!(parent.id, child.id);
        let link_id = parent.link("Needles").unwrap().as_slice()[0].id;
        assert!(!link_id.is_unsaved());
        assert_eq!(store.load_type(parent.id).unwrap(), parent);
    }

    #[test]
    fn explicit_ids_are_reserved() {
        let store = MemoryStore::new();
        let mut product = watch_definition().instantiate();
        product.id = ProductId::new(40);
        store.save_product(product);
        let next = store.save_product(watch_definition().instantiate());
        assert_eq!(next.id, ProductId::new(41));
    }

    #[test]
    fn missing_entities_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.load_type(ProductId::new(3)),
            Err(ConvertError::NotFound { entity: EntityKind::Product, .. })
        ));
        assert!(matches!(
            store.load_workplan(WorkplanId::new(3)),
            Err(ConvertError::NotFound { entity: EntityKind::Workplan, .. })
        ));
    }

    #[test]
    fn recipes_are_grouped_by_product() {
        let store = MemoryStore::new();
        let recipe_type = Arc::new(RecipeTypeDefinition::new("SetupRecipe"));
        let ids = store
            .save(ProductId::new(7), &[recipe_type.instantiate(), recipe_type.instantiate()])
            .unwrap();
        store.save(ProductId::new(8), &[recipe_type.instantiate()]).unwrap();

        let owned = store.get_all_by_product(ProductId::new(7)).unwrap();
        assert_eq!(owned.iter().map(|r| r.id).collect::<Vec<_>>(), ids);
        assert_eq!(store.get(ids[0]).unwrap().product, Some(ProductId::new(7)));
        assert_eq!(store.recipe_count(), 3);
    }

    #[test]
    fn recipes_filter_by_base_kind() {
        let store = MemoryStore::new();
        let recipe_type = Arc::new(RecipeTypeDefinition::new("SetupRecipe"));
        let classified = |classification| {
            let mut recipe = recipe_type.instantiate();
            recipe.classification = classification;
            recipe
        };
        let ids = store
            .save(
                ProductId::new(7),
                &[
                    classified(RecipeClassification::new(ClassificationKind::Default)),
                    classified(RecipeClassification::clone_of(ClassificationKind::Alternative)),
                    classified(RecipeClassification::new(ClassificationKind::Part)),
                ],
            )
            .unwrap();
        store
            .save(
                ProductId::new(8),
                &[classified(RecipeClassification::new(ClassificationKind::Default))],
            )
            .unwrap();

        let picked = store
            .get_by_classification(
                ProductId::new(7),
                &[ClassificationKind::Default, ClassificationKind::Alternative],
            )
            .unwrap();
        assert_eq!(picked.iter().map(|r| r.id).collect::<Vec<_>>(), ids[..2].to_vec());
        assert!(store
            .get_by_classification(ProductId::new(7), &[ClassificationKind::Intermediate])
            .unwrap()
            .is_empty());
        assert!(store
            .get_by_classification(ProductId::new(7), &[])
            .unwrap()
            .is_empty());
    }
}
