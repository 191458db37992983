//! Collaborator contracts
//!
//! The conversion engine never owns storage. Products, recipes and workplans
//! are loaded and saved through these traits; all calls are synchronous and
//! failures propagate unchanged.

use crate::error::ConvertError;
use prodstruct_model::{
    ClassificationKind, ProductId, ProductType, Recipe, RecipeId, Workplan, WorkplanId,
};
use std::sync::Arc;

/// Loads product snapshots by id
#[cfg_attr(test, mockall::automock)]
pub trait ProductLoader: Send + Sync {
    /// Load a product with its links
    ///
    /// # Errors
    /// Returns [`ConvertError::NotFound`] for an unknown id.
    fn load_type(&self, id: ProductId) -> Result<Arc<ProductType>, ConvertError>;
}

/// Loads and saves recipes
#[cfg_attr(test, mockall::automock)]
pub trait RecipeStore: Send + Sync {
    /// All recipes owned by a product
    ///
    /// # Errors
    /// Returns error on backend failure.
    fn get_all_by_product(&self, product_id: ProductId) -> Result<Vec<Recipe>, ConvertError>;

    /// Recipes of a product whose base kind is one of `kinds`
    ///
    /// Clones match on their base kind.
    ///
    /// # Errors
    /// Returns error on backend failure.
    fn get_by_classification(
        &self,
        product_id: ProductId,
        kinds: &[ClassificationKind],
    ) -> Result<Vec<Recipe>, ConvertError> {
        let mut recipes = self.get_all_by_product(product_id)?;
        recipes.retain(|r| kinds.contains(&r.classification.kind));
        Ok(recipes)
    }

    /// Recipe by id
    ///
    /// # Errors
    /// Returns [`ConvertError::NotFound`] for an unknown id.
    fn get(&self, id: RecipeId) -> Result<Recipe, ConvertError>;

    /// Save recipes of a product, returning their ids in input order
    ///
    /// Unsaved recipes receive fresh ids.
    ///
    /// # Errors
    /// Returns error on backend failure; nothing is saved in that case.
    fn save(&self, product_id: ProductId, recipes: &[Recipe]) -> Result<Vec<RecipeId>, ConvertError>;
}

/// Loads workplans referenced by recipes
#[cfg_attr(test, mockall::automock)]
pub trait WorkplanLoader: Send + Sync {
    /// Workplan by id
    ///
    /// # Errors
    /// Returns [`ConvertError::NotFound`] for an unknown id.
    fn load_workplan(&self, id: WorkplanId) -> Result<Workplan, ConvertError>;
}
