//! Converter facade

use crate::collaborators::{ProductLoader, RecipeStore, WorkplanLoader};
use crate::config::ConverterConfig;
use crate::decoder::GraphDecoder;
use crate::encoder::{encode_type_definition, GraphEncoder};
use crate::error::{ConvertError, EntityKind};
use crate::recipe_codec::{encode_workplan, RecipeCodec};
use crate::reconciler::CollectionReconciler;
use prodstruct_model::{
    ProductId, ProductType, ProductTypeDefinition, Recipe, TypeMetadataRegistry, Workplan,
};
use prodstruct_transfer::{ProductDefinitionModel, ProductModel, RecipeModel, WorkplanModel};
use std::sync::Arc;

/// Entry point for converting products, recipes, workplans and type
/// definitions to and from transfer models
pub struct ProductConverter {
    registry: Arc<TypeMetadataRegistry>,
    loader: Arc<dyn ProductLoader>,
    recipes: Arc<dyn RecipeStore>,
    workplans: Arc<dyn WorkplanLoader>,
    config: ConverterConfig,
}

impl ProductConverter {
    /// Converter over a registry and its collaborators
    pub fn new(
        registry: Arc<TypeMetadataRegistry>,
        loader: Arc<dyn ProductLoader>,
        recipes: Arc<dyn RecipeStore>,
        workplans: Arc<dyn WorkplanLoader>,
    ) -> Self {
        Self {
            registry,
            loader,
            recipes,
            workplans,
            config: ConverterConfig::default(),
        }
    }

    /// Replace the conversion options
    #[must_use]
    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    /// Conversion options in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Type registry used for lookups
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeMetadataRegistry> {
        &self.registry
    }

    fn codec(&self) -> RecipeCodec<'_> {
        RecipeCodec::new(&self.registry, self.recipes.as_ref(), self.workplans.as_ref())
            .with_config(self.config)
    }

    fn encoder(&self) -> GraphEncoder<'_> {
        GraphEncoder::new(self.recipes.as_ref(), self.codec())
    }

    fn decoder(&self) -> GraphDecoder<'_> {
        let reconciler = CollectionReconciler::new(&self.registry, self.loader.as_ref());
        GraphDecoder::new(self.recipes.as_ref(), self.codec(), reconciler).with_config(self.config)
    }

    /// Encode a product, see [`GraphEncoder::encode`]
    ///
    /// # Errors
    /// Returns error if the product's recipes cannot be loaded.
    pub fn encode_product(&self, product: &ProductType, flat: bool) -> Result<ProductModel, ConvertError> {
        self.encoder().encode(product, flat)
    }

    /// Load a product through the product loader and encode it
    ///
    /// # Errors
    /// Returns [`ConvertError::NotFound`] for an unknown id.
    pub fn encode_product_by_id(&self, id: ProductId, flat: bool) -> Result<ProductModel, ConvertError> {
        let product = self.loader.load_type(id)?;
        self.encode_product(&product, flat)
    }

    /// Apply a product model, see [`GraphDecoder::decode`]
    ///
    /// # Errors
    /// Returns the first error met; nothing is changed in that case.
    pub fn decode_product(&self, model: &ProductModel, product: &mut ProductType) -> Result<(), ConvertError> {
        self.decoder().decode(model, product)
    }

    /// Encode a recipe with its declared properties
    #[must_use]
    pub fn encode_recipe(&self, recipe: &Recipe) -> RecipeModel {
        self.codec().encode_recipe(recipe)
    }

    /// Resolve and decode a recipe model for `owner`
    ///
    /// The recipe is returned, not saved.
    ///
    /// # Errors
    /// Returns error if the recipe or its workplan cannot be resolved or the
    /// model is invalid.
    pub fn decode_recipe(&self, model: &RecipeModel, owner: &ProductType) -> Result<Recipe, ConvertError> {
        let codec = self.codec();
        let mut recipe = codec.resolve(model)?;
        codec.decode_recipe(model, &mut recipe, owner.id)?;
        Ok(recipe)
    }

    /// Encode a workplan summary
    #[must_use]
    pub fn encode_workplan(&self, workplan: &Workplan) -> WorkplanModel {
        encode_workplan(workplan)
    }

    /// Resolve a product type by tag
    ///
    /// Falls back to a case-insensitive match when no type carries the exact
    /// tag.
    ///
    /// # Errors
    /// Returns [`ConvertError::NotFound`] if nothing matches and
    /// [`ConvertError::AmbiguousType`] if several types match.
    pub fn resolve_type(&self, tag: &str) -> Result<&Arc<ProductTypeDefinition>, ConvertError> {
        if let Ok(definition) = self.registry.resolve_type_by_tag(tag) {
            return Ok(definition);
        }
        let matches: Vec<_> = self
            .registry
            .product_types()
            .filter(|d| d.tag.eq_ignore_ascii_case(tag))
            .collect();
        match matches.as_slice() {
            [definition] => Ok(*definition),
            [] => Err(ConvertError::not_found(EntityKind::ProductType, tag)),
            many => Err(ConvertError::AmbiguousType {
                tag: tag.to_string(),
                matches: many.iter().map(|d| d.tag.clone()).collect(),
            }),
        }
    }

    /// Describe a registered product type
    ///
    /// # Errors
    /// See [`ProductConverter::resolve_type`].
    pub fn encode_type_definition(&self, tag: &str) -> Result<ProductDefinitionModel, ConvertError> {
        Ok(encode_type_definition(self.resolve_type(tag)?))
    }

    /// Describe every registered product type
    #[must_use]
    pub fn encode_type_definitions(&self) -> Vec<ProductDefinitionModel> {
        self.registry
            .product_types()
            .map(|d| encode_type_definition(d))
            .collect()
    }

    /// Fresh, unsaved product of a type resolved by [`ProductConverter::resolve_type`]
    ///
    /// # Errors
    /// See [`ProductConverter::resolve_type`].
    pub fn instantiate(&self, tag: &str) -> Result<ProductType, ConvertError> {
        Ok(self.resolve_type(tag)?.instantiate())
    }
}
