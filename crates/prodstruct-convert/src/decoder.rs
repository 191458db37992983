//! Transfer tree → product graph

use crate::collaborators::RecipeStore;
use crate::config::ConverterConfig;
use crate::entries::apply_entries;
use crate::error::{ContractViolation, ConvertError};
use crate::recipe_codec::RecipeCodec;
use crate::reconciler::CollectionReconciler;
use prodstruct_model::{LinkSlot, ProductIdentity, ProductType, Recipe};
use prodstruct_transfer::ProductModel;
use std::sync::Arc;

/// Applies a product model onto a product
///
/// All changes are staged on a copy; the product and the recipe store are
/// touched only once every part of the model has been applied.
#[derive(Clone, Copy)]
pub struct GraphDecoder<'a> {
    recipes: &'a dyn RecipeStore,
    codec: RecipeCodec<'a>,
    reconciler: CollectionReconciler<'a>,
    config: ConverterConfig,
}

impl<'a> GraphDecoder<'a> {
    /// Decoder saving recipes into `recipes`
    pub fn new(
        recipes: &'a dyn RecipeStore,
        codec: RecipeCodec<'a>,
        reconciler: CollectionReconciler<'a>,
    ) -> Self {
        Self {
            recipes,
            codec,
            reconciler,
            config: ConverterConfig::default(),
        }
    }

    /// Replace the conversion options
    #[must_use]
    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply `model` onto `product`
    ///
    /// Identity, name and state are always copied. A flat model stops there
    /// (recipes aside). Connectors with `Parts` absent are left untouched.
    /// Recipes are not saved while `product` is unsaved, since they would
    /// have no owner id; decode them again once the product has one.
    ///
    /// # Errors
    /// Returns the first error met; `product` and the recipe store are then
    /// unchanged.
    pub fn decode(&self, model: &ProductModel, product: &mut ProductType) -> Result<(), ConvertError> {
        tracing::info!("Decoding product {} ({})", model.id, product.type_tag());
        if !model.type_tag.is_empty() && model.type_tag != product.type_tag() {
            let violation = ContractViolation::ProductTypeMismatch {
                expected: product.type_tag().to_string(),
                found: model.type_tag.clone(),
            };
            tracing::warn!("Rejecting product model: {}", violation);
            return Err(violation.into());
        }

        let mut staged = product.clone();
        staged.identity = if model.identifier.is_empty() && model.revision == 0 {
            None
        } else {
            Some(ProductIdentity::new(model.identifier.clone(), model.revision))
        };
        staged.name.clone_from(&model.name);
        staged.state = model.state;

        let recipes = self.decode_recipes(model, &staged)?;

        if let Some(properties) = &model.properties {
            apply_entries(&mut staged, properties)?;
            decode_files(model, &mut staged)?;
            self.decode_parts(model, &mut staged)?;
        }

        if !recipes.is_empty() && self.config.persist_recipes {
            if staged.id.is_unsaved() {
                tracing::debug!(
                    "Product is unsaved, leaving {} recipe(s) unpersisted",
                    recipes.len()
                );
            } else {
                self.recipes.save(staged.id, &recipes)?;
            }
        }
        *product = staged;
        Ok(())
    }

    fn decode_recipes(
        &self,
        model: &ProductModel,
        owner: &ProductType,
    ) -> Result<Vec<Recipe>, ConvertError> {
        let Some(models) = &model.recipes else {
            return Ok(Vec::new());
        };
        models
            .iter()
            .map(|recipe_model| {
                let mut recipe = self.codec.resolve(recipe_model)?;
                self.codec.decode_recipe(recipe_model, &mut recipe, owner.id)?;
                Ok(recipe)
            })
            .collect()
    }

    fn decode_parts(&self, model: &ProductModel, staged: &mut ProductType) -> Result<(), ConvertError> {
        let definition = Arc::clone(staged.definition());
        for connector in model.parts.iter().flatten() {
            let Some(parts) = &connector.parts else {
                continue;
            };
            let Some(def) = definition.part_link(&connector.name) else {
                let violation = ContractViolation::UnknownConnector {
                    type_tag: definition.tag.clone(),
                    connector: connector.name.clone(),
                };
                tracing::warn!("Rejecting connector: {}", violation);
                return Err(violation.into());
            };
            if def.is_collection() != connector.is_collection {
                let violation = ContractViolation::ConnectorKindMismatch {
                    connector: connector.name.clone(),
                    declared: def.is_collection(),
                    received: connector.is_collection,
                };
                tracing::warn!("Rejecting connector: {}", violation);
                return Err(violation.into());
            }
            match staged.link_mut(&def.name) {
                Some(LinkSlot::Collection(links)) => {
                    self.reconciler.reconcile(links, parts, def)?;
                }
                Some(LinkSlot::Single(link)) => {
                    self.reconciler.reconcile_single(link, parts, def)?;
                }
                None => {
                    return Err(ContractViolation::UnknownConnector {
                        type_tag: definition.tag.clone(),
                        connector: connector.name.clone(),
                    }
                    .into())
                }
            }
        }
        Ok(())
    }
}

fn decode_files(model: &ProductModel, staged: &mut ProductType) -> Result<(), ConvertError> {
    for file_model in model.file_models.iter().flatten() {
        staged
            .set_file(&file_model.property_name, file_model.to_file())
            .map_err(|_| {
                let violation = ContractViolation::UnknownFileProperty {
                    type_tag: staged.type_tag().to_string(),
                    property: file_model.property_name.clone(),
                };
                tracing::warn!("Rejecting file model: {}", violation);
                violation
            })?;
    }
    Ok(())
}
