//! Product graph → transfer tree

use crate::collaborators::RecipeStore;
use crate::entries::{encode_properties, encode_templates};
use crate::error::ConvertError;
use crate::recipe_codec::RecipeCodec;
use prodstruct_model::{PartLinkDefinition, ProductType, ProductTypeDefinition};
use prodstruct_transfer::{
    PartConnector, PartModel, ProductDefinitionModel, ProductFileModel, ProductModel,
};

/// Encodes products one structural level deep
///
/// Children behind part links are always encoded flat, so a transfer tree
/// never nests more than one product level.
#[derive(Clone, Copy)]
pub struct GraphEncoder<'a> {
    recipes: &'a dyn RecipeStore,
    codec: RecipeCodec<'a>,
}

impl<'a> GraphEncoder<'a> {
    /// Encoder loading recipes from `recipes`
    pub fn new(recipes: &'a dyn RecipeStore, codec: RecipeCodec<'a>) -> Self {
        Self { recipes, codec }
    }

    /// Encode a product
    ///
    /// A flat model carries identity fields only. A full model adds declared
    /// properties, files, recipes and one connector per part-link property.
    ///
    /// # Errors
    /// Returns error if the product's recipes cannot be loaded.
    pub fn encode(&self, product: &ProductType, flat: bool) -> Result<ProductModel, ConvertError> {
        tracing::info!(
            "Encoding product {} ({}, flat={})",
            product.id,
            product.type_tag(),
            flat
        );
        let mut model = encode_flat(product);
        if flat {
            return Ok(model);
        }

        model.properties = Some(encode_properties(product));
        model.files = Some(product.files().filter_map(|(_, f)| f.cloned()).collect());
        model.file_models = Some(
            product
                .files()
                .map(|(name, file)| ProductFileModel {
                    property_name: name.to_string(),
                    file_name: file.and_then(|f| f.name.clone()),
                    file_hash: file.and_then(|f| f.file_hash.clone()),
                    file_path: file.and_then(|f| f.file_path.clone()),
                    mime_type: file.and_then(|f| f.mime_type.clone()),
                })
                .collect(),
        );

        let recipes = if product.id.is_unsaved() {
            Vec::new()
        } else {
            self.recipes.get_all_by_product(product.id)?
        };
        model.recipes = Some(recipes.iter().map(|r| self.codec.encode_recipe(r)).collect());

        model.parts = Some(
            product
                .definition()
                .part_links
                .iter()
                .map(|def| encode_connector(product, def))
                .collect(),
        );
        Ok(model)
    }
}

/// Identity fields of a product
///
/// An absent identity encodes as empty identifier and revision `0`.
#[must_use]
pub(crate) fn encode_flat(product: &ProductType) -> ProductModel {
    let (identifier, revision) = product
        .identity
        .as_ref()
        .map_or((String::new(), 0), |i| (i.identifier.clone(), i.revision));
    ProductModel {
        id: product.id,
        type_tag: product.type_tag().to_string(),
        name: product.name.clone(),
        state: product.state,
        identifier,
        revision,
        ..ProductModel::default()
    }
}

fn encode_connector(product: &ProductType, def: &PartLinkDefinition) -> PartConnector {
    let parts = product
        .link(&def.name)
        .map(|slot| {
            slot.as_slice()
                .iter()
                .filter_map(|link| {
                    link.product().map(|child| PartModel {
                        id: link.id,
                        product: Some(encode_flat(child)),
                        properties: encode_properties(link),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    PartConnector {
        name: def.name.clone(),
        display_name: def.display_name().to_string(),
        type_tag: def.target.clone(),
        is_collection: def.is_collection(),
        parts: Some(parts),
        property_templates: encode_templates(&def.link_type.properties),
    }
}

/// Describe a product type with template entries for its properties
#[must_use]
pub(crate) fn encode_type_definition(definition: &ProductTypeDefinition) -> ProductDefinitionModel {
    ProductDefinitionModel {
        name: definition.tag.clone(),
        display_name: definition.display_name().to_string(),
        base_definition: definition.base.clone(),
        properties: encode_templates(&definition.properties),
    }
}
