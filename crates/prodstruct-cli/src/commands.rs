//! Subcommand implementations
//!
//! Each command returns its rendered output so that `main` only prints.

use crate::catalog::Session;
use anyhow::Context;
use prodstruct_convert::ProductLoader;
use prodstruct_model::ProductId;
use prodstruct_storage::{
    EntityMapper, Predicate, PropertyComparison, StorageConfig, StorageSlots, TypeMappingConfig,
};
use prodstruct_transfer::ProductModel;
use serde_json::{Map, Value};

/// Encode a stored product as JSON
///
/// # Errors
/// Returns error if the product is unknown.
pub fn encode(session: &Session, id: ProductId, flat: bool) -> anyhow::Result<String> {
    let model = session.converter.encode_product_by_id(id, flat)?;
    Ok(serde_json::to_string_pretty(&model)?)
}

/// Decode a product model, save the result and return its full encoding
///
/// A model with id `0` creates a new product of the model's type. Its
/// recipes are decoded once the product has been saved and has an id.
///
/// # Errors
/// Returns error on malformed JSON or if the model violates the contract;
/// the store is unchanged in that case.
pub fn apply(session: &Session, model_json: &str) -> anyhow::Result<String> {
    let model: ProductModel =
        serde_json::from_str(model_json).context("malformed product model")?;
    let mut product = if model.id.is_unsaved() {
        session.converter.instantiate(&model.type_tag)?
    } else {
        (*session.store.load_type(model.id)?).clone()
    };
    session
        .converter
        .decode_product(&model, &mut product)
        .with_context(|| format!("failed to apply model of product {}", model.id))?;
    let saved = session.store.save_product(product);
    if model.id.is_unsaved() && model.recipes.is_some() {
        let recipes_only = ProductModel {
            id: saved.id,
            properties: None,
            files: None,
            file_models: None,
            parts: None,
            ..model
        };
        let mut product = (*saved).clone();
        session
            .converter
            .decode_product(&recipes_only, &mut product)
            .with_context(|| format!("failed to apply recipes of product {}", saved.id))?;
    }
    tracing::info!("Applied model to product {}", saved.id);
    encode(session, saved.id, false)
}

/// Describe one product type, or all of them
///
/// # Errors
/// Returns error if the tag is unknown or ambiguous.
pub fn definitions(session: &Session, tag: Option<&str>) -> anyhow::Result<String> {
    let json = match tag {
        Some(tag) => serde_json::to_string_pretty(&session.converter.encode_type_definition(tag)?)?,
        None => serde_json::to_string_pretty(&session.converter.encode_type_definitions())?,
    };
    Ok(json)
}

/// Project a stored product onto its storage row
///
/// # Errors
/// Returns error if the product is unknown or the mapping is invalid.
pub fn slots(session: &Session, storage: &StorageConfig, id: ProductId) -> anyhow::Result<String> {
    let product = session.store.load_type(id)?;
    let mapper = EntityMapper::for_type(product.definition(), storage)?;
    let mut row = StorageSlots::new();
    mapper.write(product.as_ref(), &mut row)?;

    let mut columns = Map::new();
    for (property, slot) in mapper.slots() {
        let value = row.get(slot).map(serde_json::to_value).transpose()?;
        columns.insert(
            slot.to_string(),
            serde_json::json!({ "property": property, "value": value }),
        );
    }
    let out = serde_json::json!({
        "type": mapper.type_tag(),
        "id": product.id,
        "slots": Value::Object(columns),
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Rewrite a JSON property predicate into a predicate over storage slots
///
/// # Errors
/// Returns error on malformed JSON, an unknown type, or a comparison the
/// type's mapping cannot express.
pub fn rewrite(
    session: &Session,
    storage: &StorageConfig,
    tag: &str,
    predicate_json: &str,
) -> anyhow::Result<String> {
    let predicate: Predicate<PropertyComparison> =
        serde_json::from_str(predicate_json).context("malformed predicate")?;
    let definition = session.converter.resolve_type(tag)?;
    let mapper = EntityMapper::for_type(definition, storage)?;
    let rewritten = mapper.rewrite_predicate(&predicate)?;
    Ok(serde_json::to_string_pretty(&rewritten)?)
}

/// Storage layout of a product type as a `[[type]]` TOML table
///
/// The configured mapping is validated and returned when present; otherwise
/// one is allocated from the declared properties.
///
/// # Errors
/// Returns error if the tag is unknown or no valid mapping can be produced.
pub fn layout(session: &Session, storage: &StorageConfig, tag: &str) -> anyhow::Result<String> {
    let definition = session.converter.resolve_type(tag)?;
    let type_config = match storage.for_type(&definition.tag) {
        Some(existing) => {
            EntityMapper::new(&definition.tag, &definition.properties, existing)?;
            existing.clone()
        }
        None => TypeMappingConfig::allocate(&definition.tag, &definition.properties)?,
    };
    let mut out = StorageConfig::default();
    out.upsert(type_config);
    Ok(out.to_toml_string()?)
}
