//! Transfer models

use crate::entry::Entry;
use prodstruct_model::{
    LinkId, ProductFile, ProductId, ProductState, RecipeId, RecipeState, WorkplanId,
    WorkplanState,
};
use serde::{Deserialize, Serialize};

/// Product as seen by remote clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductModel {
    /// Storage id; `0` asks for a new product
    pub id: ProductId,
    /// Tag of the product type
    #[serde(rename = "Type")]
    pub type_tag: String,
    /// Display name
    pub name: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: ProductState,
    /// Business identifier
    #[serde(default)]
    pub identifier: String,
    /// Revision of the identifier
    #[serde(default)]
    pub revision: i32,
    /// Declared properties; `None` in a flat model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Entry>>,
    /// Attached files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ProductFile>>,
    /// File properties, including empty ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_models: Option<Vec<ProductFileModel>>,
    /// Owned recipes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipes: Option<Vec<RecipeModel>>,
    /// Part-link connectors; `None` in a flat model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<PartConnector>>,
}

impl ProductModel {
    /// Flat models carry no properties and are never expanded on decode
    #[inline]
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.properties.is_none()
    }

    /// Connector by property name
    #[must_use]
    pub fn connector(&self, name: &str) -> Option<&PartConnector> {
        self.parts.as_deref()?.iter().find(|c| c.name == name)
    }

    /// Mutable connector by name
    #[must_use]
    pub fn connector_mut(&mut self, name: &str) -> Option<&mut PartConnector> {
        self.parts.as_deref_mut()?.iter_mut().find(|c| c.name == name)
    }
}

/// One part link inside a connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartModel {
    /// `0` asks for a new link
    pub id: LinkId,
    /// Linked product; only its id is read on decode
    #[serde(default)]
    pub product: Option<ProductModel>,
    /// Link properties
    #[serde(default)]
    pub properties: Vec<Entry>,
}

/// Part-link property of a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartConnector {
    /// Part-link property name
    pub name: String,
    /// Name shown to users
    #[serde(default)]
    pub display_name: String,
    /// Tag of the targeted product type
    #[serde(rename = "Type")]
    pub type_tag: String,
    /// Declared as a collection
    #[serde(default)]
    pub is_collection: bool,
    /// `None` leaves the property untouched on decode
    #[serde(default)]
    pub parts: Option<Vec<PartModel>>,
    /// Link property templates
    #[serde(default)]
    pub property_templates: Vec<Entry>,
}

/// Base kind of a recipe classification on the wire
///
/// Codes outside the known range are kept as [`Self::Unknown`] so that the
/// decoder can reject them explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum RecipeClassificationModel {
    #[default]
    Unset,
    Default,
    Alternative,
    Intermediate,
    Part,
    Unknown(i64),
}

impl From<i64> for RecipeClassificationModel {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Unset,
            1 => Self::Default,
            2 => Self::Alternative,
            3 => Self::Intermediate,
            4 => Self::Part,
            other => Self::Unknown(other),
        }
    }
}

impl From<RecipeClassificationModel> for i64 {
    fn from(model: RecipeClassificationModel) -> Self {
        match model {
            RecipeClassificationModel::Unset => 0,
            RecipeClassificationModel::Default => 1,
            RecipeClassificationModel::Alternative => 2,
            RecipeClassificationModel::Intermediate => 3,
            RecipeClassificationModel::Part => 4,
            RecipeClassificationModel::Unknown(code) => code,
        }
    }
}

/// Recipe as seen by remote clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecipeModel {
    /// Storage id; `0` asks for a new recipe
    pub id: RecipeId,
    /// Display name
    pub name: String,
    /// Tag of the recipe type
    #[serde(rename = "Type")]
    pub type_tag: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: RecipeState,
    /// Revision number
    #[serde(default)]
    pub revision: i32,
    /// Base kind
    #[serde(default)]
    pub classification: RecipeClassificationModel,
    /// Cloned from another recipe
    #[serde(default)]
    pub is_clone: bool,
    /// Declared properties
    #[serde(default)]
    pub properties: Vec<Entry>,
    /// Referenced workplan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workplan_id: Option<WorkplanId>,
    /// Workplan summary, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workplan_model: Option<WorkplanModel>,
}

/// Workplan summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkplanModel {
    /// Storage id
    pub id: WorkplanId,
    /// Display name
    pub name: String,
    /// Version number
    pub version: i32,
    /// Lifecycle state
    #[serde(default)]
    pub state: WorkplanState,
}

/// File property of a product, present even when no file is attached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductFileModel {
    /// File property name
    pub property_name: String,
    /// Original file name
    #[serde(default)]
    pub file_name: Option<String>,
    /// Content hash
    #[serde(default)]
    pub file_hash: Option<String>,
    /// Location in the file store
    #[serde(default)]
    pub file_path: Option<String>,
    /// Content type
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl ProductFileModel {
    /// File carried by this model; `None` when every field is unset
    #[must_use]
    pub fn to_file(&self) -> Option<ProductFile> {
        let file = ProductFile {
            name: self.file_name.clone(),
            file_hash: self.file_hash.clone(),
            file_path: self.file_path.clone(),
            mime_type: self.mime_type.clone(),
        };
        (!file.is_empty()).then_some(file)
    }
}

/// Type-level description of a product type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductDefinitionModel {
    /// Type tag
    pub name: String,
    /// Name shown to users
    pub display_name: String,
    /// Tag of the base type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,
    /// Property templates
    #[serde(default)]
    pub properties: Vec<Entry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_model_omits_sections() {
        let model = ProductModel {
            id: ProductId::new(7),
            type_tag: "WatchType".into(),
            name: "Watch".into(),
            identifier: "ABC".into(),
            revision: 1,
            ..ProductModel::default()
        };
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(
            value,
            json!({
                "Id": 7,
                "Type": "WatchType",
                "Name": "Watch",
                "State": "Created",
                "Identifier": "ABC",
                "Revision": 1
            })
        );
        assert!(model.is_flat());
    }

    #[test]
    fn classification_codes() {
        let parsed: RecipeModel = serde_json::from_value(json!({
            "Id": 3,
            "Name": "Assembly",
            "Type": "ProductionRecipe",
            "Classification": 4,
            "IsClone": true
        }))
        .unwrap();
        assert_eq!(parsed.classification, RecipeClassificationModel::Part);
        assert!(parsed.is_clone);

        let unknown: RecipeClassificationModel = serde_json::from_value(json!(9)).unwrap();
        assert_eq!(unknown, RecipeClassificationModel::Unknown(9));
        assert_eq!(serde_json::to_value(unknown).unwrap(), json!(9));

        for code in [256, -1, i64::from(i32::MAX) + 1] {
            let wide: RecipeClassificationModel = serde_json::from_value(json!(code)).unwrap();
            assert_eq!(wide, RecipeClassificationModel::Unknown(code));
        }
    }

    #[test]
    fn part_model_defaults() {
        let part: PartModel = serde_json::from_value(json!({ "Id": 0 })).unwrap();
        assert!(part.id.is_unsaved());
        assert!(part.product.is_none());
        assert!(part.properties.is_empty());
    }

    #[test]
    fn file_model_all_null_is_absent() {
        let model = ProductFileModel {
            property_name: "Manual".into(),
            ..ProductFileModel::default()
        };
        assert!(model.to_file().is_none());

        let model = ProductFileModel {
            mime_type: Some("application/pdf".into()),
            ..model
        };
        assert_eq!(model.to_file().and_then(|f| f.mime_type).as_deref(), Some("application/pdf"));
    }
}
