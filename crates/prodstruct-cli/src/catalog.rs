//! JSON catalog loading

use prodstruct_convert::{
    ConvertError, ConverterConfig, MemoryStore, ProductConverter, ProductLoader,
};
use prodstruct_model::{
    ProductTypeDefinition, RecipeTypeDefinition, RegistryError,
    TypeMetadataRegistry, Workplan,
};
use prodstruct_transfer::ProductModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors loading a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid type definitions: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to load product `{name}`: {source}")]
    Product {
        name: String,
        #[source]
        source: ConvertError,
    },
}

/// Serialized registry and seed data
///
/// Products are transfer models. They are loaded in two passes so that part
/// links may reference products listed later in the file; list children
/// before their parents to get fully populated part snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Product types to register
    #[serde(default)]
    pub types: Vec<ProductTypeDefinition>,
    /// Recipe types to register
    #[serde(default)]
    pub recipe_types: Vec<RecipeTypeDefinition>,
    /// Workplans seeded into the store
    #[serde(default)]
    pub workplans: Vec<Workplan>,
    /// Products decoded into the store
    #[serde(default)]
    pub products: Vec<ProductModel>,
}

/// Loaded catalog
pub struct Session {
    /// Registry built from the catalog types
    pub registry: Arc<TypeMetadataRegistry>,
    /// Store holding the seeded data
    pub store: Arc<MemoryStore>,
    /// Converter wired to `registry` and `store`
    pub converter: ProductConverter,
}

impl Catalog {
    /// # Errors
    /// Returns error on malformed JSON.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Build the registry and seed a fresh store
    ///
    /// # Errors
    /// Returns error if the definitions do not form a valid registry or a
    /// product model cannot be decoded.
    pub fn load(self, config: ConverterConfig) -> Result<Session, CatalogError> {
        let mut builder = TypeMetadataRegistry::builder();
        for definition in self.types {
            builder = builder.register_product(definition)?;
        }
        for definition in self.recipe_types {
            builder = builder.register_recipe(definition)?;
        }
        let registry = Arc::new(builder.build()?);

        let store = Arc::new(MemoryStore::new());
        for workplan in self.workplans {
            store.save_workplan(workplan);
        }

        let converter = ProductConverter::new(
            Arc::clone(&registry),
            store.clone(),
            store.clone(),
            store.clone(),
        )
        .with_config(config);

        let mut placeholders = Vec::with_capacity(self.products.len());
        for model in &self.products {
            let mut product = converter
                .instantiate(&model.type_tag)
                .map_err(|source| product_error(model, source))?;
            product.id = model.id;
            product.name.clone_from(&model.name);
            placeholders.push(store.save_product(product).id);
        }

        for (model, id) in self.products.into_iter().zip(placeholders) {
            let saved = store.load_type(id).map_err(|source| product_error(&model, source))?;
            let mut product = (*saved).clone();
            let model = ProductModel { id, ..model };
            converter
                .decode_product(&model, &mut product)
                .map_err(|source| product_error(&model, source))?;
            store.save_product(product);
        }

        tracing::info!(
            "Loaded catalog: {} types, {} products, {} recipes, {} workplans",
            registry.len(),
            store.product_count(),
            store.recipe_count(),
            store.workplan_count()
        );
        Ok(Session {
            registry,
            store,
            converter,
        })
    }
}

fn product_error(model: &ProductModel, source: ConvertError) -> CatalogError {
    CatalogError::Product {
        name: model.name.clone(),
        source,
    }
}
