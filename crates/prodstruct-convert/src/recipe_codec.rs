//! Recipe ↔ recipe model

use crate::collaborators::{RecipeStore, WorkplanLoader};
use crate::config::ConverterConfig;
use crate::entries::{apply_entries, encode_properties};
use crate::error::{ContractViolation, ConvertError, EntityKind};
use prodstruct_model::{
    ClassificationKind, ProductId, Recipe, TypeMetadataRegistry, Workplan,
};
use prodstruct_transfer::{RecipeClassificationModel, RecipeModel, WorkplanModel};

/// Encode a workplan summary
#[must_use]
pub(crate) fn encode_workplan(workplan: &Workplan) -> WorkplanModel {
    WorkplanModel {
        id: workplan.id,
        name: workplan.name.clone(),
        version: workplan.version,
        state: workplan.state,
    }
}

fn classification_model(kind: ClassificationKind) -> RecipeClassificationModel {
    match kind {
        ClassificationKind::Unset => RecipeClassificationModel::Unset,
        ClassificationKind::Default => RecipeClassificationModel::Default,
        ClassificationKind::Alternative => RecipeClassificationModel::Alternative,
        ClassificationKind::Intermediate => RecipeClassificationModel::Intermediate,
        ClassificationKind::Part => RecipeClassificationModel::Part,
    }
}

fn classification_kind(
    model: RecipeClassificationModel,
) -> Result<ClassificationKind, ContractViolation> {
    match model {
        RecipeClassificationModel::Unset => Ok(ClassificationKind::Unset),
        RecipeClassificationModel::Default => Ok(ClassificationKind::Default),
        RecipeClassificationModel::Alternative => Ok(ClassificationKind::Alternative),
        RecipeClassificationModel::Intermediate => Ok(ClassificationKind::Intermediate),
        RecipeClassificationModel::Part => Ok(ClassificationKind::Part),
        RecipeClassificationModel::Unknown(code) => {
            Err(ContractViolation::ClassificationOutOfRange(code))
        }
    }
}

/// Converts recipes and their workplan references
///
/// The clone marker is split from the base kind on encode. On decode a clone
/// keeps its base kind whatever the model says.
#[derive(Clone, Copy)]
pub struct RecipeCodec<'a> {
    registry: &'a TypeMetadataRegistry,
    recipes: &'a dyn RecipeStore,
    workplans: &'a dyn WorkplanLoader,
    config: ConverterConfig,
}

impl<'a> RecipeCodec<'a> {
    /// Codec over `registry` and the recipe and workplan stores
    pub fn new(
        registry: &'a TypeMetadataRegistry,
        recipes: &'a dyn RecipeStore,
        workplans: &'a dyn WorkplanLoader,
    ) -> Self {
        Self {
            registry,
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

    /// Encode a recipe with its declared properties
    #[must_use]
    pub fn encode_recipe(&self, recipe: &Recipe) -> RecipeModel {
        let workplan = recipe.workplan();
        RecipeModel {
            id: recipe.id,
            name: recipe.name.clone(),
            type_tag: recipe.type_tag().to_string(),
            state: recipe.state,
            revision: recipe.revision,
            classification: classification_model(recipe.classification.kind),
            is_clone: recipe.classification.is_clone,
            properties: encode_properties(recipe),
            workplan_id: workplan.map(|w| w.id),
            workplan_model: workplan
                .filter(|_| self.config.include_workplan_models)
                .map(encode_workplan),
        }
    }

    /// Recipe a model refers to
    ///
    /// Id `0` instantiates the recipe type named by the model, any other id
    /// is fetched from the recipe store.
    ///
    /// # Errors
    /// Returns [`ConvertError::NotFound`] for an unknown type tag or id.
    pub fn resolve(&self, model: &RecipeModel) -> Result<Recipe, ConvertError> {
        if model.id.is_unsaved() {
            let definition = self
                .registry
                .resolve_recipe_type(&model.type_tag)
                .map_err(|_| ConvertError::not_found(EntityKind::RecipeType, &model.type_tag))?;
            Ok(definition.instantiate())
        } else {
            self.recipes.get(model.id)
        }
    }

    /// Apply a recipe model onto `target`
    ///
    /// The owner is attached only if the recipe has none and `owner` is a
    /// saved id. The workplan is
    /// reloaded only when the incoming id differs from the attached one.
    ///
    /// # Errors
    /// Returns error for an out-of-range classification, an unknown
    /// workplan or an unparsable property; `target` is unchanged.
    pub fn decode_recipe(
        &self,
        model: &RecipeModel,
        target: &mut Recipe,
        owner: ProductId,
    ) -> Result<(), ConvertError> {
        let mut staged = target.clone();
        staged.name.clone_from(&model.name);
        staged.revision = model.revision;
        staged.state = model.state;

        if staged.is_workplan_based() {
            let incoming = model.workplan_id.filter(|id| !id.is_unsaved());
            let current = staged.workplan().map(|w| w.id);
            if incoming != current {
                let workplan = incoming
                    .map(|id| self.workplans.load_workplan(id))
                    .transpose()?;
                staged.set_workplan(workplan);
            }
        }

        if staged.product.is_none() && !owner.is_unsaved() {
            staged.product = Some(owner);
        }

        if !staged.classification.is_clone {
            staged.classification.kind =
                classification_kind(model.classification).map_err(|violation| {
                    tracing::warn!("Rejecting recipe {}: {}", model.id, violation);
                    violation
                })?;
        }

        apply_entries(&mut staged, &model.properties)?;
        *target = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockRecipeStore, MockWorkplanLoader};
    use prodstruct_model::{
        PropertyDefinition, PropertyHost, PropertyValue, RecipeClassification, RecipeId,
        RecipeState, RecipeTypeDefinition, ValueKind, WorkplanId,
    };
    use prodstruct_transfer::{Entry, EntryValueType};

    fn registry() -> TypeMetadataRegistry {
        TypeMetadataRegistry::builder()
            .register_recipe(
                RecipeTypeDefinition::new("ProductionRecipe")
                    .workplan_based()
                    .with_property(PropertyDefinition::new("Quantity", ValueKind::Int32)),
            )
            .unwrap()
            .build()
            .unwrap()
    }

    fn recipe(registry: &TypeMetadataRegistry) -> Recipe {
        let mut recipe = registry.instantiate_recipe("ProductionRecipe").unwrap();
        recipe.id = RecipeId::new(3);
        recipe.name = "Assembly".into();
        recipe.classification = RecipeClassification::clone_of(ClassificationKind::Part);
        recipe.set_workplan(Some(Workplan::new(WorkplanId::new(5), "Assemble", 2)));
        recipe
    }

    #[test]
    fn encode_splits_clone_bit() {
        let registry = registry();
        let recipes = MockRecipeStore::new();
        let workplans = MockWorkplanLoader::new();
        let codec = RecipeCodec::new(&registry, &recipes, &workplans);

        let model = codec.encode_recipe(&recipe(&registry));
        assert_eq!(model.classification, RecipeClassificationModel::Part);
        assert!(model.is_clone);
        assert_eq!(model.workplan_id, Some(WorkplanId::new(5)));
        assert_eq!(model.workplan_model.as_ref().map(|w| w.version), Some(2));

        let codec = codec.with_config(ConverterConfig::new().with_workplan_models(false));
        let model = codec.encode_recipe(&recipe(&registry));
        assert_eq!(model.workplan_id, Some(WorkplanId::new(5)));
        assert!(model.workplan_model.is_none());
    }

    #[test]
    fn clone_keeps_its_base_kind() {
        let registry = registry();
        let recipes = MockRecipeStore::new();
        let workplans = MockWorkplanLoader::new();
        let codec = RecipeCodec::new(&registry, &recipes, &workplans);

        let mut target = recipe(&registry);
        let mut model = codec.encode_recipe(&target);
        model.classification = RecipeClassificationModel::Unknown(9);
        model.name = "Renamed".into();
        codec.decode_recipe(&model, &mut target, ProductId::new(7)).unwrap();

        assert_eq!(target.name, "Renamed");
        assert_eq!(
            target.classification,
            RecipeClassification::clone_of(ClassificationKind::Part)
        );
        assert_eq!(target.product, Some(ProductId::new(7)));
    }

    #[test]
    fn out_of_range_classification_is_rejected() {
        let registry = registry();
        let recipes = MockRecipeStore::new();
        let workplans = MockWorkplanLoader::new();
        let codec = RecipeCodec::new(&registry, &recipes, &workplans);

        let mut target = recipe(&registry);
        target.classification = RecipeClassification::new(ClassificationKind::Default);
        let before = target.clone();
        let mut model = codec.encode_recipe(&target);
        model.classification = RecipeClassificationModel::Unknown(5);
        model.state = RecipeState::Released;

        let err = codec
            .decode_recipe(&model, &mut target, ProductId::new(7))
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::ContractViolation(ContractViolation::ClassificationOutOfRange(5))
        );
        assert_eq!(target, before);
    }

    #[test]
    fn workplan_reloads_only_on_change() {
        let registry = registry();
        let recipes = MockRecipeStore::new();
        let mut workplans = MockWorkplanLoader::new();
        workplans
            .expect_load_workplan()
            .withf(|id| *id == WorkplanId::new(6))
            .times(1)
            .returning(|id| Ok(Workplan::new(id, "Polish", 1)));
        let codec = RecipeCodec::new(&registry, &recipes, &workplans);

        let mut target = recipe(&registry);
        let mut model = codec.encode_recipe(&target);
        codec.decode_recipe(&model, &mut target, ProductId::new(7)).unwrap();
        assert_eq!(target.workplan().map(|w| w.id), Some(WorkplanId::new(5)));

        model.workplan_id = Some(WorkplanId::new(6));
        codec.decode_recipe(&model, &mut target, ProductId::new(7)).unwrap();
        assert_eq!(target.workplan().map(|w| w.name.as_str()), Some("Polish"));

        model.workplan_id = None;
        codec.decode_recipe(&model, &mut target, ProductId::new(7)).unwrap();
        assert!(target.workplan().is_none());
    }

    #[test]
    fn owner_is_assigned_once() {
        let registry = registry();
        let recipes = MockRecipeStore::new();
        let workplans = MockWorkplanLoader::new();
        let codec = RecipeCodec::new(&registry, &recipes, &workplans);

        let mut target = recipe(&registry);
        target.product = Some(ProductId::new(1));
        let mut model = codec.encode_recipe(&target);
        model.properties = vec![Entry::current("Quantity", EntryValueType::Int32, "12")];
        codec.decode_recipe(&model, &mut target, ProductId::new(2)).unwrap();
        assert_eq!(target.product, Some(ProductId::new(1)));
        assert_eq!(target.property("Quantity"), Some(&PropertyValue::Integer(12)));
    }

    #[test]
    fn unsaved_owner_is_not_attached() {
        let registry = registry();
        let recipes = MockRecipeStore::new();
        let workplans = MockWorkplanLoader::new();
        let codec = RecipeCodec::new(&registry, &recipes, &workplans);

        let mut target = recipe(&registry);
        let model = codec.encode_recipe(&target);
        codec.decode_recipe(&model, &mut target, ProductId::UNSAVED).unwrap();
        assert_eq!(target.product, None);

        codec.decode_recipe(&model, &mut target, ProductId::new(4)).unwrap();
        assert_eq!(target.product, Some(ProductId::new(4)));
    }

    #[test]
    fn resolve_instantiates_or_fetches() {
        let registry = registry();
        let mut recipes = MockRecipeStore::new();
        let stored = recipe(&registry);
        recipes
            .expect_get()
            .withf(|id| *id == RecipeId::new(3))
            .times(1)
            .returning(move |_| Ok(stored.clone()));
        let workplans = MockWorkplanLoader::new();
        let codec = RecipeCodec::new(&registry, &recipes, &workplans);

        let fresh = codec
            .resolve(&RecipeModel {
                type_tag: "ProductionRecipe".into(),
                ..RecipeModel::default()
            })
            .unwrap();
        assert!(fresh.id.is_unsaved());

        let fetched = codec
            .resolve(&RecipeModel {
                id: RecipeId::new(3),
                type_tag: "ProductionRecipe".into(),
                ..RecipeModel::default()
            })
            .unwrap();
        assert_eq!(fetched.name, "Assembly");

        let unknown = codec.resolve(&RecipeModel {
            type_tag: "Missing".into(),
            ..RecipeModel::default()
        });
        assert!(matches!(
            unknown,
            Err(ConvertError::NotFound { entity: EntityKind::RecipeType, .. })
        ));
    }
}
