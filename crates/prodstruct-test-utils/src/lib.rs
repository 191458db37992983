//! Testing utilities for prodstruct workspace
//!
//! Shared sample registry, seeded stores and transfer-model helpers.

#![allow(missing_docs)]

use prodstruct_convert::{MemoryStore, ProductConverter, RecipeStore, WorkplanLoader};
use prodstruct_model::{
    ClassificationKind, FileDefinition, LinkId, LinkTypeDefinition, PartLinkDefinition, ProductFile,
    ProductId, ProductIdentity, ProductType, ProductTypeDefinition, PropertyDefinition, PropertyHost,
    PropertyValue, Recipe, RecipeClassification, RecipeId, RecipeTypeDefinition, TypeMetadataRegistry,
    ValueKind, Workplan, WorkplanId,
};
use prodstruct_transfer::{PartModel, ProductModel};
use std::sync::Arc;

/// Id of the sample assembly
pub const ASSEMBLY_ID: ProductId = ProductId::new(7);
/// Components of the sample assembly, linked through [`FIRST_LINK`] and [`SECOND_LINK`]
pub const FIRST_COMPONENT: ProductId = ProductId::new(10);
/// Second linked component of the assembly
pub const SECOND_COMPONENT: ProductId = ProductId::new(11);
/// Saved component not linked to the assembly
pub const SPARE_COMPONENT: ProductId = ProductId::new(12);
/// Link to [`FIRST_COMPONENT`]
pub const FIRST_LINK: LinkId = LinkId::new(21);
/// Link to [`SECOND_COMPONENT`]
pub const SECOND_LINK: LinkId = LinkId::new(22);

/// Registry of the sample watch and assembly types with their recipe types
pub fn create_registry() -> Arc<TypeMetadataRegistry> {
    let registry = TypeMetadataRegistry::builder()
        .register_product(
            ProductTypeDefinition::new("ComponentType")
                .with_property(PropertyDefinition::new("Supplier", ValueKind::Text)),
        )
        .and_then(|b| {
            b.register_product(
                ProductTypeDefinition::new("NeedleType")
                    .with_base("ComponentType")
                    .with_property(PropertyDefinition::new("Length", ValueKind::Float)),
            )
        })
        .and_then(|b| {
            b.register_product(
                ProductTypeDefinition::new("WatchfaceType")
                    .with_base("ComponentType")
                    .with_property(PropertyDefinition::new("IsDigital", ValueKind::Boolean)),
            )
        })
        .and_then(|b| {
            b.register_product(
                ProductTypeDefinition::new("WatchType")
                    .with_display_name("Watch")
                    .with_property(
                        PropertyDefinition::new("Weight", ValueKind::Float)
                            .with_display_name("Weight (g)"),
                    )
                    .with_property(PropertyDefinition::new("Price", ValueKind::Int32))
                    .with_property(PropertyDefinition::new(
                        "Color",
                        ValueKind::Enum(vec!["Black".into(), "Silver".into(), "Gold".into()]),
                    ))
                    .with_property(PropertyDefinition::new("Waterproof", ValueKind::Boolean))
                    .with_property(PropertyDefinition::new("Notes", ValueKind::Text))
                    .with_file(FileDefinition::new("Manual"))
                    .with_part_link(PartLinkDefinition::single(
                        "Watchface",
                        "WatchfaceType",
                        LinkTypeDefinition::new("WatchfacePart"),
                    ))
                    .with_part_link(PartLinkDefinition::collection(
                        "Needles",
                        "NeedleType",
                        LinkTypeDefinition::new("NeedlePart").with_property(PropertyDefinition::new(
                            "Role",
                            ValueKind::Enum(vec!["Hours".into(), "Minutes".into(), "Seconds".into()]),
                        )),
                    )),
            )
        })
        .and_then(|b| {
            b.register_product(
                ProductTypeDefinition::new("SmartWatchType")
                    .with_base("WatchType")
                    .with_property(PropertyDefinition::new("BatteryLife", ValueKind::Int32)),
            )
        })
        .and_then(|b| {
            b.register_product(ProductTypeDefinition::new("AssemblyType").with_part_link(
                PartLinkDefinition::collection(
                    "Components",
                    "ComponentType",
                    LinkTypeDefinition::new("ComponentPart")
                        .with_property(PropertyDefinition::new("Position", ValueKind::Int32)),
                ),
            ))
        })
        .and_then(|b| {
            b.register_recipe(
                RecipeTypeDefinition::new("ProductionRecipe")
                    .workplan_based()
                    .with_property(PropertyDefinition::new("Quantity", ValueKind::Int32)),
            )
        })
        .and_then(|b| b.register_recipe(RecipeTypeDefinition::new("SetupRecipe")))
        .and_then(|b| b.build())
        .unwrap();
    Arc::new(registry)
}

/// Empty shared store
pub fn create_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Converter over `registry` with `store` as every collaborator
pub fn create_converter(registry: &Arc<TypeMetadataRegistry>, store: &Arc<MemoryStore>) -> ProductConverter {
    ProductConverter::new(
        Arc::clone(registry),
        store.clone(),
        store.clone(),
        store.clone(),
    )
}

/// Saved needle of the given length
pub fn create_needle(registry: &TypeMetadataRegistry, store: &MemoryStore, name: &str, length: f64) -> Arc<ProductType> {
    let mut needle = registry.instantiate("NeedleType").unwrap();
    needle.name = name.to_string();
    needle.set_property("Length", length.into()).unwrap();
    store.save_product(needle)
}

/// Saved watchface
pub fn create_watchface(registry: &TypeMetadataRegistry, store: &MemoryStore, name: &str) -> Arc<ProductType> {
    let mut face = registry.instantiate("WatchfaceType").unwrap();
    face.name = name.to_string();
    store.save_product(face)
}

/// Saved watch with a watchface, hour and minute needles, a manual and a
/// production recipe
pub fn create_watch(registry: &TypeMetadataRegistry, store: &MemoryStore) -> Arc<ProductType> {
    let face = create_watchface(registry, store, "Classic face");
    let hours = create_needle(registry, store, "Hour needle", 12.0);
    let minutes = create_needle(registry, store, "Minute needle", 18.5);

    let mut watch = registry.instantiate("WatchType").unwrap();
    watch.name = "Chronograph".into();
    watch.identity = Some(ProductIdentity::new("W-100", 1));
    watch
        .set_properties(vec![
            ("Weight".into(), 84.5.into()),
            ("Price".into(), PropertyValue::Integer(249)),
            ("Color".into(), "Silver".into()),
            ("Waterproof".into(), true.into()),
        ])
        .unwrap();
    watch
        .set_file(
            "Manual",
            Some(ProductFile {
                name: Some("manual.pdf".into()),
                file_hash: Some("9f86d081".into()),
                file_path: Some("/files/manual.pdf".into()),
                mime_type: Some("application/pdf".into()),
            }),
        )
        .unwrap();
    watch.add_part("Watchface", face).unwrap();
    watch
        .add_part("Needles", hours)
        .unwrap()
        .set_property("Role", "Hours".into())
        .unwrap();
    watch
        .add_part("Needles", minutes)
        .unwrap()
        .set_property("Role", "Minutes".into())
        .unwrap();
    let watch = store.save_product(watch);

    let workplan = create_workplan(store, "Assemble watch");
    let mut recipe = create_recipe(registry, "ProductionRecipe", RecipeClassification::new(ClassificationKind::Default));
    recipe.name = "Watch production".into();
    recipe.set_workplan(Some(store.load_workplan(workplan).unwrap()));
    recipe.set_property("Quantity", PropertyValue::Integer(100)).unwrap();
    save_recipes(store, watch.id, vec![recipe]);
    watch
}

/// Saved assembly `7` / `ABC` rev 1 whose `Components` link
/// [`FIRST_COMPONENT`] and [`SECOND_COMPONENT`]; [`SPARE_COMPONENT`] is
/// saved but unlinked
pub fn create_assembly(registry: &TypeMetadataRegistry, store: &MemoryStore) -> Arc<ProductType> {
    let component = |id: ProductId, name: &str| {
        let mut needle = registry.instantiate("NeedleType").unwrap();
        needle.id = id;
        needle.name = name.to_string();
        store.save_product(needle)
    };
    let first = component(FIRST_COMPONENT, "Component 10");
    let second = component(SECOND_COMPONENT, "Component 11");
    component(SPARE_COMPONENT, "Component 12");

    let mut assembly = registry.instantiate("AssemblyType").unwrap();
    assembly.id = ASSEMBLY_ID;
    assembly.name = "Assembly".into();
    assembly.identity = Some(ProductIdentity::new("ABC", 1));
    assembly.add_part("Components", first).unwrap().id = FIRST_LINK;
    assembly.add_part("Components", second).unwrap().id = SECOND_LINK;
    store.save_product(assembly)
}

/// Saved workplan
pub fn create_workplan(store: &MemoryStore, name: &str) -> WorkplanId {
    store.save_workplan(Workplan::new(WorkplanId::UNSAVED, name, 1))
}

/// Unsaved recipe of type `tag`
pub fn create_recipe(registry: &TypeMetadataRegistry, tag: &str, classification: RecipeClassification) -> Recipe {
    let mut recipe = registry.instantiate_recipe(tag).unwrap();
    recipe.classification = classification;
    recipe
}

/// Save recipes for `product`
pub fn save_recipes(store: &MemoryStore, product: ProductId, recipes: Vec<Recipe>) -> Vec<RecipeId> {
    store.save(product, &recipes).unwrap()
}

/// Part model referencing a saved product
pub fn part_model(id: LinkId, product: ProductId) -> PartModel {
    PartModel {
        id,
        product: Some(ProductModel {
            id: product,
            ..ProductModel::default()
        }),
        properties: Vec::new(),
    }
}

/// Ids of the links of a part-link property as `(link, product)` pairs
pub fn link_ids(product: &ProductType, name: &str) -> Vec<(LinkId, Option<ProductId>)> {
    product
        .link(name)
        .map(|slot| slot.as_slice().iter().map(|l| (l.id, l.product_id())).collect())
        .unwrap_or_default()
}
