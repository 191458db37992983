use proptest::prelude::*;
use prodstruct_convert::{CollectionReconciler, ProductLoader};
use prodstruct_model::{LinkId, PartLink, ProductId, PropertyHost, PropertyValue, TypeMetadataRegistry};
use prodstruct_test_utils::{
    create_assembly, create_registry, create_store, link_ids, part_model, FIRST_COMPONENT,
    FIRST_LINK, SECOND_COMPONENT, SECOND_LINK, SPARE_COMPONENT,
};
use prodstruct_transfer::PartModel;

const PRODUCTS: [ProductId; 3] = [FIRST_COMPONENT, SECOND_COMPONENT, SPARE_COMPONENT];

fn incoming() -> impl Strategy<Value = (usize, Vec<PartModel>)> {
    (
        prop::sample::subsequence(vec![FIRST_LINK, SECOND_LINK], 0..=2),
        prop::collection::vec(0..3usize, 2),
        prop::collection::vec(0..3usize, 0..4),
    )
        .prop_map(|(retained, picks, new)| {
            let mut models: Vec<_> = retained
                .iter()
                .zip(&picks)
                .map(|(&link, &pick)| part_model(link, PRODUCTS[pick]))
                .collect();
            models.extend(new.iter().map(|&pick| part_model(LinkId::UNSAVED, PRODUCTS[pick])));
            (retained.len(), models)
        })
}

fn reconciled(
    registry: &TypeMetadataRegistry,
    store: &prodstruct_convert::MemoryStore,
    rounds: usize,
    models: &[PartModel],
) -> (Vec<(LinkId, Option<ProductId>)>, prodstruct_convert::ReconcileOutcome) {
    let assembly = create_assembly(registry, store);
    let connector = assembly.definition().part_link("Components").unwrap().clone();
    let reconciler = CollectionReconciler::new(registry, store);
    let mut links = assembly.link("Components").unwrap().as_slice().to_vec();
    let mut outcome = None;
    for _ in 0..rounds {
        outcome = Some(reconciler.reconcile(&mut links, models, &connector).unwrap());
    }
    let mut pairs: Vec<_> = links.iter().map(|l| (l.id, l.product_id())).collect();
    pairs.sort();
    (pairs, outcome.unwrap())
}

proptest! {
    #[test]
    fn prop_reconcile_ignores_incoming_order(
        (models, shuffled) in incoming().prop_flat_map(|(_, models)| {
            (Just(models.clone()), Just(models).prop_shuffle())
        })
    ) {
        let registry = create_registry();
        let store = create_store();
        let (ordered, _) = reconciled(&registry, &store, 1, &models);
        let (reordered, _) = reconciled(&registry, &store, 1, &shuffled);
        prop_assert_eq!(ordered, reordered);
    }

    #[test]
    fn prop_reconcile_is_idempotent((_, models) in incoming()) {
        let registry = create_registry();
        let store = create_store();
        let (once, _) = reconciled(&registry, &store, 1, &models);
        let (twice, second) = reconciled(&registry, &store, 2, &models);
        prop_assert_eq!(once, twice);
        prop_assert_eq!(second.created, 0);
        prop_assert_eq!(second.removed, 0);
        prop_assert_eq!(second.retained, models.len());
    }

    #[test]
    fn prop_reconcile_outcome_counts((retained, models) in incoming()) {
        let registry = create_registry();
        let store = create_store();
        let (pairs, outcome) = reconciled(&registry, &store, 1, &models);
        prop_assert_eq!(outcome.retained, retained);
        prop_assert_eq!(outcome.created, models.len() - retained);
        prop_assert_eq!(outcome.removed, 2 - retained);
        prop_assert_eq!(pairs.len(), models.len());
        for model in models.iter().filter(|m| !m.id.is_unsaved()) {
            prop_assert!(pairs.iter().any(|(id, _)| *id == model.id));
        }
    }
}

#[test]
fn reconcile_keeps_untouched_assembly_links() {
    let registry = create_registry();
    let store = create_store();
    let models = [
        part_model(FIRST_LINK, FIRST_COMPONENT),
        part_model(SECOND_LINK, SECOND_COMPONENT),
    ];
    let (pairs, outcome) = reconciled(&registry, &store, 1, &models);
    let assembly = create_assembly(&registry, &store);
    assert_eq!(pairs, link_ids(&assembly, "Components"));
    assert_eq!((outcome.retained, outcome.created, outcome.removed), (2, 0, 0));
}

#[test]
fn unsaved_link_keeps_properties_the_model_omits() {
    let registry = create_registry();
    let store = create_store();
    let assembly = create_assembly(&registry, &store);
    let connector = assembly.definition().part_link("Components").unwrap().clone();
    let reconciler = CollectionReconciler::new(&registry, store.as_ref());

    let mut pending = PartLink::new(connector.link_type.clone())
        .with_product(store.load_type(SPARE_COMPONENT).unwrap());
    pending.set_property("Position", PropertyValue::Integer(5)).unwrap();
    let mut links = assembly.link("Components").unwrap().as_slice().to_vec();
    links.push(pending);

    let models = [
        part_model(FIRST_LINK, FIRST_COMPONENT),
        part_model(SECOND_LINK, SECOND_COMPONENT),
        part_model(LinkId::UNSAVED, SPARE_COMPONENT),
    ];
    for _ in 0..2 {
        let outcome = reconciler.reconcile(&mut links, &models, &connector).unwrap();
        assert_eq!((outcome.retained, outcome.created, outcome.removed), (3, 0, 0));
    }
    assert_eq!(links[2].product_id(), Some(SPARE_COMPONENT));
    assert_eq!(links[2].property("Position"), Some(&PropertyValue::Integer(5)));
}
