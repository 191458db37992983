//! Identity-based merge of part links
//!
//! Links are matched to incoming part models by id only; ordering of the
//! incoming list is irrelevant. Matched links are updated in place, models
//! without a match create new links, and links left unmatched are removed.
//! Removing a link never deletes the product it referenced.

use crate::collaborators::ProductLoader;
use crate::entries::apply_entries;
use crate::error::{ContractViolation, ConvertError};
use prodstruct_model::{LinkId, PartLink, PartLinkDefinition, ProductType, TypeMetadataRegistry};
use prodstruct_transfer::{PartModel, ProductModel};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Counts of one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Existing links matched by id and updated
    pub retained: usize,
    /// Links created for unmatched models
    pub created: usize,
    /// Existing links no model claimed
    pub removed: usize,
}

/// Reconciles the links of one part-link property against part models
#[derive(Clone, Copy)]
pub struct CollectionReconciler<'a> {
    registry: &'a TypeMetadataRegistry,
    loader: &'a dyn ProductLoader,
}

impl<'a> CollectionReconciler<'a> {
    /// Reconciler resolving part products through `loader`
    pub fn new(registry: &'a TypeMetadataRegistry, loader: &'a dyn ProductLoader) -> Self {
        Self { registry, loader }
    }

    /// Merge `incoming` into a collection
    ///
    /// Retained links keep their position, new links are appended. Links
    /// sharing an id, unsaved ones included, are claimed in list order, so
    /// the n-th model with id `0` updates the n-th unsaved link. A model
    /// whose id has no unclaimed link left creates a new link.
    ///
    /// # Errors
    /// Returns the first error applying a model; `existing` may then be
    /// partially updated, so callers work on a staged copy.
    pub fn reconcile(
        &self,
        existing: &mut Vec<PartLink>,
        incoming: &[PartModel],
        connector: &PartLinkDefinition,
    ) -> Result<ReconcileOutcome, ConvertError> {
        let mut index: HashMap<LinkId, VecDeque<usize>> = HashMap::with_capacity(existing.len());
        for (pos, link) in existing.iter().enumerate() {
            index.entry(link.id).or_default().push_back(pos);
        }

        let mut matched = vec![false; existing.len()];
        let mut appended = Vec::new();
        for model in incoming {
            let hit = index.get_mut(&model.id).and_then(VecDeque::pop_front);
            match hit {
                Some(pos) => {
                    matched[pos] = true;
                    self.apply_part(model, &mut existing[pos], connector)?;
                }
                None => {
                    let mut link = PartLink::new(Arc::clone(&connector.link_type));
                    self.apply_part(model, &mut link, connector)?;
                    appended.push(link);
                }
            }
        }

        let mut keep = matched.iter();
        existing.retain(|_| keep.next().copied().unwrap_or(false));
        let outcome = ReconcileOutcome {
            retained: existing.len(),
            created: appended.len(),
            removed: matched.len() - existing.len(),
        };
        existing.extend(appended);

        tracing::debug!(
            "Reconciled {}: {} retained, {} created, {} removed",
            connector.name,
            outcome.retained,
            outcome.created,
            outcome.removed
        );
        Ok(outcome)
    }

    /// Apply `incoming` to a single-valued part link
    ///
    /// No model clears the link; one model updates it, creating the link if
    /// unset.
    ///
    /// # Errors
    /// Returns [`ContractViolation::MultipleSingleParts`] for more than one
    /// model, otherwise the error applying the model.
    pub fn reconcile_single(
        &self,
        existing: &mut Option<PartLink>,
        incoming: &[PartModel],
        connector: &PartLinkDefinition,
    ) -> Result<ReconcileOutcome, ConvertError> {
        match incoming {
            [] => {
                let removed = usize::from(existing.take().is_some());
                Ok(ReconcileOutcome {
                    removed,
                    ..ReconcileOutcome::default()
                })
            }
            [model] => {
                let created = existing.is_none();
                let link = existing
                    .get_or_insert_with(|| PartLink::new(Arc::clone(&connector.link_type)));
                self.apply_part(model, link, connector)?;
                Ok(ReconcileOutcome {
                    retained: usize::from(!created),
                    created: usize::from(created),
                    removed: 0,
                })
            }
            models => {
                let violation = ContractViolation::MultipleSingleParts {
                    connector: connector.name.clone(),
                    count: models.len(),
                };
                tracing::warn!("Rejecting part models: {}", violation);
                Err(violation.into())
            }
        }
    }

    /// Update one link from its part model
    ///
    /// A model without product clears the link's product.
    ///
    /// # Errors
    /// Returns error if a property does not parse, the referenced product
    /// cannot be loaded or does not fit the connector's target type.
    pub fn apply_part(
        &self,
        model: &PartModel,
        link: &mut PartLink,
        connector: &PartLinkDefinition,
    ) -> Result<(), ConvertError> {
        let product = model
            .product
            .as_ref()
            .map(|p| self.load_part(p, connector))
            .transpose()?;
        apply_entries(link, &model.properties)?;
        link.set_product(product);
        Ok(())
    }

    fn load_part(
        &self,
        model: &ProductModel,
        connector: &PartLinkDefinition,
    ) -> Result<Arc<ProductType>, ConvertError> {
        if model.id.is_unsaved() {
            let violation = ContractViolation::MissingPartProduct {
                connector: connector.name.clone(),
            };
            tracing::warn!("Rejecting part model: {}", violation);
            return Err(violation.into());
        }
        let product = self.loader.load_type(model.id)?;
        if !self.registry.is_assignable(product.type_tag(), &connector.target) {
            let violation = ContractViolation::PartTypeMismatch {
                connector: connector.name.clone(),
                expected: connector.target.clone(),
                found: product.type_tag().to_string(),
            };
            tracing::warn!("Rejecting part model: {}", violation);
            return Err(violation.into());
        }
        Ok(product)
    }
}
