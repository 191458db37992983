//! Mapping between declared properties and storage slots

use crate::config::{StorageConfig, TypeMappingConfig};
use crate::error::MappingError;
use crate::predicate::{Predicate, PropertyComparison, SlotComparison};
use crate::slots::{SlotId, SlotKind, SlotValue, StorageSlots};
use prodstruct_model::{
    PropertyDefinition, PropertyError, PropertyHost, PropertyValue, ProductTypeDefinition,
    RecipeTypeDefinition, ValueKind,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct SlotBinding {
    property: PropertyDefinition,
    slot: SlotId,
}

/// Reads, writes and compares one concrete type's properties against a
/// generic storage row
///
/// Built once per type; construction validates the slot assignment so that
/// mapping never meets an unassigned or incompatible slot.
#[derive(Debug, Clone)]
pub struct EntityMapper {
    type_tag: String,
    bindings: Vec<SlotBinding>,
}

impl EntityMapper {
    /// Create a mapper from an explicit slot assignment
    ///
    /// # Errors
    /// Returns a configuration error if a declared property has no slot, a
    /// slot cannot hold the declared kind, two properties share a slot, or
    /// the assignment names an undeclared property.
    pub fn new(
        type_tag: impl Into<String>,
        declared: &[PropertyDefinition],
        config: &TypeMappingConfig,
    ) -> Result<Self, MappingError> {
        let type_tag = type_tag.into();
        let mut by_slot: HashMap<SlotId, &str> = HashMap::new();
        let mut seen = HashSet::new();
        for mapping in &config.properties {
            if !declared.iter().any(|d| d.name == mapping.property) {
                return Err(MappingError::UndeclaredProperty {
                    type_tag,
                    property: mapping.property.clone(),
                });
            }
            if !seen.insert(mapping.property.as_str()) {
                return Err(MappingError::DuplicateMapping {
                    type_tag,
                    property: mapping.property.clone(),
                });
            }
            if let Some(first) = by_slot.insert(mapping.slot, &mapping.property) {
                return Err(MappingError::SlotCollision {
                    type_tag,
                    slot: mapping.slot,
                    first: first.to_string(),
                    second: mapping.property.clone(),
                });
            }
        }

        let mut bindings = Vec::with_capacity(declared.len());
        for property in declared {
            let slot = config
                .slot_of(&property.name)
                .ok_or_else(|| MappingError::MissingSlot {
                    type_tag: type_tag.clone(),
                    property: property.name.clone(),
                })?;
            if !slot_accepts(&property.kind, slot.kind()) {
                return Err(MappingError::IncompatibleSlot {
                    type_tag,
                    property: property.name.clone(),
                    kind: property.kind.name(),
                    slot,
                });
            }
            bindings.push(SlotBinding {
                property: property.clone(),
                slot,
            });
        }

        tracing::debug!("Storage mapper for {}: {} slots", type_tag, bindings.len());
        Ok(Self { type_tag, bindings })
    }

    /// Create a mapper for a declared set from the shared configuration
    ///
    /// A type without declared properties needs no configuration entry.
    ///
    /// # Errors
    /// Returns [`MappingError::MissingTypeConfig`] if properties are declared
    /// but the type is not configured, otherwise as [`EntityMapper::new`].
    pub fn from_config(
        type_tag: &str,
        declared: &[PropertyDefinition],
        config: &StorageConfig,
    ) -> Result<Self, MappingError> {
        match config.for_type(type_tag) {
            Some(type_config) => Self::new(type_tag, declared, type_config),
            None if declared.is_empty() => Ok(Self {
                type_tag: type_tag.to_string(),
                bindings: Vec::new(),
            }),
            None => Err(MappingError::MissingTypeConfig(type_tag.to_string())),
        }
    }

    /// Create a mapper for a product type
    ///
    /// # Errors
    /// See [`EntityMapper::from_config`].
    pub fn for_type(
        definition: &ProductTypeDefinition,
        config: &StorageConfig,
    ) -> Result<Self, MappingError> {
        Self::from_config(&definition.tag, &definition.properties, config)
    }

    /// Create a mapper for a recipe type
    ///
    /// # Errors
    /// See [`EntityMapper::from_config`].
    pub fn for_recipe_type(
        definition: &RecipeTypeDefinition,
        config: &StorageConfig,
    ) -> Result<Self, MappingError> {
        Self::from_config(&definition.tag, &definition.properties, config)
    }

    /// Tag of the mapped product type
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Slot assigned to a property
    #[must_use]
    pub fn slot_of(&self, property: &str) -> Option<SlotId> {
        self.binding(property).map(|b| b.slot)
    }

    /// Property name and slot, in declaration order
    pub fn slots(&self) -> impl Iterator<Item = (&str, SlotId)> {
        self.bindings
            .iter()
            .map(|b| (b.property.name.as_str(), b.slot))
    }

    fn binding(&self, property: &str) -> Option<&SlotBinding> {
        self.bindings.iter().find(|b| b.property.name == property)
    }

    /// True if any stored slot differs from the entity's current value
    ///
    /// An unset slot compares as the type default.
    ///
    /// # Errors
    /// Returns a data-contract error if a stored value violates its kind.
    pub fn has_changed<H: PropertyHost + ?Sized>(
        &self,
        row: &StorageSlots,
        host: &H,
    ) -> Result<bool, MappingError> {
        for binding in &self.bindings {
            let stored = from_slot(binding, row.get(binding.slot))?;
            let current = self.current_value(binding, host)?;
            if stored != current {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Store every declared property into its slot
    ///
    /// The row is unchanged on error.
    ///
    /// # Errors
    /// Returns error if the entity does not declare a mapped property or a
    /// value cannot be represented in its slot.
    pub fn write<H: PropertyHost + ?Sized>(
        &self,
        host: &H,
        row: &mut StorageSlots,
    ) -> Result<(), MappingError> {
        let mut staged = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let current = self.current_value(binding, host)?;
            staged.push((binding.slot, to_slot(binding, current)?));
        }
        for (slot, value) in staged {
            row.set(slot, value).map_err(|value| MappingError::SlotKindMismatch {
                slot,
                found: value.kind(),
            })?;
        }
        Ok(())
    }

    /// Load every declared property from its slot
    ///
    /// Unset slots yield the type default. The entity is unchanged on error.
    ///
    /// # Errors
    /// Returns a data-contract error if a stored value violates the declared
    /// kind, e.g. an integer outside the `Int32` range.
    pub fn read<H: PropertyHost + ?Sized>(
        &self,
        row: &StorageSlots,
        host: &mut H,
    ) -> Result<(), MappingError> {
        let values = self
            .bindings
            .iter()
            .map(|b| Ok((b.property.name.clone(), from_slot(b, row.get(b.slot))?)))
            .collect::<Result<Vec<_>, MappingError>>()?;
        host.set_properties(values)
            .map_err(|(property, source)| match (self.slot_of(&property), source) {
                (Some(slot), source @ (PropertyError::KindMismatch { .. }
                | PropertyError::OutOfRange { .. }
                | PropertyError::UnknownVariant { .. }
                | PropertyError::Parse { .. })) => MappingError::DataContract {
                    property,
                    slot,
                    source,
                },
                _ => MappingError::UndeclaredProperty {
                    type_tag: self.type_tag.clone(),
                    property,
                },
            })
    }

    /// Rewrite a property predicate into a slot predicate
    ///
    /// Only leaves change; captured values are converted to the slot's
    /// primitive representation. Each leaf carries the slot form of the
    /// property's default, so an unset slot matches the same way [`Self::read`]
    /// loads it.
    ///
    /// # Errors
    /// Returns error for unmapped properties, operators that do not apply to
    /// the property's kind, or values that do not fit the declared kind.
    pub fn rewrite_predicate(
        &self,
        predicate: &Predicate<PropertyComparison>,
    ) -> Result<Predicate<SlotComparison>, MappingError> {
        predicate.try_map(&mut |cmp: &PropertyComparison| {
            let binding = self
                .binding(&cmp.property)
                .ok_or_else(|| MappingError::UnknownProperty(cmp.property.clone()))?;
            if !cmp.op.applies_to(&binding.property.kind) {
                return Err(MappingError::UnsupportedOperator {
                    property: cmp.property.clone(),
                    op: cmp.op,
                });
            }
            Ok(SlotComparison {
                slot: binding.slot,
                op: cmp.op,
                value: to_slot(binding, cmp.value.clone())?,
                unset: to_slot(binding, binding.property.kind.default_value()).ok(),
            })
        })
    }

    fn current_value<H: PropertyHost + ?Sized>(
        &self,
        binding: &SlotBinding,
        host: &H,
    ) -> Result<PropertyValue, MappingError> {
        host.property(&binding.property.name)
            .cloned()
            .ok_or_else(|| MappingError::UndeclaredProperty {
                type_tag: self.type_tag.clone(),
                property: binding.property.name.clone(),
            })
    }
}

/// Slot kinds able to hold a declared kind
fn slot_accepts(kind: &ValueKind, slot: SlotKind) -> bool {
    match kind {
        ValueKind::Boolean => slot == SlotKind::Boolean,
        ValueKind::Int32 | ValueKind::Int64 => slot == SlotKind::Integer,
        ValueKind::Float => slot == SlotKind::Float,
        ValueKind::Text => slot == SlotKind::Text,
        ValueKind::Binary => slot == SlotKind::Binary,
        ValueKind::Enum(_) => matches!(slot, SlotKind::Integer | SlotKind::Text),
    }
}

fn contract(binding: &SlotBinding, source: PropertyError) -> MappingError {
    MappingError::DataContract {
        property: binding.property.name.clone(),
        slot: binding.slot,
        source,
    }
}

fn to_slot(binding: &SlotBinding, value: PropertyValue) -> Result<SlotValue, MappingError> {
    let value = binding
        .property
        .kind
        .coerce(value)
        .map_err(|e| contract(binding, e))?;
    let slot_value = match (&binding.property.kind, binding.slot.kind(), value) {
        (ValueKind::Enum(variants), SlotKind::Integer, PropertyValue::Text(name)) => {
            let index = variants.iter().position(|v| *v == name).ok_or_else(|| {
                contract(
                    binding,
                    PropertyError::UnknownVariant {
                        value: name.clone(),
                        variants: variants.clone(),
                    },
                )
            })?;
            SlotValue::Integer(i64::try_from(index).unwrap_or(i64::MAX))
        }
        (_, _, PropertyValue::Boolean(b)) => SlotValue::Boolean(b),
        (_, _, PropertyValue::Integer(i)) => SlotValue::Integer(i),
        (_, _, PropertyValue::Float(f)) => SlotValue::Float(f),
        (_, _, PropertyValue::Text(s)) => SlotValue::Text(s),
        (_, _, PropertyValue::Binary(b)) => SlotValue::Binary(b),
    };
    Ok(slot_value)
}

fn from_slot(binding: &SlotBinding, stored: Option<SlotValue>) -> Result<PropertyValue, MappingError> {
    let kind = &binding.property.kind;
    let Some(stored) = stored else {
        return Ok(kind.default_value());
    };
    let value = match (kind, stored) {
        (ValueKind::Enum(variants), SlotValue::Integer(index)) => {
            let name = usize::try_from(index)
                .ok()
                .and_then(|i| variants.get(i))
                .ok_or_else(|| {
                    contract(
                        binding,
                        PropertyError::OutOfRange {
                            value: index,
                            kind: kind.name(),
                        },
                    )
                })?;
            PropertyValue::Text(name.clone())
        }
        (_, SlotValue::Boolean(b)) => PropertyValue::Boolean(b),
        (_, SlotValue::Integer(i)) => PropertyValue::Integer(i),
        (_, SlotValue::Float(f)) => PropertyValue::Float(f),
        (_, SlotValue::Text(s)) => PropertyValue::Text(s),
        (_, SlotValue::Binary(b)) => PropertyValue::Binary(b),
    };
    kind.coerce(value).map_err(|e| contract(binding, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertyMapping;
    use crate::predicate::CompareOp;
    use prodstruct_model::ProductType;
    use std::sync::Arc;

    fn needle_definition() -> Arc<ProductTypeDefinition> {
        Arc::new(
            ProductTypeDefinition::new("NeedleType")
                .with_property(PropertyDefinition::new("Length", ValueKind::Float))
                .with_property(PropertyDefinition::new("Count", ValueKind::Int32))
                .with_property(PropertyDefinition::new(
                    "Role",
                    ValueKind::Enum(vec!["Hours".into(), "Minutes".into(), "Seconds".into()]),
                ))
                .with_property(PropertyDefinition::new("Label", ValueKind::Text)),
        )
    }

    fn mapping(pairs: &[(&str, &str)]) -> TypeMappingConfig {
        TypeMappingConfig {
            target_type: "NeedleType".into(),
            properties: pairs
                .iter()
                .map(|(property, slot)| PropertyMapping {
                    property: (*property).to_string(),
                    slot: slot.parse().unwrap(),
                })
                .collect(),
        }
    }

    fn full_mapping() -> TypeMappingConfig {
        mapping(&[
            ("Length", "Float1"),
            ("Count", "Integer1"),
            ("Role", "Integer2"),
            ("Label", "Text1"),
        ])
    }

    fn mapper() -> EntityMapper {
        let def = needle_definition();
        EntityMapper::new("NeedleType", &def.properties, &full_mapping()).unwrap()
    }

    fn needle() -> ProductType {
        let mut needle = needle_definition().instantiate();
        needle.set_property("Length", 12.5.into()).unwrap();
        needle.set_property("Count", PropertyValue::Integer(3)).unwrap();
        needle.set_property("Role", "Minutes".into()).unwrap();
        needle
    }

    #[test]
    fn missing_slot_is_configuration_error() {
        let def = needle_definition();
        let err = EntityMapper::new(
            "NeedleType",
            &def.properties,
            &mapping(&[("Length", "Float1"), ("Count", "Integer1"), ("Role", "Text2")]),
        )
        .unwrap_err();
        assert!(matches!(&err, MappingError::MissingSlot { property, .. } if property == "Label"));
        assert!(err.is_configuration());
    }

    #[test]
    fn incompatible_and_colliding_slots_are_rejected() {
        let def = needle_definition();
        let err = EntityMapper::new(
            "NeedleType",
            &def.properties,
            &mapping(&[
                ("Length", "Integer3"),
                ("Count", "Integer1"),
                ("Role", "Integer2"),
                ("Label", "Text1"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::IncompatibleSlot { .. }));

        let err = EntityMapper::new(
            "NeedleType",
            &def.properties,
            &mapping(&[
                ("Length", "Float1"),
                ("Count", "Integer1"),
                ("Role", "Integer1"),
                ("Label", "Text1"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::SlotCollision { .. }));
    }

    #[test]
    fn write_then_read_restores_values() {
        let mapper = mapper();
        let source = needle();
        let mut row = StorageSlots::new();
        mapper.write(&source, &mut row).unwrap();
        assert_eq!(row.get("Integer2".parse().unwrap()), Some(SlotValue::Integer(1)));
        assert!(!mapper.has_changed(&row, &source).unwrap());

        let mut target = needle_definition().instantiate();
        mapper.read(&row, &mut target).unwrap();
        assert_eq!(target.properties(), source.properties());
    }

    #[test]
    fn unset_slots_read_as_defaults() {
        let mapper = mapper();
        let mut target = needle();
        mapper.read(&StorageSlots::new(), &mut target).unwrap();
        assert_eq!(target.property("Count"), Some(&PropertyValue::Integer(0)));
        assert_eq!(target.property("Role"), Some(&PropertyValue::Text("Hours".into())));
        assert!(!mapper.has_changed(&StorageSlots::new(), &needle_definition().instantiate()).unwrap());
    }

    #[test]
    fn has_changed_detects_edits() {
        let mapper = mapper();
        let mut needle = needle();
        let mut row = StorageSlots::new();
        mapper.write(&needle, &mut row).unwrap();
        needle.set_property("Label", "second hand".into()).unwrap();
        assert!(mapper.has_changed(&row, &needle).unwrap());
    }

    #[test]
    fn int32_out_of_range_is_data_contract_error() {
        let mapper = mapper();
        let mut row = StorageSlots::new();
        row.set("Integer1".parse().unwrap(), SlotValue::Integer(i64::from(i32::MAX) + 1))
            .unwrap();
        let mut target = needle();
        let before = target.properties().clone();
        let err = mapper.read(&row, &mut target).unwrap_err();
        assert!(matches!(
            &err,
            MappingError::DataContract { property, source: PropertyError::OutOfRange { .. }, .. }
                if property == "Count"
        ));
        assert!(!err.is_configuration());
        assert_eq!(target.properties(), &before);
    }

    #[test]
    fn enum_index_outside_variants_is_data_contract_error() {
        let mapper = mapper();
        let mut row = StorageSlots::new();
        row.set("Integer2".parse().unwrap(), SlotValue::Integer(7)).unwrap();
        assert!(matches!(
            mapper.has_changed(&row, &needle()),
            Err(MappingError::DataContract { .. })
        ));
    }

    #[test]
    fn rewrite_substitutes_leaves_only() {
        let mapper = mapper();
        let predicate = Predicate::and(
            Predicate::leaf(PropertyComparison::new("Role", CompareOp::Eq, "Seconds")),
            Predicate::negate(Predicate::leaf(PropertyComparison::new(
                "Length",
                CompareOp::Gt,
                PropertyValue::Integer(10),
            ))),
        );
        let rewritten = mapper.rewrite_predicate(&predicate).unwrap();
        assert_eq!(
            rewritten,
            Predicate::and(
                Predicate::leaf(SlotComparison {
                    slot: "Integer2".parse().unwrap(),
                    op: CompareOp::Eq,
                    value: SlotValue::Integer(2),
                    unset: Some(SlotValue::Integer(0)),
                }),
                Predicate::negate(Predicate::leaf(SlotComparison {
                    slot: "Float1".parse().unwrap(),
                    op: CompareOp::Gt,
                    value: SlotValue::Float(10.0),
                    unset: Some(SlotValue::Float(0.0)),
                })),
            )
        );
    }

    #[test]
    fn unset_slots_match_like_read_defaults() {
        let mapper = mapper();
        let row = StorageSlots::new();
        let mut loaded = needle();
        mapper.read(&row, &mut loaded).unwrap();
        assert_eq!(loaded.property("Role"), Some(&PropertyValue::Text("Hours".into())));

        let agrees = |cmp: PropertyComparison| {
            mapper
                .rewrite_predicate(&Predicate::leaf(cmp.clone()))
                .unwrap()
                .evaluate(&|leaf: &SlotComparison| leaf.matches(&row))
                == cmp.matches(&loaded)
        };
        assert!(agrees(PropertyComparison::new("Role", CompareOp::Eq, "Hours")));
        assert!(agrees(PropertyComparison::new("Count", CompareOp::Eq, PropertyValue::Integer(0))));
        assert!(agrees(PropertyComparison::new("Count", CompareOp::Gt, PropertyValue::Integer(0))));
        assert!(agrees(PropertyComparison::new("Label", CompareOp::Ne, "x")));
        assert!(agrees(PropertyComparison::new("Length", CompareOp::Le, 0.0)));

        let hours = mapper
            .rewrite_predicate(&Predicate::leaf(PropertyComparison::new(
                "Role",
                CompareOp::Eq,
                "Hours",
            )))
            .unwrap();
        assert!(hours.evaluate(&|leaf: &SlotComparison| leaf.matches(&row)));
    }

    #[test]
    fn rewrite_rejects_unknown_property_and_bad_operator() {
        let mapper = mapper();
        let unknown = Predicate::leaf(PropertyComparison::new("Weight", CompareOp::Eq, 1.0));
        assert!(matches!(
            mapper.rewrite_predicate(&unknown),
            Err(MappingError::UnknownProperty(_))
        ));
        let ordered_enum = Predicate::leaf(PropertyComparison::new("Role", CompareOp::Lt, "Minutes"));
        assert!(matches!(
            mapper.rewrite_predicate(&ordered_enum),
            Err(MappingError::UnsupportedOperator { .. })
        ));
        let bad_variant = Predicate::leaf(PropertyComparison::new("Role", CompareOp::Eq, "Days"));
        assert!(matches!(
            mapper.rewrite_predicate(&bad_variant),
            Err(MappingError::DataContract { .. })
        ));
    }

    #[test]
    fn types_without_properties_need_no_config() {
        let def = ProductTypeDefinition::new("EmptyType");
        let mapper = EntityMapper::for_type(&def, &StorageConfig::default()).unwrap();
        assert_eq!(mapper.slots().count(), 0);

        let err = EntityMapper::for_type(&needle_definition(), &StorageConfig::default()).unwrap_err();
        assert_eq!(err, MappingError::MissingTypeConfig("NeedleType".into()));
    }
}
