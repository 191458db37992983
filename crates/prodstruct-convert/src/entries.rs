//! Declared properties ↔ transfer entries

use crate::error::ConvertError;
use prodstruct_model::{PropertyDefinition, PropertyHost, PropertyValue, ValueKind};
use prodstruct_transfer::{Entry, EntryValue, EntryValueType};

fn value_type(kind: &ValueKind) -> EntryValueType {
    match kind {
        ValueKind::Boolean => EntryValueType::Boolean,
        ValueKind::Int32 => EntryValueType::Int32,
        ValueKind::Int64 => EntryValueType::Int64,
        ValueKind::Float => EntryValueType::Float,
        ValueKind::Text => EntryValueType::String,
        ValueKind::Binary => EntryValueType::Binary,
        ValueKind::Enum(_) => EntryValueType::Enum,
    }
}

/// Encode one declared property; `None` encodes the type default
#[must_use]
pub fn encode_entry(definition: &PropertyDefinition, current: Option<&PropertyValue>) -> Entry {
    let default = definition.kind.default_value();
    Entry {
        identifier: definition.name.clone(),
        display_name: definition.display_name().to_string(),
        description: definition.description.clone(),
        value: EntryValue {
            value_type: value_type(&definition.kind),
            current: Some(current.unwrap_or(&default).render()),
            default: Some(default.render()),
            possible: definition.kind.possible_values().to_vec(),
        },
    }
}

/// Encode every declared property of an entity, in declaration order
pub fn encode_properties<H: PropertyHost + ?Sized>(host: &H) -> Vec<Entry> {
    host.declared_properties()
        .iter()
        .map(|def| encode_entry(def, host.property(&def.name)))
        .collect()
}

/// Encode a declared set with default values only
#[must_use]
pub fn encode_templates(declared: &[PropertyDefinition]) -> Vec<Entry> {
    declared.iter().map(|def| encode_entry(def, None)).collect()
}

/// Apply incoming entries to the declared properties of an entity
///
/// Entries naming undeclared properties or carrying no current value are
/// ignored. Every value is parsed before any is assigned.
///
/// # Errors
/// Returns [`ConvertError::PropertyUpdate`] for the first value that does not
/// parse into its declared kind; the entity is unchanged.
pub fn apply_entries<H: PropertyHost + ?Sized>(
    host: &mut H,
    entries: &[Entry],
) -> Result<(), ConvertError> {
    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(def) = host
            .declared_properties()
            .iter()
            .find(|d| d.name == entry.identifier)
        else {
            tracing::debug!("Ignoring undeclared entry: {}", entry.identifier);
            continue;
        };
        let Some(raw) = entry.value.current.as_deref() else {
            continue;
        };
        let value = def.kind.parse(raw).map_err(|source| ConvertError::PropertyUpdate {
            property: entry.identifier.clone(),
            source,
        })?;
        values.push((entry.identifier.clone(), value));
    }
    host.set_properties(values)
        .map_err(|(property, source)| ConvertError::PropertyUpdate { property, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodstruct_model::{ProductTypeDefinition, PropertyError};
    use std::sync::Arc;

    fn definition() -> Arc<ProductTypeDefinition> {
        Arc::new(
            ProductTypeDefinition::new("WatchType")
                .with_property(
                    PropertyDefinition::new("Weight", ValueKind::Float).with_display_name("Weight (g)"),
                )
                .with_property(PropertyDefinition::new("Price", ValueKind::Int32))
                .with_property(PropertyDefinition::new(
                    "Color",
                    ValueKind::Enum(vec!["Black".into(), "Silver".into()]),
                ))
                .with_property(PropertyDefinition::new("Serial", ValueKind::Binary)),
        )
    }

    #[test]
    fn encodes_declared_properties_in_order() {
        let mut watch = definition().instantiate();
        watch.set_property("Price", PropertyValue::Integer(250)).unwrap();
        watch.set_property("Serial", vec![0xab_u8, 0x01].into()).unwrap();

        let entries = encode_properties(&watch);
        let ids: Vec<_> = entries.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, ["Weight", "Price", "Color", "Serial"]);
        assert_eq!(entries[0].display_name, "Weight (g)");
        assert_eq!(entries[1].value.current.as_deref(), Some("250"));
        assert_eq!(entries[1].value.default.as_deref(), Some("0"));
        assert_eq!(entries[2].value.value_type, EntryValueType::Enum);
        assert_eq!(entries[2].value.possible, ["Black", "Silver"]);
        assert_eq!(entries[3].value.current.as_deref(), Some("ab01"));
    }

    #[test]
    fn templates_carry_defaults() {
        let entries = encode_templates(&definition().properties);
        assert_eq!(entries[2].value.current.as_deref(), Some("Black"));
    }

    #[test]
    fn apply_ignores_unknown_entries() {
        let mut watch = definition().instantiate();
        apply_entries(
            &mut watch,
            &[
                Entry::current("Price", EntryValueType::Int32, "99"),
                Entry::current("Unknown", EntryValueType::String, "x"),
                Entry::current("Color", EntryValueType::Enum, "Silver"),
            ],
        )
        .unwrap();
        assert_eq!(watch.property("Price"), Some(&PropertyValue::Integer(99)));
        assert_eq!(watch.property("Color"), Some(&PropertyValue::Text("Silver".into())));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut watch = definition().instantiate();
        let before = watch.clone();
        let err = apply_entries(
            &mut watch,
            &[
                Entry::current("Price", EntryValueType::Int32, "99"),
                Entry::current("Price", EntryValueType::Int32, "4294967296"),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::PropertyUpdate { source: PropertyError::OutOfRange { .. }, .. }
        ));
        assert_eq!(watch, before);
    }
}
