//! Metadata-driven property entries
//!
//! Each declared property travels as an [`Entry`] carrying its kind, current
//! value, default and (for enums) the possible values, rendered as strings.

use serde::{Deserialize, Serialize};

/// Wire kind of an entry value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryValueType {
    Boolean,
    Int32,
    Int64,
    Float,
    String,
    Binary,
    Enum,
}

/// Value section of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntryValue {
    /// Value type
    #[serde(rename = "Type")]
    pub value_type: EntryValueType,
    /// Current value, formatted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    /// Default value, formatted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Allowed values of an enum
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible: Vec<String>,
}

/// One encoded property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entry {
    /// Property name
    pub identifier: String,
    /// Name shown to users
    pub display_name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Typed value
    pub value: EntryValue,
}

impl Entry {
    /// Entry with only a current value, as sent by simple clients
    #[must_use]
    pub fn current(
        identifier: impl Into<String>,
        value_type: EntryValueType,
        current: impl Into<String>,
    ) -> Self {
        let identifier = identifier.into();
        Self {
            display_name: identifier.clone(),
            identifier,
            description: None,
            value: EntryValue {
                value_type,
                current: Some(current.into()),
                default: None,
                possible: Vec::new(),
            },
        }
    }
}
