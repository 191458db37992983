//! Declared property values
//!
//! Every declared property has a [`ValueKind`]. Values travel as
//! [`PropertyValue`] and are coerced into the declared kind on assignment,
//! never truncated.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of a declared property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// `true` / `false`
    Boolean,
    /// Signed 32 bit integer
    Int32,
    /// Signed 64 bit integer
    Int64,
    /// Double precision float
    Float,
    /// UTF-8 text
    Text,
    /// Raw bytes
    Binary,
    /// One of a fixed list of variant names
    Enum(Vec<String>),
}

impl ValueKind {
    /// Stable kind name used in wire metadata and diagnostics
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float => "Float",
            Self::Text => "Text",
            Self::Binary => "Binary",
            Self::Enum(_) => "Enum",
        }
    }

    /// Type default of this kind
    ///
    /// An enum defaults to its first variant.
    #[must_use]
    pub fn default_value(&self) -> PropertyValue {
        match self {
            Self::Boolean => PropertyValue::Boolean(false),
            Self::Int32 | Self::Int64 => PropertyValue::Integer(0),
            Self::Float => PropertyValue::Float(0.0),
            Self::Text => PropertyValue::Text(String::new()),
            Self::Binary => PropertyValue::Binary(Vec::new()),
            Self::Enum(variants) => {
                PropertyValue::Text(variants.first().cloned().unwrap_or_default())
            }
        }
    }

    /// Variant names for [`ValueKind::Enum`], empty otherwise
    #[must_use]
    pub fn possible_values(&self) -> &[String] {
        match self {
            Self::Enum(variants) => variants,
            _ => &[],
        }
    }

    /// Coerce a value into this kind
    ///
    /// Integers convert to floats only when the conversion is exact.
    ///
    /// # Errors
    /// Returns error if the value has a different kind, is out of range, or
    /// names an unknown enum variant.
    pub fn coerce(&self, value: PropertyValue) -> Result<PropertyValue, PropertyError> {
        match (self, value) {
            (Self::Boolean, v @ PropertyValue::Boolean(_))
            | (Self::Int64, v @ PropertyValue::Integer(_))
            | (Self::Float, v @ PropertyValue::Float(_))
            | (Self::Text, v @ PropertyValue::Text(_))
            | (Self::Binary, v @ PropertyValue::Binary(_)) => Ok(v),
            (Self::Int32, PropertyValue::Integer(i)) => {
                if i32::try_from(i).is_ok() {
                    Ok(PropertyValue::Integer(i))
                } else {
                    Err(PropertyError::OutOfRange {
                        value: i,
                        kind: self.name(),
                    })
                }
            }
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            (Self::Float, PropertyValue::Integer(i)) => {
                let f = i as f64;
                if f as i64 == i {
                    Ok(PropertyValue::Float(f))
                } else {
                    Err(PropertyError::OutOfRange {
                        value: i,
                        kind: self.name(),
                    })
                }
            }
            (Self::Enum(variants), PropertyValue::Text(name)) => {
                if variants.contains(&name) {
                    Ok(PropertyValue::Text(name))
                } else {
                    Err(PropertyError::UnknownVariant {
                        value: name,
                        variants: variants.clone(),
                    })
                }
            }
            (_, other) => Err(PropertyError::KindMismatch {
                expected: self.name(),
                actual: other.kind_name(),
            }),
        }
    }

    /// Parse the string rendering produced by [`PropertyValue::render`]
    ///
    /// # Errors
    /// Returns error if `raw` is not a valid rendering for this kind.
    pub fn parse(&self, raw: &str) -> Result<PropertyValue, PropertyError> {
        let parse_error = || PropertyError::Parse {
            raw: raw.to_string(),
            kind: self.name(),
        };
        let value = match self {
            Self::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => PropertyValue::Boolean(true),
                "false" => PropertyValue::Boolean(false),
                _ => return Err(parse_error()),
            },
            Self::Int32 | Self::Int64 => {
                PropertyValue::Integer(raw.trim().parse().map_err(|_| parse_error())?)
            }
            Self::Float => PropertyValue::Float(raw.trim().parse().map_err(|_| parse_error())?),
            Self::Text | Self::Enum(_) => PropertyValue::Text(raw.to_string()),
            Self::Binary => PropertyValue::Binary(hex::decode(raw.trim()).map_err(|_| parse_error())?),
        };
        self.coerce(value)
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Binary(Vec<u8>),
}

impl PropertyValue {
    /// Name of the value's own kind
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::Text(_) => "Text",
            Self::Binary(_) => "Binary",
        }
    }

    /// String rendering used by the transfer layer
    ///
    /// Binary renders as lower-case hex.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Binary(bytes) => hex::encode(bytes),
        }
    }

    /// Boolean payload
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload
    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text payload
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Binary payload
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

/// Errors assigning a value to a declared property
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// Name is not part of the declared set
    #[error("property `{0}` is not declared")]
    Undeclared(String),

    /// Value kind does not fit the declared kind
    #[error("expected {expected} value, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Integer does not fit the declared kind
    #[error("value {value} is out of range for {kind}")]
    OutOfRange { value: i64, kind: &'static str },

    /// Enum value is not a declared variant
    #[error("`{value}` is not one of {variants:?}")]
    UnknownVariant { value: String, variants: Vec<String> },

    /// String rendering could not be parsed
    #[error("cannot parse `{raw}` as {kind}")]
    Parse { raw: String, kind: &'static str },
}
