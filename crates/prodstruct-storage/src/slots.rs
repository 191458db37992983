//! Generic storage slots

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of slots per primitive kind in one row
pub const SLOTS_PER_KIND: u8 = 8;

/// Primitive kind of a slot column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKind {
    Integer,
    Float,
    Text,
    Boolean,
    Binary,
}

impl SlotKind {
    /// Every slot kind
    pub const ALL: [Self; 5] = [
        Self::Integer,
        Self::Float,
        Self::Text,
        Self::Boolean,
        Self::Binary,
    ];

    /// Slot name prefix
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Text => "Text",
            Self::Boolean => "Boolean",
            Self::Binary => "Binary",
        }
    }
}

impl Display for SlotKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Invalid slot name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot `{0}`, expected e.g. `Integer1`..`Integer{max}`", max = SLOTS_PER_KIND)]
pub struct SlotParseError(pub String);

/// Address of one slot column, written `<Kind><1-based index>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotId {
    kind: SlotKind,
    index: u8,
}

impl SlotId {
    /// # Errors
    /// Returns error if `index` is not within `1..=SLOTS_PER_KIND`.
    pub fn new(kind: SlotKind, index: u8) -> Result<Self, SlotParseError> {
        if (1..=SLOTS_PER_KIND).contains(&index) {
            Ok(Self { kind, index })
        } else {
            Err(SlotParseError(format!("{kind}{index}")))
        }
    }

    /// Kind of values the slot holds
    #[inline]
    #[must_use]
    pub fn kind(self) -> SlotKind {
        self.kind
    }

    /// 1-based index within its kind
    #[inline]
    #[must_use]
    pub fn index(self) -> u8 {
        self.index
    }

    fn offset(self) -> usize {
        usize::from(self.index - 1)
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.index)
    }
}

impl FromStr for SlotId {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SlotParseError(s.to_string());
        let split = s.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (name, digits) = s.split_at(split);
        let kind = SlotKind::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(invalid)?;
        let index = digits.parse::<u8>().map_err(|_| invalid())?;
        Self::new(kind, index).map_err(|_| invalid())
    }
}

impl TryFrom<String> for SlotId {
    type Error = SlotParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotId> for String {
    fn from(slot: SlotId) -> Self {
        slot.to_string()
    }
}

/// Primitive value held by a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SlotValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Binary(Vec<u8>),
}

impl SlotValue {
    /// Slot kind able to hold this value
    #[must_use]
    pub fn kind(&self) -> SlotKind {
        match self {
            Self::Integer(_) => SlotKind::Integer,
            Self::Float(_) => SlotKind::Float,
            Self::Text(_) => SlotKind::Text,
            Self::Boolean(_) => SlotKind::Boolean,
            Self::Binary(_) => SlotKind::Binary,
        }
    }
}

/// One generic storage row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageSlots {
    integers: [Option<i64>; SLOTS_PER_KIND as usize],
    floats: [Option<f64>; SLOTS_PER_KIND as usize],
    texts: [Option<String>; SLOTS_PER_KIND as usize],
    booleans: [Option<bool>; SLOTS_PER_KIND as usize],
    binaries: [Option<Vec<u8>>; SLOTS_PER_KIND as usize],
}

impl StorageSlots {
    /// Empty row
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a slot, `None` if unset
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<SlotValue> {
        let i = slot.offset();
        match slot.kind {
            SlotKind::Integer => self.integers[i].map(SlotValue::Integer),
            SlotKind::Float => self.floats[i].map(SlotValue::Float),
            SlotKind::Text => self.texts[i].clone().map(SlotValue::Text),
            SlotKind::Boolean => self.booleans[i].map(SlotValue::Boolean),
            SlotKind::Binary => self.binaries[i].clone().map(SlotValue::Binary),
        }
    }

    /// Store a value in its slot
    ///
    /// # Errors
    /// Returns the value back if its kind does not match the slot.
    pub fn set(&mut self, slot: SlotId, value: SlotValue) -> Result<(), SlotValue> {
        let i = slot.offset();
        match (slot.kind, value) {
            (SlotKind::Integer, SlotValue::Integer(v)) => self.integers[i] = Some(v),
            (SlotKind::Float, SlotValue::Float(v)) => self.floats[i] = Some(v),
            (SlotKind::Text, SlotValue::Text(v)) => self.texts[i] = Some(v),
            (SlotKind::Boolean, SlotValue::Boolean(v)) => self.booleans[i] = Some(v),
            (SlotKind::Binary, SlotValue::Binary(v)) => self.binaries[i] = Some(v),
            (_, other) => return Err(other),
        }
        Ok(())
    }

    /// Unset a slot
    pub fn clear(&mut self, slot: SlotId) {
        let i = slot.offset();
        match slot.kind {
            SlotKind::Integer => self.integers[i] = None,
            SlotKind::Float => self.floats[i] = None,
            SlotKind::Text => self.texts[i] = None,
            SlotKind::Boolean => self.booleans[i] = None,
            SlotKind::Binary => self.binaries[i] = None,
        }
    }

    /// True if no slot holds a value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
