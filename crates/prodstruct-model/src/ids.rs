//! Entity identifiers
//!
//! Storage assigns ids; `0` marks an entity that has never been saved.

use serde::{Deserialize, Serialize};

/// Product type identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Id of a product that was never persisted
    pub const UNSAVED: Self = Self(0);

    /// Create id from raw value
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True for [`Self::UNSAVED`]
    #[inline]
    #[must_use]
    pub const fn is_unsaved(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for ProductId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Part link identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub i64);

impl LinkId {
    /// Id of a part link that was never persisted
    pub const UNSAVED: Self = Self(0);

    /// Create id from raw value
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True for [`Self::UNSAVED`]
    #[inline]
    #[must_use]
    pub const fn is_unsaved(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for LinkId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recipe identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl RecipeId {
    /// Id of a recipe that was never persisted
    pub const UNSAVED: Self = Self(0);

    /// Create id from raw value
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True for [`Self::UNSAVED`]
    #[inline]
    #[must_use]
    pub const fn is_unsaved(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for RecipeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workplan identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkplanId(pub i64);

impl WorkplanId {
    /// Id of a workplan that was never persisted
    pub const UNSAVED: Self = Self(0);

    /// Create id from raw value
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True for [`Self::UNSAVED`]
    #[inline]
    #[must_use]
    pub const fn is_unsaved(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for WorkplanId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for WorkplanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
