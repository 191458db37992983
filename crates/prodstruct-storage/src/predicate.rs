//! Query predicates over declared properties and over storage slots
//!
//! The same boolean structure is used on both sides; only the leaves differ.

use crate::slots::{SlotId, SlotValue, StorageSlots};
use prodstruct_model::{PropertyHost, PropertyValue, ValueKind};
use serde::{Deserialize, Serialize};

/// Boolean expression tree with comparisons at the leaves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Predicate<L> {
    And(Box<Predicate<L>>, Box<Predicate<L>>),
    Or(Box<Predicate<L>>, Box<Predicate<L>>),
    Not(Box<Predicate<L>>),
    Leaf(L),
}

impl<L> Predicate<L> {
    /// Both sides hold
    pub fn and(a: Self, b: Self) -> Self {
        Self::And(Box::new(a), Box::new(b))
    }

    /// Either side holds
    pub fn or(a: Self, b: Self) -> Self {
        Self::Or(Box::new(a), Box::new(b))
    }

    /// Negation
    pub fn negate(a: Self) -> Self {
        Self::Not(Box::new(a))
    }

    /// Single comparison
    pub fn leaf(l: L) -> Self {
        Self::Leaf(l)
    }

    /// Replace every leaf, keeping the tree shape
    ///
    /// # Errors
    /// Returns the first error produced by `f`.
    pub fn try_map<M, E, F>(&self, f: &mut F) -> Result<Predicate<M>, E>
    where
        F: FnMut(&L) -> Result<M, E>,
    {
        Ok(match self {
            Self::And(a, b) => Predicate::and(a.try_map(f)?, b.try_map(f)?),
            Self::Or(a, b) => Predicate::or(a.try_map(f)?, b.try_map(f)?),
            Self::Not(a) => Predicate::negate(a.try_map(f)?),
            Self::Leaf(l) => Predicate::Leaf(f(l)?),
        })
    }

    /// Leaves in left-to-right order
    #[must_use]
    pub fn leaves(&self) -> Vec<&L> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a L>) {
        match self {
            Self::And(a, b) | Self::Or(a, b) => {
                a.collect_leaves(out);
                b.collect_leaves(out);
            }
            Self::Not(a) => a.collect_leaves(out),
            Self::Leaf(l) => out.push(l),
        }
    }

    /// Evaluate with `leaf` deciding each comparison
    pub fn evaluate<F>(&self, leaf: &F) -> bool
    where
        F: Fn(&L) -> bool,
    {
        match self {
            Self::And(a, b) => a.evaluate(leaf) && b.evaluate(leaf),
            Self::Or(a, b) => a.evaluate(leaf) || b.evaluate(leaf),
            Self::Not(a) => !a.evaluate(leaf),
            Self::Leaf(l) => leaf(l),
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Substring match, text only
    Contains,
}

impl CompareOp {
    /// Every operator
    pub const ALL: [Self; 7] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::Contains,
    ];

    /// True if the operator is meaningful for a declared kind
    ///
    /// Enums only support equality since their slot encoding may be an index.
    #[must_use]
    pub fn applies_to(self, kind: &ValueKind) -> bool {
        match self {
            Self::Eq | Self::Ne => true,
            Self::Contains => matches!(kind, ValueKind::Text),
            Self::Lt | Self::Le | Self::Gt | Self::Ge => matches!(
                kind,
                ValueKind::Int32 | ValueKind::Int64 | ValueKind::Float | ValueKind::Text
            ),
        }
    }

    fn compare<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Contains => false,
        }
    }

    fn compare_text(self, lhs: &str, rhs: &str) -> bool {
        match self {
            Self::Contains => lhs.contains(rhs),
            _ => self.compare(lhs, rhs),
        }
    }
}

/// Leaf comparing a declared property with a captured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyComparison {
    /// Declared property name
    pub property: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Right-hand side
    pub value: PropertyValue,
}

impl PropertyComparison {
    /// Comparison of `property` with `value`
    pub fn new(property: impl Into<String>, op: CompareOp, value: impl Into<PropertyValue>) -> Self {
        Self {
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluate against an in-memory entity
    ///
    /// Undeclared properties, inapplicable operators and values that do not
    /// coerce into the declared kind never match.
    pub fn matches<H: PropertyHost + ?Sized>(&self, host: &H) -> bool {
        let Some(def) = host
            .declared_properties()
            .iter()
            .find(|d| d.name == self.property)
        else {
            return false;
        };
        if !self.op.applies_to(&def.kind) {
            return false;
        }
        let Ok(rhs) = def.kind.coerce(self.value.clone()) else {
            return false;
        };
        match (host.property(&self.property), &rhs) {
            (Some(PropertyValue::Boolean(a)), PropertyValue::Boolean(b)) => self.op.compare(a, b),
            (Some(PropertyValue::Integer(a)), PropertyValue::Integer(b)) => self.op.compare(a, b),
            (Some(PropertyValue::Float(a)), PropertyValue::Float(b)) => self.op.compare(a, b),
            (Some(PropertyValue::Text(a)), PropertyValue::Text(b)) => self.op.compare_text(a, b),
            (Some(PropertyValue::Binary(a)), PropertyValue::Binary(b)) => self.op.compare(a, b),
            _ => false,
        }
    }
}

/// Leaf comparing a storage slot with a primitive value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotComparison {
    /// Compared slot
    pub slot: SlotId,
    /// Comparison operator
    pub op: CompareOp,
    /// Right-hand side in slot form
    pub value: SlotValue,
    /// Value an unset slot stands for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unset: Option<SlotValue>,
}

impl SlotComparison {
    /// Evaluate against a stored row
    ///
    /// An unset slot compares as [`Self::unset`], and never matches when
    /// that is `None`.
    #[must_use]
    pub fn matches(&self, row: &StorageSlots) -> bool {
        match (row.get(self.slot).or_else(|| self.unset.clone()), &self.value) {
            (Some(SlotValue::Integer(a)), SlotValue::Integer(b)) => self.op.compare(&a, b),
            (Some(SlotValue::Float(a)), SlotValue::Float(b)) => self.op.compare(&a, b),
            (Some(SlotValue::Text(a)), SlotValue::Text(b)) => self.op.compare_text(&a, b),
            (Some(SlotValue::Boolean(a)), SlotValue::Boolean(b)) => self.op.compare(&a, b),
            (Some(SlotValue::Binary(a)), SlotValue::Binary(b)) => self.op.compare(&a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: i64) -> Predicate<i64> {
        Predicate::leaf(n)
    }

    #[test]
    fn try_map_keeps_shape() {
        let p = Predicate::and(leaf(1), Predicate::negate(Predicate::or(leaf(2), leaf(3))));
        let mapped: Predicate<String> = p
            .try_map(&mut |n| Ok::<_, ()>(n.to_string()))
            .unwrap();
        assert_eq!(
            mapped,
            Predicate::and(
                Predicate::leaf("1".to_string()),
                Predicate::negate(Predicate::or(
                    Predicate::leaf("2".to_string()),
                    Predicate::leaf("3".to_string())
                ))
            )
        );
        assert_eq!(p.leaves(), [&1, &2, &3]);
    }

    #[test]
    fn try_map_stops_on_error() {
        let p = Predicate::or(leaf(1), leaf(-1));
        let result: Result<Predicate<i64>, i64> =
            p.try_map(&mut |n| if *n < 0 { Err(*n) } else { Ok(*n) });
        assert_eq!(result, Err(-1));
    }

    #[test]
    fn evaluate_follows_boolean_structure() {
        let p = Predicate::and(leaf(1), Predicate::negate(leaf(0)));
        assert!(p.evaluate(&|n| *n == 1));
        assert!(!p.evaluate(&|n| *n == 0 || *n == 1));
    }

    #[test]
    fn slot_comparison_on_unset_slot_uses_unset_value() {
        let slot: SlotId = "Text1".parse().unwrap();
        let cmp = SlotComparison {
            slot,
            op: CompareOp::Ne,
            value: SlotValue::Text("a".into()),
            unset: None,
        };
        let mut row = StorageSlots::new();
        assert!(!cmp.matches(&row));
        let defaulted = SlotComparison {
            unset: Some(SlotValue::Text(String::new())),
            ..cmp.clone()
        };
        assert!(defaulted.matches(&row));
        row.set(slot, SlotValue::Text("abc".into())).unwrap();
        assert!(cmp.matches(&row));
        let contains = SlotComparison {
            op: CompareOp::Contains,
            value: SlotValue::Text("bc".into()),
            ..cmp
        };
        assert!(contains.matches(&row));
    }

    #[test]
    fn ordering_is_not_applicable_to_enums() {
        let kind = ValueKind::Enum(vec!["A".into()]);
        assert!(CompareOp::Eq.applies_to(&kind));
        assert!(!CompareOp::Lt.applies_to(&kind));
        assert!(!CompareOp::Contains.applies_to(&ValueKind::Int32));
        assert!(!CompareOp::Ge.applies_to(&ValueKind::Boolean));
    }
}
