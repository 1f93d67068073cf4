//! Keyset predicate construction
//!
//! The builder turns a [`CursorFieldList`] into a boolean expression tree
//! equivalent to a strict lexicographic tuple comparison. Serialization to a
//! concrete SQL dialect happens separately in [`super::render`].
//!
//! For fields `(a, b, id)` paging forward the tree reads:
//!
//! ```text
//! a >= va AND (a > va OR (b >= vb AND (b > vb OR id > vid)))
//! ```
//!
//! The `key >= value` guard is shared by the strict and the tie branch, so
//! the index prefix is stated once per level.

use tracing::debug;

use super::cast::{CastKeyword, resolve_cast};
use super::field::{ColumnRef, CompareDirection, CompareOp, CursorField, FieldType, SqlValue};

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(ColumnRef),
    Value(SqlValue),
    Cast(Box<Operand>, CastKeyword),
}

impl Operand {
    pub fn cast(self, keyword: CastKeyword) -> Self {
        Operand::Cast(Box::new(self), keyword)
    }
}

/// Boolean expression tree, serialized at the dialect boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(left: Operand, op: CompareOp, right: Operand) -> Self {
        Predicate::Compare { left, op, right }
    }

    /// `column <op> value`, no cast.
    pub fn column(column: ColumnRef, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Predicate::compare(Operand::Column(column), op, Operand::Value(value.into()))
    }

    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(parts.into_iter().collect())
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }
}

/// Compiles cursor fields into a keyset predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateBuilder {
    direction: CompareDirection,
}

impl PredicateBuilder {
    pub fn new(direction: CompareDirection) -> Self {
        Self { direction }
    }

    /// Build the predicate for the given fields.
    ///
    /// Returns `None` for an empty list (no filter). Every field is expected
    /// to carry a value; the last one should be unique per row.
    pub fn build(&self, fields: &[CursorField]) -> Option<Predicate> {
        let (head, tail) = fields.split_first()?;
        let op = head.compare_op(self.direction);
        let (key, value) = Self::operands(head);

        let Some(nested) = self.build(tail) else {
            return Some(Predicate::compare(key, op, value));
        };

        Some(Predicate::and([
            Predicate::compare(key.clone(), op.inclusive(), value.clone()),
            Predicate::or([Predicate::compare(key, op, value), nested]),
        ]))
    }

    /// Key and value operands for a field, cast unless it is an identifier
    /// or resolves to `CHAR`.
    fn operands(field: &CursorField) -> (Operand, Operand) {
        let key = Operand::Column(field.key.clone());
        let value = Operand::Value(field.value.clone());

        let hint = match &field.field_type {
            FieldType::Identifier => return (key, value),
            FieldType::Cast(hint) => hint.as_str(),
            FieldType::Unset => "CHAR",
        };

        match resolve_cast(hint) {
            CastKeyword::Char => {
                if !hint.trim().eq_ignore_ascii_case("CHAR") {
                    debug!(field = %field.key, "Unrecognized cast hint, comparing as CHAR");
                }
                (key, value)
            }
            cast => (key.cast(cast), value.cast(cast)),
        }
    }
}
