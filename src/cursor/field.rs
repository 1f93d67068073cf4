//! Cursor field types
//!
//! A [`CursorFieldList`] is the ordered tuple the predicate builder compares
//! against: one [`CursorField`] per sort key, highest priority first, ending
//! in a key that is unique per row.

use std::fmt;

use crate::query::{OrderDirection, PageDirection};

/// Represents a SQL value that can be bound to a query or inlined as a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Int(i64),
    Float(f64),
    Null,
}

impl SqlValue {
    /// Text form used for text comparison and casts.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlValue::String(s) => Some(s.clone()),
            SqlValue::Int(i) => Some(i.to_string()),
            SqlValue::Float(f) => Some(f.to_string()),
            SqlValue::Null => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

/// A column reference, qualified by its table or join alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}.{}", qualifier, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// How a field's key and value are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldType {
    /// Compared as-is, without a cast
    Identifier,
    /// Compared through the cast resolved from this hint
    Cast(String),
    /// Compared as `CHAR`
    #[default]
    Unset,
}

/// Single comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Eq => "=",
        }
    }

    /// `>` becomes `>=`, `<` becomes `<=`.
    pub fn inclusive(self) -> Self {
        match self {
            CompareOp::Gt => CompareOp::Gte,
            CompareOp::Lt => CompareOp::Lte,
            other => other,
        }
    }

    /// Mirror the operator: `>` becomes `<` and so on.
    pub fn opposite(self) -> Self {
        match self {
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Gte => CompareOp::Lte,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Lte => CompareOp::Gte,
            CompareOp::Eq => CompareOp::Eq,
        }
    }
}

/// The builder-wide comparison: `>` when paging forward, `<` when backward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompareDirection {
    #[default]
    Forward,
    Backward,
}

impl CompareDirection {
    pub fn op(self) -> CompareOp {
        match self {
            CompareDirection::Forward => CompareOp::Gt,
            CompareDirection::Backward => CompareOp::Lt,
        }
    }

    /// ORDER BY direction matching this comparison.
    pub fn order(self) -> OrderDirection {
        match self {
            CompareDirection::Forward => OrderDirection::Asc,
            CompareDirection::Backward => OrderDirection::Desc,
        }
    }
}

impl From<PageDirection> for CompareDirection {
    fn from(direction: PageDirection) -> Self {
        match direction {
            PageDirection::Forward => CompareDirection::Forward,
            PageDirection::Backward => CompareDirection::Backward,
        }
    }
}

/// One ordered comparison key taken from the cursor item.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorField {
    pub key: ColumnRef,
    pub value: SqlValue,
    pub field_type: FieldType,
    /// Per-key override of the builder's direction
    pub direction: Option<OrderDirection>,
}

impl CursorField {
    pub fn new(key: ColumnRef, value: impl Into<SqlValue>) -> Self {
        Self {
            key,
            value: value.into(),
            field_type: FieldType::Unset,
            direction: None,
        }
    }

    /// An identifier field, compared without a cast.
    pub fn identifier(key: ColumnRef, id: i64) -> Self {
        Self {
            key,
            value: SqlValue::Int(id),
            field_type: FieldType::Identifier,
            direction: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_direction(mut self, direction: Option<OrderDirection>) -> Self {
        self.direction = direction;
        self
    }

    /// Operator for this field: ASC is `>`, DESC is `<`, otherwise the builder default.
    pub fn compare_op(&self, default: CompareDirection) -> CompareOp {
        match self.direction {
            Some(OrderDirection::Asc) => CompareOp::Gt,
            Some(OrderDirection::Desc) => CompareOp::Lt,
            None => default.op(),
        }
    }
}

/// Ordered cursor fields, highest priority first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorFieldList(Vec<CursorField>);

impl CursorFieldList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: CursorField) {
        self.0.push(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[CursorField] {
        &self.0
    }

    pub fn last(&self) -> Option<&CursorField> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CursorField> {
        self.0.iter()
    }
}

impl From<Vec<CursorField>> for CursorFieldList {
    fn from(fields: Vec<CursorField>) -> Self {
        Self(fields)
    }
}

impl FromIterator<CursorField> for CursorFieldList {
    fn from_iter<T: IntoIterator<Item = CursorField>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
