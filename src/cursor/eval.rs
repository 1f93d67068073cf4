//! In-memory evaluation of predicate trees
//!
//! Evaluates a [`Predicate`] against a single row using SQL three-valued
//! logic, so the tuple-comparison forms can be checked against synthetic
//! data without a database.

use std::cmp::Ordering;

use super::cast::CastKeyword;
use super::field::{ColumnRef, CompareOp, SqlValue};
use super::predicate::{Operand, Predicate};

impl Predicate {
    /// Evaluate against a row; `None` is SQL `UNKNOWN`.
    pub fn evaluate<F>(&self, lookup: &F) -> Option<bool>
    where
        F: Fn(&ColumnRef) -> Option<SqlValue>,
    {
        match self {
            Predicate::Compare { left, op, right } => {
                let left = resolve(left, lookup);
                let right = resolve(right, lookup);
                compare_values(&left, &right).map(|ordering| apply(*op, ordering))
            }
            Predicate::And(parts) => {
                let mut unknown = false;
                for part in parts {
                    match part.evaluate(lookup) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                if unknown { None } else { Some(true) }
            }
            Predicate::Or(parts) => {
                let mut unknown = false;
                for part in parts {
                    match part.evaluate(lookup) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                if unknown { None } else { Some(false) }
            }
            Predicate::Not(inner) => inner.evaluate(lookup).map(|b| !b),
        }
    }

    /// True only when the row satisfies the predicate (UNKNOWN filters the row out).
    pub fn matches<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&ColumnRef) -> Option<SqlValue>,
    {
        self.evaluate(lookup) == Some(true)
    }
}

fn resolve<F>(operand: &Operand, lookup: &F) -> SqlValue
where
    F: Fn(&ColumnRef) -> Option<SqlValue>,
{
    match operand {
        Operand::Column(column) => lookup(column).unwrap_or(SqlValue::Null),
        Operand::Value(value) => value.clone(),
        Operand::Cast(inner, cast) => cast_value(resolve(inner, lookup), *cast),
    }
}

fn cast_value(value: SqlValue, cast: CastKeyword) -> SqlValue {
    let Some(text) = value.as_text() else {
        return SqlValue::Null;
    };
    match cast {
        CastKeyword::Signed | CastKeyword::Unsigned => SqlValue::Int(leading_int(&text)),
        CastKeyword::Numeric { .. } | CastKeyword::Decimal(_) => {
            SqlValue::Float(text.trim().parse().unwrap_or(leading_int(&text) as f64))
        }
        _ => SqlValue::String(text),
    }
}

/// Integer prefix of a string, `0` when there is none.
fn leading_int(text: &str) -> i64 {
    let text = text.trim();
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..digits_end].parse().unwrap_or(0)
}

fn compare_values(left: &SqlValue, right: &SqlValue) -> Option<Ordering> {
    match (left, right) {
        (SqlValue::Null, _) | (_, SqlValue::Null) => None,
        (SqlValue::Int(a), SqlValue::Int(b)) => Some(a.cmp(b)),
        (SqlValue::Int(_) | SqlValue::Float(_), SqlValue::Int(_) | SqlValue::Float(_)) => {
            as_float(left)?.partial_cmp(&as_float(right)?)
        }
        _ => Some(left.as_text()?.cmp(&right.as_text()?)),
    }
}

fn as_float(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Int(i) => Some(*i as f64),
        SqlValue::Float(f) => Some(*f),
        _ => None,
    }
}

fn apply(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
        CompareOp::Eq => ordering == Ordering::Equal,
    }
}
