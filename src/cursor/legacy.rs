//! Single-key cursor adapter and per-kind filter hooks
//!
//! Compares `(date, id)` through a negated-opposite identity instead of the
//! recursive tuple form:
//!
//! ```text
//! date >= cd AND NOT (date <= cd AND id <= cid)
//! ```
//!
//! Used when the cursor item can no longer be resolved (identifier only) and
//! by the `*_where` hooks that extend an existing filter clause.

use tracing::debug;

use super::field::{CompareDirection, SqlValue};
use super::predicate::Predicate;
use super::render::Dialect;
use crate::entity::{EntityKind, EntitySchema, EntityStore, Item};

/// Cursor adapter comparing on the primary date and identifier only.
#[derive(Debug, Clone)]
pub struct LegacyCursor {
    schema: EntitySchema,
}

impl LegacyCursor {
    pub fn new(schema: EntitySchema) -> Self {
        Self { schema }
    }

    /// Predicate for a cursor item, or for a bare identifier when the item is gone.
    pub fn predicate(
        &self,
        item: Option<&Item>,
        cursor_id: i64,
        direction: CompareDirection,
    ) -> Predicate {
        let op = direction.op();
        let id = self.schema.id_ref();

        let date = item.and_then(|item| Some((self.schema.date_ref()?, item.primary_date()?)));
        let Some((date, cursor_date)) = date else {
            return Predicate::column(id, op, cursor_id);
        };

        let cursor_date = SqlValue::from(cursor_date);
        let opposite = op.opposite().inclusive();
        Predicate::and([
            Predicate::column(date.clone(), op.inclusive(), cursor_date.clone()),
            Predicate::not(Predicate::and([
                Predicate::column(date, opposite, cursor_date),
                Predicate::column(id, opposite, cursor_id),
            ])),
        ])
    }

    /// Resolve the cursor item and build its predicate.
    pub async fn get_predicate<S: EntityStore>(
        &self,
        store: &S,
        cursor_id: i64,
        direction: CompareDirection,
    ) -> Result<Predicate, S::Error> {
        let item = store.resolve_item(&self.schema, cursor_id).await?;
        if item.is_none() {
            debug!(
                kind = %self.schema.kind(),
                cursor_id,
                "Cursor item not found, comparing on identifier"
            );
        }
        Ok(self.predicate(item.as_ref(), cursor_id, direction))
    }
}

/// Filter hook for post lists.
pub async fn posts_where<S: EntityStore>(
    store: &S,
    where_clause: &str,
    table_prefix: &str,
    cursor_id: Option<i64>,
    direction: CompareDirection,
    dialect: &dyn Dialect,
) -> Result<String, S::Error> {
    let schema = EntitySchema::new(EntityKind::Post, table_prefix);
    append_predicate(store, schema, where_clause, cursor_id, direction, dialect).await
}

/// Filter hook for term lists.
pub async fn terms_where<S: EntityStore>(
    store: &S,
    where_clause: &str,
    table_prefix: &str,
    cursor_id: Option<i64>,
    direction: CompareDirection,
    dialect: &dyn Dialect,
) -> Result<String, S::Error> {
    let schema = EntitySchema::new(EntityKind::Term, table_prefix);
    append_predicate(store, schema, where_clause, cursor_id, direction, dialect).await
}

/// Filter hook for comment lists.
pub async fn comments_where<S: EntityStore>(
    store: &S,
    where_clause: &str,
    table_prefix: &str,
    cursor_id: Option<i64>,
    direction: CompareDirection,
    dialect: &dyn Dialect,
) -> Result<String, S::Error> {
    let schema = EntitySchema::new(EntityKind::Comment, table_prefix);
    append_predicate(store, schema, where_clause, cursor_id, direction, dialect).await
}

async fn append_predicate<S: EntityStore>(
    store: &S,
    schema: EntitySchema,
    where_clause: &str,
    cursor_id: Option<i64>,
    direction: CompareDirection,
    dialect: &dyn Dialect,
) -> Result<String, S::Error> {
    let Some(cursor_id) = cursor_id else {
        return Ok(where_clause.to_string());
    };
    let predicate = LegacyCursor::new(schema)
        .get_predicate(store, cursor_id, direction)
        .await?;
    Ok(format!("{} AND {}", where_clause, predicate.to_sql(dialect)))
}
