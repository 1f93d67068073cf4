//! List query builder
//!
//! Builds the SELECT for one page of a keyset-paginated list: metadata joins
//! for sort keys and filter clauses, the cursor predicate as bound
//! parameters, an ORDER BY mirroring the cursor fields and `LIMIT n + 1`.

use sqlx::Row;

use super::SqliteStore;
use crate::config::CursorConfig;
use crate::cursor::adapter::{EntityCursor, OrderKey};
use crate::cursor::field::SqlValue;
use crate::cursor::predicate::Predicate;
use crate::cursor::render::Sqlite;
use crate::cursor::token::encode_cursor;
use crate::entity::{EntityKind, EntitySchema, EntityStore, Item};
use crate::error::ConnectionError;
use crate::graphql::pagination::{Connection, ConnectionArgs};
use crate::query::ListQueryState;

/// A query builder for one page of entity identifiers.
pub struct ListQuery {
    schema: EntitySchema,
    state: ListQueryState,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    order_keys: Vec<OrderKey>,
    limit: Option<i64>,
}

impl ListQuery {
    /// Create a query for `schema` under the active (already paged) state.
    pub fn new(schema: EntitySchema, state: ListQueryState) -> Self {
        let cursor = EntityCursor::new(schema.clone());
        let mut aliases = cursor.meta_aliases();
        let order_keys = cursor.order_keys(&state, &mut aliases);

        let mut query = Self {
            schema,
            state,
            joins: Vec::new(),
            where_clauses: Vec::new(),
            values: Vec::new(),
            order_keys,
            limit: None,
        };

        let mut joined_clauses = Vec::new();
        let sort_joins: Vec<_> = query
            .order_keys
            .iter()
            .filter_map(|k| k.join.clone())
            .collect();
        for join in sort_joins {
            query.join_meta(&join.alias, &join.meta_key);
            if let Some(name) = join.clause {
                let value = query.state.find_clause(&name).and_then(|c| c.value.clone());
                query.filter_meta_value(&join.alias, value);
                joined_clauses.push(name);
            }
        }

        // Filter-only clauses follow the sort joins
        let filters: Vec<_> = query
            .state
            .meta_query
            .iter()
            .filter(|c| !joined_clauses.contains(&c.name))
            .map(|c| (c.key.clone(), c.value.clone()))
            .collect();
        for (meta_key, value) in filters {
            let alias = aliases.next_alias();
            query.join_meta(&alias, &meta_key);
            query.filter_meta_value(&alias, value);
        }

        query
    }

    /// AND the cursor predicate into the WHERE clause.
    pub fn predicate(mut self, predicate: Option<&Predicate>) -> Self {
        if let Some(predicate) = predicate {
            let (sql, values) = predicate.to_sql_bound(&Sqlite, self.values.len());
            self.where_clauses.push(sql);
            self.values.extend(values);
        }
        self
    }

    /// Set limit directly.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn next_param(&mut self, value: SqlValue) -> String {
        self.values.push(value);
        format!("?{}", self.values.len())
    }

    fn join_meta(&mut self, alias: &str, meta_key: &str) {
        let meta_table = self.schema.meta_table();
        let target = if alias == meta_table {
            meta_table
        } else {
            format!("{} AS {}", meta_table, alias)
        };
        let key_param = self.next_param(meta_key.into());
        self.joins.push(format!(
            "INNER JOIN {} ON ({}.{} = {} AND {}.meta_key = {})",
            target,
            alias,
            self.schema.descriptor().meta_object_column,
            self.schema.id_ref(),
            alias,
            key_param
        ));
    }

    fn filter_meta_value(&mut self, alias: &str, value: Option<String>) {
        if let Some(value) = value {
            let param = self.next_param(value.into());
            self.where_clauses.push(format!("{}.meta_value = {}", alias, param));
        }
    }

    /// Build the SQL query string.
    pub fn build_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.schema.id_ref(), self.schema.table());

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        if !self.joins.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.schema.id_ref()));
        }

        if !self.order_keys.is_empty() {
            let order: Vec<String> = self
                .order_keys
                .iter()
                .map(|k| format!("{} {}", k.expression(&Sqlite), k.direction.to_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Execute the query and return the matching identifiers in order.
    pub async fn fetch_ids(self, pool: &sqlx::SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, params = self.values.len(), "Executing list query");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to_query(query);
        }

        let rows = query.fetch_all(pool).await?;
        rows.iter().map(|row| row.try_get::<i64, _>(0)).collect()
    }
}

/// Resolve one connection page of `kind` under `state`.
///
/// Paging backward runs the list in reverse and restores forward order
/// before returning. A cursor whose item no longer exists pages on the
/// identifier alone.
pub async fn fetch_connection(
    store: &SqliteStore,
    kind: EntityKind,
    state: &ListQueryState,
    args: &ConnectionArgs,
    config: &CursorConfig,
) -> Result<Connection<Item>, ConnectionError> {
    let request = args.page_request(kind, config)?;
    let schema = store.schema(kind);
    let state = state.paged(request.direction);

    let predicate = match request.cursor {
        Some(cursor_id) => Some(
            EntityCursor::new(schema.clone())
                .get_predicate(store, cursor_id, &state)
                .await?,
        ),
        None => None,
    };

    let ids = ListQuery::new(schema.clone(), state)
        .predicate(predicate.as_ref())
        .limit(request.limit + 1)
        .fetch_ids(store.pool())
        .await?;

    let mut items = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(item) = store.resolve_item(&schema, id).await? {
            items.push(item);
        }
    }

    Ok(Connection::from_rows(items, &request, |item| {
        encode_cursor(item.kind, item.id)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MetaClause, OrderDirection, PageDirection};
    use pretty_assertions::assert_eq;

    fn posts() -> EntitySchema {
        EntitySchema::new(EntityKind::Post, "wp_")
    }

    #[test]
    fn test_default_order() {
        let sql = ListQuery::new(posts(), ListQueryState::new()).limit(11).build_sql();
        assert_eq!(
            sql,
            "SELECT wp_posts.ID FROM wp_posts \
             ORDER BY CAST(wp_posts.post_date AS TEXT) ASC, wp_posts.ID ASC LIMIT 11"
        );
    }

    #[test]
    fn test_predicate_params_follow_join_params() {
        let state = ListQueryState::new()
            .meta_clause(MetaClause::new("price_clause", "price").with_type("NUMERIC"))
            .meta_clause(MetaClause::new("featured", "featured").with_value("yes"))
            .order_by("price_clause", Some(OrderDirection::Desc));
        let predicate =
            Predicate::column(posts().id_ref(), crate::cursor::field::CompareOp::Lt, 9i64);

        let query = ListQuery::new(posts(), state).predicate(Some(&predicate)).limit(3);
        assert_eq!(
            query.build_sql(),
            "SELECT wp_posts.ID FROM wp_posts \
             INNER JOIN wp_postmeta ON (wp_postmeta.post_id = wp_posts.ID AND wp_postmeta.meta_key = ?1) \
             INNER JOIN wp_postmeta AS mt1 ON (mt1.post_id = wp_posts.ID AND mt1.meta_key = ?2) \
             WHERE mt1.meta_value = ?3 AND (wp_posts.ID < ?4) \
             GROUP BY wp_posts.ID \
             ORDER BY CAST(wp_postmeta.meta_value AS INTEGER) DESC, wp_posts.ID ASC LIMIT 3"
        );
        assert_eq!(
            query.values(),
            &[
                SqlValue::from("price"),
                SqlValue::from("featured"),
                SqlValue::from("yes"),
                SqlValue::Int(9),
            ]
        );
    }

    #[test]
    fn test_backward_state_reverses_order() {
        let state = ListQueryState::new()
            .order_by("title", Some(OrderDirection::Asc))
            .paged(PageDirection::Backward);
        let sql = ListQuery::new(posts(), state).build_sql();
        assert!(sql.ends_with("ORDER BY wp_posts.post_title DESC, wp_posts.ID DESC"));
    }
}
