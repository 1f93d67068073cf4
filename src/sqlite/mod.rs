//! SQLite-backed entity store and list query execution
//!
//! The reference execution path for cursor predicates: entity rows and their
//! metadata live in WordPress-shaped tables, list queries are built with
//! bound parameters and mirror the cursor's sort in their ORDER BY.

mod list;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions};
use sqlx::{Row, Sqlite, SqlitePool};

use crate::cursor::field::SqlValue;
use crate::entity::{EntityKind, EntitySchema, EntityStore, Item};

pub use list::{ListQuery, fetch_connection};

impl SqlValue {
    /// Bind this value to a sqlx query builder at the next parameter index
    pub fn bind_to_query<'q>(
        &'q self,
        query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Null => query.bind(None::<String>),
        }
    }
}

/// Entity store over a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    table_prefix: String,
}

impl SqliteStore {
    /// Connect to a database URL
    ///
    /// In-memory databases are private to a connection, so they get a pool
    /// of one.
    pub async fn connect(database_url: &str, table_prefix: &str) -> Result<Self, sqlx::Error> {
        let in_memory = database_url.contains(":memory:");
        let mut options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            options = options
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }
        let pool = options.connect(database_url).await?;
        Ok(Self::from_pool(pool, table_prefix))
    }

    pub fn from_pool(pool: SqlitePool, table_prefix: &str) -> Self {
        Self {
            pool,
            table_prefix: table_prefix.to_string(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn schema(&self, kind: EntityKind) -> EntitySchema {
        EntitySchema::new(kind, self.table_prefix.clone())
    }

    /// Create entity and metadata tables for every kind
    pub async fn create_tables(&self) -> Result<(), sqlx::Error> {
        for kind in EntityKind::ALL {
            let schema = self.schema(kind);
            sqlx::query(&schema.create_table_sql())
                .execute(&self.pool)
                .await?;
            sqlx::query(&schema.create_meta_table_sql())
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Insert an item row and its metadata
    ///
    /// Attributes that are not columns of the entity table are ignored.
    pub async fn insert_item(&self, item: &Item) -> Result<(), sqlx::Error> {
        let schema = self.schema(item.kind);

        let (columns, values): (Vec<&str>, Vec<SqlValue>) = item
            .attributes()
            .filter(|(name, _)| schema.column(name).is_some())
            .map(|(name, value)| (name, SqlValue::from(value)))
            .unzip();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table(),
            columns.join(", "),
            placeholders.join(", ")
        );
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = value.bind_to_query(query);
        }
        query.execute(&self.pool).await?;

        let meta_sql = format!(
            "INSERT INTO {} ({}, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            schema.meta_table(),
            schema.descriptor().meta_object_column
        );
        for (key, value) in item.meta_entries() {
            sqlx::query(&meta_sql)
                .bind(item.id)
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    async fn load_meta(&self, schema: &EntitySchema, item: &mut Item) -> Result<(), sqlx::Error> {
        let sql = format!(
            "SELECT meta_key, meta_value FROM {} WHERE {} = ?1 ORDER BY meta_id",
            schema.meta_table(),
            schema.descriptor().meta_object_column
        );
        let rows = sqlx::query(&sql).bind(item.id).fetch_all(&self.pool).await?;

        for row in rows {
            let key: Option<String> = row.try_get("meta_key")?;
            let value: Option<String> = row.try_get("meta_value")?;
            if let Some(key) = key {
                item.set_meta(key, value.unwrap_or_default());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    type Error = sqlx::Error;

    async fn resolve_item(
        &self,
        schema: &EntitySchema,
        id: i64,
    ) -> Result<Option<Item>, Self::Error> {
        let columns = schema.descriptor().columns;
        let select: Vec<String> = columns
            .iter()
            .map(|c| format!("CAST({0} AS TEXT) AS {0}", c.name))
            .collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            select.join(", "),
            schema.table(),
            schema.id_column()
        );
        tracing::debug!(sql = %sql, id, "Resolving cursor item");

        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        let mut item = Item::new(schema.kind(), id);
        for column in columns {
            let value: Option<String> = row.try_get(column.name)?;
            if let Some(value) = value {
                item.set_attribute(column.name, value);
            }
        }
        self.load_meta(schema, &mut item).await?;

        Ok(Some(item))
    }
}
