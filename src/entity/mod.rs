//! Entity kinds, table descriptors and the entity store interface
//!
//! Each list-able kind (posts, terms, comments) is described by a static
//! [`EntityDescriptor`]: its table, identifier and primary date columns, the
//! column prefix sort keys are resolved against, and its metadata table.
//! [`EntitySchema`] binds a descriptor to a table prefix.

mod descriptors;
mod memory;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::cursor::field::ColumnRef;

pub use descriptors::{COMMENT, POST, TERM};
pub use memory::MemoryStore;

/// Kind of content the cursor points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Post,
    Term,
    Comment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Post, EntityKind::Term, EntityKind::Comment];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Post => "post",
            EntityKind::Term => "term",
            EntityKind::Comment => "comment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == value)
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Post => &POST,
            EntityKind::Term => &TERM,
            EntityKind::Comment => &COMMENT,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column definition for an entity table.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: &'static str,
    /// SQLite column type (TEXT, INTEGER, REAL, BLOB)
    pub sql_type: &'static str,
    /// Whether the column can be NULL
    pub nullable: bool,
    /// Whether this is the primary key
    pub is_primary_key: bool,
    /// Default value expression (e.g., "''")
    pub default: Option<&'static str>,
    /// Cast hint used when the column is a sort key
    pub cast: Option<&'static str>,
}

impl ColumnDef {
    /// Generate the column definition SQL
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);

        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY");
        }

        if !self.nullable && !self.is_primary_key {
            sql.push_str(" NOT NULL");
        }

        if let Some(default) = self.default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }

        sql
    }

    /// Value a row holds when the column was never written, unquoted.
    pub fn default_value(&self) -> Option<&'static str> {
        self.default.map(|d| d.trim_matches('\''))
    }
}

/// Static description of an entity kind's storage.
#[derive(Debug)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    /// Table name without prefix (e.g., "posts")
    pub table: &'static str,
    /// Unique identifier column (e.g., "ID")
    pub id_column: &'static str,
    /// Primary date-like column, if the kind has one
    pub date_column: Option<&'static str>,
    /// Prefix sort keys are resolved with (`<prefix>_<key>`)
    pub column_prefix: &'static str,
    /// Metadata table name without prefix (e.g., "postmeta")
    pub meta_table: &'static str,
    /// Column of the metadata table pointing at the entity
    pub meta_object_column: &'static str,
    pub columns: &'static [ColumnDef],
}

/// An entity descriptor bound to a table prefix.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    descriptor: &'static EntityDescriptor,
    table_prefix: String,
}

impl EntitySchema {
    pub fn new(kind: EntityKind, table_prefix: impl Into<String>) -> Self {
        Self {
            descriptor: kind.descriptor(),
            table_prefix: table_prefix.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.descriptor.kind
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    /// Prefixed table name (e.g., "wp_posts")
    pub fn table(&self) -> String {
        format!("{}{}", self.table_prefix, self.descriptor.table)
    }

    /// Prefixed metadata table name (e.g., "wp_postmeta")
    pub fn meta_table(&self) -> String {
        format!("{}{}", self.table_prefix, self.descriptor.meta_table)
    }

    pub fn id_column(&self) -> &'static str {
        self.descriptor.id_column
    }

    pub fn id_ref(&self) -> ColumnRef {
        ColumnRef::new(self.table(), self.descriptor.id_column)
    }

    pub fn date_ref(&self) -> Option<ColumnRef> {
        self.descriptor
            .date_column
            .map(|column| ColumnRef::new(self.table(), column))
    }

    pub fn column_ref(&self, column: &str) -> ColumnRef {
        ColumnRef::new(self.table(), column)
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.descriptor.columns.iter().find(|c| c.name == name)
    }

    /// Column a sort key names: `<prefix>_<key>` first, then the bare key.
    pub fn resolve_column(&self, key: &str) -> Option<&'static ColumnDef> {
        self.column(&format!("{}_{}", self.descriptor.column_prefix, key))
            .or_else(|| self.column(key))
    }

    /// Whether a sort key names the unique identifier.
    pub fn is_identifier_key(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case("id") || key == self.descriptor.id_column
    }

    /// Generate CREATE TABLE IF NOT EXISTS SQL for the entity table
    pub fn create_table_sql(&self) -> String {
        let column_defs: Vec<String> = self.descriptor.columns.iter().map(|c| c.to_sql()).collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            self.table(),
            column_defs.join(",\n  ")
        )
    }

    /// Generate CREATE TABLE IF NOT EXISTS SQL for the metadata table
    pub fn create_meta_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  meta_id INTEGER PRIMARY KEY,\n  \
             {} INTEGER NOT NULL,\n  meta_key TEXT,\n  meta_value TEXT\n)",
            self.meta_table(),
            self.descriptor.meta_object_column
        )
    }
}

/// A resolved entity row: attribute values plus attached metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub kind: EntityKind,
    pub id: i64,
    attributes: BTreeMap<String, String>,
    meta: BTreeMap<String, String>,
}

impl Item {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(kind.descriptor().id_column.to_string(), id.to_string());
        Self {
            kind,
            id,
            attributes,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_meta(key, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        // First value wins, like a single-value metadata read
        self.meta.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Attribute value, `None` when missing or empty.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Stored attribute value, empty strings included.
    pub fn stored_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Stored metadata value, empty strings included.
    pub fn stored_meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// All attribute values, including empty ones.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All metadata values, including empty ones.
    pub fn meta_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.meta.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn primary_date(&self) -> Option<&str> {
        self.kind
            .descriptor()
            .date_column
            .and_then(|column| self.attribute(column))
    }
}

/// Source of cursor items.
///
/// Errors are the store's own and are propagated unchanged.
#[async_trait]
pub trait EntityStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load one item by identifier, `None` when it no longer exists.
    async fn resolve_item(
        &self,
        schema: &EntitySchema,
        id: i64,
    ) -> Result<Option<Item>, Self::Error>;
}
