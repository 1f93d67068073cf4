//! Entity cursor adapter
//!
//! Translates the active sort of a list query plus the cursor item's values
//! into a [`CursorFieldList`] and hands it to the [`PredicateBuilder`].
//!
//! Sort keys resolve, in order, to:
//! 1. the identifier (`id` or the identifier column)
//! 2. an entity column (`<prefix>_<key>`, then `<key>`)
//! 3. a metadata value, through the generic `meta_value` alias or a named
//!    metadata clause of the query
//!
//! Keys that resolve to nothing are dropped. The tuple always ends in the
//! identifier. The same resolution drives the list query's ORDER BY.
//!
//! Metadata-backed keys reference repeated joins of the metadata table. The
//! join aliases are handed out by [`MetaAliases`] in declaration order, the
//! same way the executor names its joins.

use tracing::debug;

use super::cast::{CastKeyword, resolve_cast};
use super::field::{ColumnRef, CompareDirection, CursorField, CursorFieldList, FieldType};
use super::legacy::LegacyCursor;
use super::predicate::{Predicate, PredicateBuilder};
use super::render::Dialect;
use crate::entity::{ColumnDef, EntitySchema, EntityStore, Item};
use crate::query::{ListQueryState, OrderDirection, SortSpec};

/// Sort key naming the generic metadata value of the query.
pub const META_VALUE_KEY: &str = "meta_value";
/// Same as [`META_VALUE_KEY`], compared numerically.
pub const META_VALUE_NUM_KEY: &str = "meta_value_num";

/// Hands out join aliases for the metadata table.
///
/// The first join uses the table name itself, later ones `mt1`, `mt2`, ...
/// One allocator lives for one predicate or query build.
#[derive(Debug, Clone)]
pub struct MetaAliases {
    table: String,
    allocated: usize,
}

impl MetaAliases {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            allocated: 0,
        }
    }

    /// Alias for the next metadata join.
    pub fn next_alias(&mut self) -> String {
        let alias = match self.allocated {
            0 => self.table.clone(),
            n => format!("mt{}", n),
        };
        self.allocated += 1;
        alias
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

/// A metadata join a sort key needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaJoin {
    pub alias: String,
    pub meta_key: String,
    /// Name of the metadata clause the key came from, if any
    pub clause: Option<String>,
}

/// One ORDER BY term, mirroring a cursor field.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderKey {
    pub column: ColumnRef,
    pub cast: Option<CastKeyword>,
    pub direction: OrderDirection,
    pub join: Option<MetaJoin>,
}

impl OrderKey {
    /// ORDER BY expression, cast through the dialect when needed.
    pub fn expression(&self, dialect: &dyn Dialect) -> String {
        match self.cast {
            Some(cast) => format!("CAST({} AS {})", self.column, dialect.cast_type(cast)),
            None => self.column.to_string(),
        }
    }
}

/// Where a sort key's value comes from.
#[derive(Debug, Clone)]
enum SortSource {
    Identifier,
    Column(&'static ColumnDef),
    Meta {
        join: MetaJoin,
        cast_hint: Option<String>,
    },
}

/// Per-kind translation of sort state into cursor fields.
pub trait CursorAdapter {
    fn schema(&self) -> &EntitySchema;

    /// Cursor fields for `item` under the active sort, ending in the identifier.
    fn resolve_sort_fields(&self, item: &Item, state: &ListQueryState) -> CursorFieldList;

    /// Predicate for the cursor item; identifier-only when the item is gone.
    fn predicate_for(
        &self,
        item: Option<&Item>,
        cursor_id: i64,
        state: &ListQueryState,
    ) -> Predicate {
        let direction = CompareDirection::from(state.direction);
        let Some(item) = item else {
            debug!(
                kind = %self.schema().kind(),
                cursor_id,
                "Cursor item not found, falling back to identifier comparison"
            );
            return LegacyCursor::new(self.schema().clone()).predicate(None, cursor_id, direction);
        };

        let fields = self.resolve_sort_fields(item, state);
        PredicateBuilder::new(direction)
            .build(fields.as_slice())
            .unwrap_or_else(|| {
                Predicate::column(self.schema().id_ref(), direction.op(), cursor_id)
            })
    }
}

/// Cursor adapter for any entity kind with a descriptor.
#[derive(Debug, Clone)]
pub struct EntityCursor {
    schema: EntitySchema,
}

impl EntityCursor {
    pub fn new(schema: EntitySchema) -> Self {
        Self { schema }
    }

    /// Fresh alias allocator for this entity's metadata table.
    pub fn meta_aliases(&self) -> MetaAliases {
        MetaAliases::new(self.schema.meta_table())
    }

    /// Resolve the cursor item from the store and build its predicate.
    ///
    /// Store errors are returned unchanged.
    pub async fn get_predicate<S: EntityStore>(
        &self,
        store: &S,
        cursor_id: i64,
        state: &ListQueryState,
    ) -> Result<Predicate, S::Error> {
        let item = store.resolve_item(&self.schema, cursor_id).await?;
        Ok(self.predicate_for(item.as_ref(), cursor_id, state))
    }

    /// ORDER BY terms matching the cursor fields of the same state.
    ///
    /// Metadata joins draw from `aliases`.
    pub fn order_keys(&self, state: &ListQueryState, aliases: &mut MetaAliases) -> Vec<OrderKey> {
        let default = CompareDirection::from(state.direction).order();
        let sources = self.sort_sources(state, aliases);
        let ends_unique = matches!(sources.last(), Some((SortSource::Identifier, _)));

        let mut keys: Vec<OrderKey> = sources
            .into_iter()
            .map(|(source, direction)| self.order_key(source, direction.unwrap_or(default)))
            .collect();
        if !ends_unique {
            keys.push(self.order_key(SortSource::Identifier, default));
        }
        keys
    }

    fn order_key(&self, source: SortSource, direction: OrderDirection) -> OrderKey {
        match source {
            SortSource::Identifier => OrderKey {
                column: self.schema.id_ref(),
                cast: None,
                direction,
                join: None,
            },
            SortSource::Column(column) => OrderKey {
                column: self.schema.column_ref(column.name),
                cast: column.cast.map(resolve_cast).filter(|c| *c != CastKeyword::Char),
                direction,
                join: None,
            },
            SortSource::Meta { join, cast_hint } => OrderKey {
                column: ColumnRef::new(join.alias.clone(), "meta_value"),
                cast: cast_hint
                    .as_deref()
                    .map(resolve_cast)
                    .filter(|c| *c != CastKeyword::Char),
                direction,
                join: Some(join),
            },
        }
    }

    /// Value sources of the active sort, highest priority first.
    ///
    /// Only the schema and the state decide a source, never the cursor
    /// item, so cursor fields and ORDER BY terms of one state line up key
    /// for key and alias for alias. Falls back to the primary date when no
    /// declared key resolves.
    fn sort_sources(
        &self,
        state: &ListQueryState,
        aliases: &mut MetaAliases,
    ) -> Vec<(SortSource, Option<OrderDirection>)> {
        let mut sources = Vec::new();
        for (key, direction) in declared_keys(state) {
            match self.resolve_source(&key, state, aliases) {
                Some(source) => sources.push((source, direction)),
                None => debug!(
                    kind = %self.schema.kind(),
                    key = %key,
                    "Dropping unresolvable sort key"
                ),
            }
        }

        if sources.is_empty() {
            let date = self
                .schema
                .descriptor()
                .date_column
                .and_then(|c| self.schema.column(c));
            if let Some(date) = date {
                sources.push((SortSource::Column(date), None));
            }
        }
        sources
    }

    /// Resolve a declared sort key to its value source.
    ///
    /// An entity column wins over a metadata clause of the same name.
    fn resolve_source(
        &self,
        key: &str,
        state: &ListQueryState,
        aliases: &mut MetaAliases,
    ) -> Option<SortSource> {
        if self.schema.is_identifier_key(key) {
            return Some(SortSource::Identifier);
        }

        if let Some(column) = self.schema.resolve_column(key) {
            return Some(SortSource::Column(column));
        }

        let (meta_key, cast_hint, clause) = match key {
            META_VALUE_KEY | META_VALUE_NUM_KEY => {
                let meta_key = state.meta_key.clone()?;
                let cast_hint = state
                    .meta_type
                    .clone()
                    .or_else(|| (key == META_VALUE_NUM_KEY).then(|| "NUMERIC".to_string()));
                (meta_key, cast_hint, None)
            }
            _ => {
                let clause = state.find_clause(key)?;
                (clause.key.clone(), clause.meta_type.clone(), Some(clause.name.clone()))
            }
        };

        Some(SortSource::Meta {
            join: MetaJoin {
                alias: aliases.next_alias(),
                meta_key,
                clause,
            },
            cast_hint,
        })
    }

    /// Cursor field for a resolved source, `None` when the item has no value.
    ///
    /// Empty strings are values. A column the item never loaded holds the
    /// column default, as the stored row does.
    fn field(
        &self,
        source: SortSource,
        item: &Item,
        direction: Option<OrderDirection>,
    ) -> Option<CursorField> {
        let field = match source {
            SortSource::Identifier => CursorField::identifier(self.schema.id_ref(), item.id),
            SortSource::Column(column) => {
                let value = item
                    .stored_attribute(column.name)
                    .or_else(|| column.default_value())?;
                let field_type = column
                    .cast
                    .map(|hint| FieldType::Cast(hint.to_string()))
                    .unwrap_or_default();
                CursorField::new(self.schema.column_ref(column.name), value).with_type(field_type)
            }
            SortSource::Meta { join, cast_hint } => {
                let value = item.stored_meta(&join.meta_key)?;
                CursorField::new(ColumnRef::new(join.alias, "meta_value"), value)
                    .with_type(cast_hint.map(FieldType::Cast).unwrap_or_default())
            }
        };
        Some(field.with_direction(direction))
    }
}

impl CursorAdapter for EntityCursor {
    fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    fn resolve_sort_fields(&self, item: &Item, state: &ListQueryState) -> CursorFieldList {
        let mut aliases = self.meta_aliases();
        let mut fields = CursorFieldList::new();

        for (source, direction) in self.sort_sources(state, &mut aliases) {
            match self.field(source, item, direction) {
                Some(field) => fields.push(field),
                None => debug!(
                    kind = %self.schema.kind(),
                    id = item.id,
                    "Cursor item has no value for a sort key"
                ),
            }
        }

        let ends_unique = matches!(fields.last(), Some(f) if f.field_type == FieldType::Identifier);
        if !ends_unique {
            fields.push(CursorField::identifier(self.schema.id_ref(), item.id));
        }
        fields
    }
}

/// Declared sort keys with their explicit directions, highest priority first.
fn declared_keys(state: &ListQueryState) -> Vec<(String, Option<OrderDirection>)> {
    match &state.orderby {
        None => Vec::new(),
        Some(SortSpec::Single(key)) => vec![(key.clone(), state.order)],
        Some(SortSpec::Multi(keys)) => keys
            .iter()
            .map(|(key, direction)| (key.clone(), Some(*direction)))
            .collect(),
    }
}
