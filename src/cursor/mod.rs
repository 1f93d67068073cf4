//! Keyset cursor predicates
//!
//! - [`cast`]: allow-listed cast keywords
//! - [`field`]: cursor fields and comparison directions
//! - [`predicate`]: the tuple-comparison predicate builder
//! - [`render`]: SQL dialects and predicate serialization
//! - [`adapter`]: sort state to cursor fields, per entity kind
//! - [`legacy`]: date/identifier adapter and filter hooks
//! - [`token`]: opaque cursor tokens

pub mod adapter;
pub mod cast;
pub mod eval;
pub mod field;
pub mod legacy;
pub mod predicate;
pub mod render;
pub mod token;

pub use adapter::{CursorAdapter, EntityCursor, MetaAliases, MetaJoin, OrderKey};
pub use cast::{CastKeyword, resolve_cast};
pub use field::{
    ColumnRef, CompareDirection, CompareOp, CursorField, CursorFieldList, FieldType, SqlValue,
};
pub use legacy::LegacyCursor;
pub use predicate::{Operand, Predicate, PredicateBuilder};
pub use render::{Dialect, MySql, Sqlite, dialect_by_name, predicate_text};
pub use token::{CursorToken, decode_cursor, encode_cursor};
