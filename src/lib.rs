//! Keyset cursor pagination for a WordPress content graph
//!
//! Turns a list's sort specification and an opaque cursor into a SQL
//! predicate selecting the rows strictly after (or before) the cursor item,
//! as a lexicographic tuple comparison ending in the item identifier.
//!
//! - [`cursor`]: cast resolution, predicate building and rendering, adapters
//! - [`entity`]: entity kinds, table descriptors and the item store interface
//! - [`query`]: the active list query state
//! - [`graphql`]: Relay connection types
//! - [`sqlite`]: reference list-query execution on SQLite

pub mod config;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod graphql;
pub mod query;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::CursorConfig;
pub use error::{ConnectionError, TokenError};
