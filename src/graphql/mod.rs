//! GraphQL-facing pagination types
//!
//! The schema itself lives with the API layer; this module only provides the
//! Relay connection shapes and argument parsing for keyset-paginated lists.

pub mod pagination;

pub use pagination::{
    Connection, ConnectionArgs, Edge, OrderByInput, PageInfo, PageRequest, apply_order_by,
};
