//! Table descriptors for the built-in entity kinds

use super::{ColumnDef, EntityDescriptor, EntityKind};

const fn column(
    name: &'static str,
    sql_type: &'static str,
    default: Option<&'static str>,
    cast: Option<&'static str>,
) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        nullable: false,
        is_primary_key: false,
        default,
        cast,
    }
}

const fn primary_key(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type: "INTEGER",
        nullable: false,
        is_primary_key: true,
        default: None,
        cast: None,
    }
}

const ZERO_DATE: Option<&str> = Some("'0000-00-00 00:00:00'");
const EMPTY: Option<&str> = Some("''");
const ZERO: Option<&str> = Some("0");

pub static POST: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Post,
    table: "posts",
    id_column: "ID",
    date_column: Some("post_date"),
    column_prefix: "post",
    meta_table: "postmeta",
    meta_object_column: "post_id",
    columns: &[
        primary_key("ID"),
        column("post_author", "INTEGER", ZERO, Some("UNSIGNED")),
        column("post_date", "TEXT", ZERO_DATE, Some("DATETIME")),
        column("post_title", "TEXT", EMPTY, None),
        column("post_excerpt", "TEXT", EMPTY, None),
        column("post_status", "TEXT", Some("'publish'"), None),
        column("post_name", "TEXT", EMPTY, None),
        column("post_modified", "TEXT", ZERO_DATE, Some("DATETIME")),
        column("post_parent", "INTEGER", ZERO, Some("UNSIGNED")),
        column("menu_order", "INTEGER", ZERO, Some("SIGNED")),
        column("post_type", "TEXT", Some("'post'"), None),
        column("comment_count", "INTEGER", ZERO, Some("SIGNED")),
    ],
};

pub static TERM: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Term,
    table: "terms",
    id_column: "term_id",
    date_column: None,
    column_prefix: "term",
    meta_table: "termmeta",
    meta_object_column: "term_id",
    columns: &[
        primary_key("term_id"),
        column("name", "TEXT", EMPTY, None),
        column("slug", "TEXT", EMPTY, None),
        column("term_group", "INTEGER", ZERO, Some("SIGNED")),
    ],
};

pub static COMMENT: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Comment,
    table: "comments",
    id_column: "comment_ID",
    date_column: Some("comment_date"),
    column_prefix: "comment",
    meta_table: "commentmeta",
    meta_object_column: "comment_id",
    columns: &[
        primary_key("comment_ID"),
        column("comment_post_ID", "INTEGER", ZERO, Some("UNSIGNED")),
        column("comment_author", "TEXT", EMPTY, None),
        column("comment_date", "TEXT", ZERO_DATE, Some("DATETIME")),
        column("comment_content", "TEXT", EMPTY, None),
        column("comment_karma", "INTEGER", ZERO, Some("SIGNED")),
        column("comment_approved", "TEXT", Some("'1'"), None),
        column("comment_parent", "INTEGER", ZERO, Some("UNSIGNED")),
        column("user_id", "INTEGER", ZERO, Some("UNSIGNED")),
    ],
};
