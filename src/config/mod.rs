//! Configuration management

use std::env;

use anyhow::{Context, Result, bail};

use crate::cursor::render::{Dialect, dialect_by_name};

/// Cursor pagination configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct CursorConfig {
    /// Database URL, e.g. `sqlite://./data/wordpress.db`
    pub database_url: String,

    /// Prefix applied to every entity and metadata table
    pub table_prefix: String,

    /// Page size when neither `first` nor `last` is given
    pub default_page_size: i64,

    /// Upper bound for `first` / `last`
    pub max_page_size: i64,

    /// Dialect predicates are printed in (`mysql` or `sqlite`)
    pub sql_dialect: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            table_prefix: "wp_".to_string(),
            default_page_size: 10,
            max_page_size: 100,
            sql_dialect: "sqlite".to_string(),
        }
    }
}

impl CursorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_page_size = match lookup("DEFAULT_PAGE_SIZE") {
            Some(v) => v.trim().parse().context("Invalid DEFAULT_PAGE_SIZE")?,
            None => defaults.default_page_size,
        };

        let max_page_size = match lookup("MAX_PAGE_SIZE") {
            Some(v) => v.trim().parse().context("Invalid MAX_PAGE_SIZE")?,
            None => defaults.max_page_size,
        };

        if max_page_size < 1 {
            bail!("MAX_PAGE_SIZE must be at least 1");
        }

        let sql_dialect = lookup("SQL_DIALECT").unwrap_or(defaults.sql_dialect);
        if dialect_by_name(&sql_dialect).is_none() {
            bail!("Unsupported SQL_DIALECT '{}' (expected mysql or sqlite)", sql_dialect);
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),

            table_prefix: lookup("TABLE_PREFIX").unwrap_or(defaults.table_prefix),

            default_page_size,
            max_page_size,
            sql_dialect,
        })
    }

    /// Clamp a requested page size to `[1, max_page_size]`
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        dialect_by_name(&self.sql_dialect).unwrap_or(&crate::cursor::render::Sqlite)
    }
}
