//! Serialization of predicate trees to backend SQL
//!
//! Two literal modes are supported: values inlined as escaped SQL literals
//! (the predicate text handed to a filter hook), or values collected as bind
//! parameters with dialect placeholders continuing an existing counter.

use super::cast::CastKeyword;
use super::field::SqlValue;
use super::predicate::{Operand, Predicate};

/// Backend-specific SQL syntax.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect (e.g., "MySQL", "SQLite").
    fn name(&self) -> &'static str;

    /// Returns the placeholder for the parameter at `index` (0-based).
    ///
    /// - SQLite uses `?1`, `?2`, etc.
    /// - MySQL uses `?`
    fn placeholder(&self, index: usize) -> String;

    /// Type name used inside `CAST(x AS <type>)`.
    fn cast_type(&self, cast: CastKeyword) -> String;

    /// Quote a string literal.
    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// MySQL / MariaDB, the native WordPress backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn cast_type(&self, cast: CastKeyword) -> String {
        cast.to_string()
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

/// SQLite, which only honours type affinities in casts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index + 1)
    }

    fn cast_type(&self, cast: CastKeyword) -> String {
        match cast {
            CastKeyword::Signed | CastKeyword::Unsigned => "INTEGER",
            CastKeyword::Numeric { .. } | CastKeyword::Decimal(_) => "REAL",
            CastKeyword::Binary => "BLOB",
            // ISO dates and times order correctly as text
            CastKeyword::Char | CastKeyword::Date | CastKeyword::DateTime | CastKeyword::Time => {
                "TEXT"
            }
        }
        .to_string()
    }
}

/// Look up a dialect by name (`mysql` or `sqlite`).
pub fn dialect_by_name(name: &str) -> Option<&'static dyn Dialect> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mysql" | "mariadb" => Some(&MySql),
        "sqlite" => Some(&Sqlite),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralMode {
    Inline,
    Bound { offset: usize },
}

/// Accumulates SQL text (and parameters in bound mode) while rendering.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<SqlValue>,
    dialect: &'a dyn Dialect,
    mode: LiteralMode,
}

impl<'a> Renderer<'a> {
    /// Render values as escaped literals.
    pub fn inline(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
            mode: LiteralMode::Inline,
        }
    }

    /// Render values as placeholders, numbering after `offset` existing parameters.
    pub fn bound(dialect: &'a dyn Dialect, offset: usize) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
            mode: LiteralMode::Bound { offset },
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }

    pub fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn push_value(&mut self, value: &SqlValue) {
        match self.mode {
            LiteralMode::Inline => {
                let literal = match value {
                    SqlValue::String(s) => self.dialect.quote_literal(s),
                    SqlValue::Int(i) => i.to_string(),
                    SqlValue::Float(f) => f.to_string(),
                    SqlValue::Null => "NULL".to_string(),
                };
                self.sql.push_str(&literal);
            }
            LiteralMode::Bound { offset } => {
                self.params.push(value.clone());
                let placeholder = self.dialect.placeholder(offset + self.params.len() - 1);
                self.sql.push_str(&placeholder);
            }
        }
    }
}

/// A node that can be rendered into SQL.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

impl Render for Operand {
    fn render(&self, renderer: &mut Renderer) {
        match self {
            Operand::Column(column) => renderer.push(&column.to_string()),
            Operand::Value(value) => renderer.push_value(value),
            Operand::Cast(inner, cast) => {
                renderer.push("CAST(");
                inner.render(renderer);
                let cast_type = renderer.dialect.cast_type(*cast);
                renderer.push(" AS ");
                renderer.push(&cast_type);
                renderer.push(")");
            }
        }
    }
}

impl Render for Predicate {
    fn render(&self, renderer: &mut Renderer) {
        match self {
            Predicate::Compare { left, op, right } => {
                left.render(renderer);
                renderer.push(" ");
                renderer.push(op.as_sql());
                renderer.push(" ");
                right.render(renderer);
            }
            Predicate::And(parts) => render_joined(parts, " AND ", "1 = 1", renderer),
            Predicate::Or(parts) => render_joined(parts, " OR ", "1 = 0", renderer),
            Predicate::Not(inner) => {
                renderer.push("NOT (");
                inner.render(renderer);
                renderer.push(")");
            }
        }
    }
}

fn render_joined(parts: &[Predicate], separator: &str, empty: &str, renderer: &mut Renderer) {
    if parts.is_empty() {
        renderer.push(empty);
        return;
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            renderer.push(separator);
        }
        if matches!(part, Predicate::Compare { .. }) {
            part.render(renderer);
        } else {
            renderer.push("(");
            part.render(renderer);
            renderer.push(")");
        }
    }
}

impl Predicate {
    /// Parenthesized predicate text with inline literals, ready to be AND-ed
    /// into a filter clause.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        let mut renderer = Renderer::inline(dialect);
        renderer.push("(");
        self.render(&mut renderer);
        renderer.push(")");
        renderer.finish().0
    }

    /// Parenthesized predicate text with placeholders numbered after `offset`
    /// parameters, plus the values to bind.
    pub fn to_sql_bound(&self, dialect: &dyn Dialect, offset: usize) -> (String, Vec<SqlValue>) {
        let mut renderer = Renderer::bound(dialect, offset);
        renderer.push("(");
        self.render(&mut renderer);
        renderer.push(")");
        renderer.finish()
    }
}

/// Predicate text for an optional predicate; empty when there is nothing to filter.
pub fn predicate_text(predicate: Option<&Predicate>, dialect: &dyn Dialect) -> String {
    predicate.map(|p| p.to_sql(dialect)).unwrap_or_default()
}
