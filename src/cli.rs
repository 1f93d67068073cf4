//! Minimal CLI parsing for one connection page.

use std::env;

use anyhow::{Context, Result, bail};

use wpgraph_cursor::entity::EntityKind;
use wpgraph_cursor::graphql::pagination::{ConnectionArgs, OrderByInput};
use wpgraph_cursor::query::OrderDirection;

#[derive(Debug)]
pub struct CliOptions {
    pub kind: EntityKind,
    pub args: ConnectionArgs,
    pub order_by: Vec<OrderByInput>,
    /// Create the entity tables before querying
    pub init: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            kind: EntityKind::Post,
            args: ConnectionArgs::default(),
            order_by: Vec::new(),
            init: false,
        }
    }
}

impl CliOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse(env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = CliOptions::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            let mut value = || {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .with_context(|| format!("{} needs a value", flag))
            };

            match flag.as_str() {
                "--init" => options.init = true,
                "--kind" => {
                    let kind = value()?;
                    options.kind = EntityKind::parse(&kind)
                        .with_context(|| format!("Unknown kind '{}'", kind))?;
                }
                "--first" => {
                    options.args.first = Some(value()?.parse().context("Invalid --first")?)
                }
                "--last" => options.args.last = Some(value()?.parse().context("Invalid --last")?),
                "--after" => options.args.after = Some(value()?),
                "--before" => options.args.before = Some(value()?),
                "--orderby" => options.order_by.push(parse_order_by(&value()?)?),
                _ => bail!("Unknown argument '{}'", flag),
            }
        }
        Ok(options)
    }
}

/// `key` or `key:asc|desc`
fn parse_order_by(value: &str) -> Result<OrderByInput> {
    let (field, order) = match value.split_once(':') {
        Some((field, order)) => {
            let order = OrderDirection::parse(order)
                .with_context(|| format!("Invalid direction in '{}'", value))?;
            (field, Some(order))
        }
        None => (value, None),
    };
    Ok(OrderByInput {
        field: field.to_string(),
        order,
    })
}
