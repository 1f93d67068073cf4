//! wpgraph-cursor - fetch one keyset-paginated page of WordPress content
//!
//! Reads configuration from the environment, resolves a connection page for
//! the requested kind, sort and cursor, and prints it as JSON along with the
//! cursor predicate in the configured SQL dialect.

mod cli;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wpgraph_cursor::CursorConfig;
use wpgraph_cursor::cursor::adapter::EntityCursor;
use wpgraph_cursor::cursor::render::predicate_text;
use wpgraph_cursor::graphql::pagination::apply_order_by;
use wpgraph_cursor::query::ListQueryState;
use wpgraph_cursor::sqlite::{SqliteStore, fetch_connection};

use crate::cli::CliOptions;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wpgraph_cursor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CursorConfig::from_env()?;
    let options = CliOptions::from_args()?;

    let store = SqliteStore::connect(&config.database_url, &config.table_prefix)
        .await
        .with_context(|| format!("Failed to connect to {}", config.database_url))?;

    if options.init {
        store.create_tables().await.context("Failed to create tables")?;
        tracing::info!("Tables created");
    }

    let state = apply_order_by(ListQueryState::new(), &options.order_by);
    let request = options.args.page_request(options.kind, &config)?;

    let predicate = match request.cursor {
        Some(cursor_id) => Some(
            EntityCursor::new(store.schema(options.kind))
                .get_predicate(&store, cursor_id, &state.paged(request.direction))
                .await?,
        ),
        None => None,
    };
    tracing::info!(
        kind = %options.kind,
        predicate = %predicate_text(predicate.as_ref(), config.dialect()),
        "Cursor predicate"
    );

    let connection = fetch_connection(&store, options.kind, &state, &options.args, &config).await?;
    println!("{}", serde_json::to_string_pretty(&connection)?);

    Ok(())
}
