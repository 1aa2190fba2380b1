//! Example consumer: serves the tables listed in a JSON query config.
//!
//! Run from repo root: `cargo run -p example-consumer`
//!
//! Environment: `DATABASE_URL`, `QUERY_CONFIG` (path to the JSON config,
//! default `query-config.json`), `BIND_ADDR` (default `127.0.0.1:3000`).

use criteria_sql::{common_routes, load_from_path, table_routes, AppState, PgExecutor};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("criteria_sql=info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/criteria".into());
    let config_path = std::env::var("QUERY_CONFIG").unwrap_or_else(|_| "query-config.json".into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());

    let config = load_from_path(&config_path)?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    let state = AppState::new(Arc::new(PgExecutor::new(pool)), &config)?;

    let app = common_routes(state.clone()).merge(table_routes(state));
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
