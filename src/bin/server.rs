//! Restaurant API server: loads settings and entity config, connects the pool,
//! mounts common, diagnostics and entity routes.

use restaurant_api::{app, builtin, load_from_path, resolve, AppState, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("restaurant_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let config = match &settings.entity_config {
        Some(path) => {
            tracing::info!("loading entity config from {}", path.display());
            load_from_path(path).await?
        }
        None => builtin(),
    };
    let model = resolve(&config)?;
    tracing::info!(entities = model.entity_by_path.len(), "entity model resolved");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    let state = AppState {
        pool,
        model: Arc::new(model),
    };
    let router = app(state, &settings);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
