// Enforce strict error handling in application code, but allow expect/unwrap in
// tests
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use anyhow::Result;
use api::{
    create_router,
    AppState,
    Config,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting API server on port {}", config.api_port);
    info!("Database URL: {}", config.redacted_database_url());
    info!("CORS origins: {}", config.cors_origins.join(", "));

    let state = AppState::new(&config).await?;
    info!("Connected to PostgreSQL database");

    state.store.migrate().await?;
    info!("Database schema is up to date");

    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api_port)).await?;
    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
