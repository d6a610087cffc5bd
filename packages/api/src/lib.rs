//! NutriSync API Library
//!
//! REST API for ingesting soil sensor measurements and serving them to the
//! dashboard. Handlers, configuration and state are exposed for the binary
//! and for tests.

// Enforce strict error handling in application code, but allow expect/unwrap in tests
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header,
        HeaderValue,
        Method,
    },
    routing::{
        get,
        post,
    },
    Router,
};
pub use config::Config;
pub use errors::{
    ApiError,
    ApiResult,
};
pub use state::AppState;
use tower_http::{
    cors::{
        AllowOrigin,
        CorsLayer,
    },
    trace::TraceLayer,
};
use tracing::warn;

/// Build the CORS policy from the configured origins
pub fn cors_layer(config: &Config) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(false)
        .max_age(Duration::from_secs(300))
}

/// Create the main application router with all routes configured
pub fn create_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/data", post(handlers::receive_data))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/measurements", get(handlers::get_measurements))
        .route("/api/measurements/{id}", get(handlers::get_measurement))
        .layer(DefaultBodyLimit::max(ingest::MAX_BODY_BYTES))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
