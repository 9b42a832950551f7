//! Iris Classification API
//!
//! HTTP front for `iris_core::Predictor`.
//!
//! ```text
//!   GET  /         service index
//!   GET  /health   liveness + model status
//!   POST /predict  four measurements -> species
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use iris_core::Predictor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, read-only afterwards
    pub predictor: Option<Arc<Predictor>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, predictor: Option<Predictor>) -> Self {
        Self {
            predictor: predictor.map(Arc::new),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root::index))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
