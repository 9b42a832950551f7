//! Health check handler

use axum::{extract::State, Json};
use iris_core::EngineStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    version: &'static str,
    environment: String,
    timestamp: i64,
    engine: Option<EngineStatus>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.predictor.as_ref().map(|p| p.status());

    Json(HealthResponse {
        status: "healthy",
        model_loaded: engine.is_some(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().timestamp(),
        engine,
    })
}
