//! Service index handler

use axum::Json;
use iris_core::constants::{APP_NAME, APP_VERSION};
use serde::Serialize;

#[derive(Serialize)]
pub struct Endpoints {
    health: &'static str,
    predict: &'static str,
}

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    status: &'static str,
    version: &'static str,
    endpoints: Endpoints,
}

pub async fn index() -> Json<RootResponse> {
    Json(RootResponse {
        message: APP_NAME,
        status: "running",
        version: APP_VERSION,
        endpoints: Endpoints {
            health: "/health",
            predict: "/predict",
        },
    })
}
