//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::models::{PredictRequest, PredictResponse};
use crate::{AppError, AppResult, AppState};

/// Classify one flower
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let predictor = state.predictor.as_ref().ok_or(AppError::ModelNotLoaded)?;
    let prediction = predictor.predict(&req.into())?;

    tracing::debug!(
        "Predicted {} with confidence {:.3}",
        prediction.class_name,
        prediction.confidence
    );

    Ok(Json(prediction.into()))
}
