//! Prediction model

use iris_core::{Measurements, Prediction};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// POST /predict body. Measurements are in centimetres.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(range(min = 0.0))]
    pub sepal_length: f64,
    #[validate(range(min = 0.0))]
    pub sepal_width: f64,
    #[validate(range(min = 0.0))]
    pub petal_length: f64,
    #[validate(range(min = 0.0))]
    pub petal_width: f64,
}

impl From<PredictRequest> for Measurements {
    fn from(req: PredictRequest) -> Self {
        Measurements {
            sepal_length: req.sepal_length,
            sepal_width: req.sepal_width,
            petal_length: req.petal_length,
            petal_width: req.petal_width,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: usize,
    pub class_name: String,
    pub confidence: f64,
}

impl From<Prediction> for PredictResponse {
    fn from(p: Prediction) -> Self {
        Self {
            prediction: p.prediction,
            class_name: p.class_name,
            confidence: p.confidence,
        }
    }
}
