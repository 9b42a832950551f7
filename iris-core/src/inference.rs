//! Inference Engine
//!
//! Holds the loaded artifact and turns four measurements into a labelled
//! prediction. Read-only after load; per-call stats are plain atomics.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::artifact::ModelArtifact;
use crate::dataset::FEATURE_COUNT;
use crate::error::{ModelError, ModelResult};
use crate::model::{argmax, Classifier};
use crate::species::Species;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One flower, in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl Measurements {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [self.sepal_length, self.sepal_width, self.petal_length, self.petal_width]
    }
}

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class index (0..3)
    pub prediction: usize,
    pub class_name: String,
    /// Highest class probability
    pub confidence: f64,
}

/// Engine status for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_path: String,
    pub model_type: String,
    pub n_estimators: usize,
    pub test_accuracy: f64,
    pub trained_at: DateTime<Utc>,
    pub loaded_at: DateTime<Utc>,
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

// ============================================================================
// PREDICTOR
// ============================================================================

#[derive(Debug)]
pub struct Predictor {
    artifact: ModelArtifact,
    source: PathBuf,
    loaded_at: DateTime<Utc>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl Predictor {
    /// Load the artifact at `path`
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        log::info!("Loading model from: {}", path.display());

        let artifact = ModelArtifact::load(path)?;
        log::info!(
            "Model loaded: {} trees, held-out accuracy {:.2}",
            artifact.model.n_estimators(),
            artifact.test_accuracy
        );

        Self::from_artifact(artifact, path)
    }

    /// Wrap an in-memory artifact. `source` is only reported in status.
    pub fn from_artifact(artifact: ModelArtifact, source: impl Into<PathBuf>) -> ModelResult<Self> {
        artifact.validate()?;

        Ok(Self {
            artifact,
            source: source.into(),
            loaded_at: Utc::now(),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn predict(&self, input: &Measurements) -> ModelResult<Prediction> {
        let values = input.to_array();
        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::InvalidInput(format!(
                "measurement {} is not a finite number",
                bad
            )));
        }

        let start = Instant::now();

        let features = Array2::from_shape_vec((1, FEATURE_COUNT), values.to_vec())?;
        let proba = self.artifact.model.predict_proba(&features)?;
        let (index, confidence) = argmax(proba.row(0).iter())
            .ok_or_else(|| ModelError::InvalidArtifact("model returned no classes".to_string()))?;
        let species = Species::from_index(index).ok_or_else(|| {
            ModelError::InvalidArtifact(format!("model predicted unknown class {}", index))
        })?;

        let elapsed = start.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!("Predicted {} ({:.3}) in {}us", species, confidence, elapsed);

        Ok(Prediction {
            prediction: species.index(),
            class_name: species.as_str().to_string(),
            confidence,
        })
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_path: self.source.display().to_string(),
            model_type: self.artifact.model.name().to_string(),
            n_estimators: self.artifact.model.n_estimators(),
            test_accuracy: self.artifact.test_accuracy,
            trained_at: self.artifact.trained_at,
            loaded_at: self.loaded_at,
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}
