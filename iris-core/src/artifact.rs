//! Model Artifact
//!
//! The fitted forest plus the metadata needed to serve it, written as one
//! JSON document. Loaded wholesale at startup and never mutated.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::{FEATURE_COUNT, FEATURE_NAMES};
use crate::error::{ModelError, ModelResult};
use crate::model::{Classifier, RandomForest};
use crate::species::{CLASS_COUNT, CLASS_NAMES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: RandomForest,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    /// Accuracy on the held-out split at training time
    pub test_accuracy: f64,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(model: RandomForest, test_accuracy: f64) -> Self {
        Self {
            model,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            class_names: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            test_accuracy,
            trained_at: Utc::now(),
        }
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> ModelResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;

        log::debug!("Wrote model artifact to {}", path.display());
        Ok(())
    }

    /// Read from `path`. A missing file is reported as `ModelNotFound`.
    pub fn load(path: &Path) -> ModelResult<Self> {
        if !path.exists() {
            return Err(ModelError::ModelNotFound(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let artifact: Self = serde_json::from_reader(reader)?;
        artifact.validate()?;

        Ok(artifact)
    }

    /// Reject artifacts that cannot serve four-measurement, three-class requests
    pub fn validate(&self) -> ModelResult<()> {
        if self.model.n_features() != FEATURE_COUNT {
            return Err(ModelError::InvalidArtifact(format!(
                "model expects {} features, service provides {}",
                self.model.n_features(),
                FEATURE_COUNT
            )));
        }
        if self.model.n_classes() != CLASS_COUNT {
            return Err(ModelError::InvalidArtifact(format!(
                "model predicts {} classes, expected {}",
                self.model.n_classes(),
                CLASS_COUNT
            )));
        }
        self.model.check_consistency().map_err(ModelError::InvalidArtifact)
    }
}
