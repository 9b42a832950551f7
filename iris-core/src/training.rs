//! Training Pipeline
//!
//! load dataset -> split -> fit forest -> score held-out rows -> persist.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::artifact::ModelArtifact;
use crate::constants::{
    env_or, get_model_path, DEFAULT_MODEL_PATH, DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_STATE,
    DEFAULT_TEST_SIZE,
};
use crate::dataset::load_iris;
use crate::error::ModelResult;
use crate::metrics::evaluate;
use crate::model::{ForestParams, RandomForest};

/// Training configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub n_estimators: usize,
    /// Seeds both the split and the forest
    pub random_state: u64,
    pub test_size: f64,
    pub model_path: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            random_state: DEFAULT_RANDOM_STATE,
            test_size: DEFAULT_TEST_SIZE,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl TrainConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            n_estimators: env_or("IRIS_N_ESTIMATORS", DEFAULT_N_ESTIMATORS),
            random_state: env_or("IRIS_RANDOM_STATE", DEFAULT_RANDOM_STATE),
            test_size: env_or("IRIS_TEST_SIZE", DEFAULT_TEST_SIZE),
            model_path: get_model_path(),
        }
    }

    pub fn with_model_path(mut self, path: impl AsRef<Path>) -> Self {
        self.model_path = path.as_ref().to_path_buf();
        self
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams::new(self.n_estimators, self.random_state)
    }
}

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub accuracy: f64,
    pub model_path: PathBuf,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Fit a forest on the training split and score it on the held-out split
pub fn train_model(config: &TrainConfig) -> ModelResult<(RandomForest, f64)> {
    fit_and_score(config).map(|(model, accuracy, _)| (model, accuracy))
}

/// Train, evaluate and write the artifact to `config.model_path`
pub fn train_and_save_model(config: &TrainConfig) -> ModelResult<TrainReport> {
    let (model, accuracy, (train_rows, test_rows)) = fit_and_score(config)?;

    ModelArtifact::new(model, accuracy).save(&config.model_path)?;
    log::info!("Model saved to {}", config.model_path.display());

    Ok(TrainReport {
        accuracy,
        model_path: config.model_path.clone(),
        train_rows,
        test_rows,
    })
}

fn fit_and_score(config: &TrainConfig) -> ModelResult<(RandomForest, f64, (usize, usize))> {
    let data = load_iris()?;
    let (train, test) = data.train_test_split(config.test_size, config.random_state)?;

    log::info!(
        "Training {} trees on {} rows ({} held out)",
        config.n_estimators,
        train.len(),
        test.len()
    );

    let model = RandomForest::fit(config.forest_params(), &train.features, &train.targets)?;
    let accuracy = evaluate(&model, &test)?;

    log::info!("Model accuracy: {:.2}", accuracy);
    Ok((model, accuracy, (train.len(), test.len())))
}
