//! Iris Classifier Core
//!
//! Bundled Iris dataset, a random forest classifier, artifact persistence and
//! the inference engine used by the HTTP server.
//!
//! ```text
//!  dataset ──► training ──► artifact (models/iris_model.json)
//!                                 │
//!                                 ▼
//!            Measurements ──► inference::Predictor ──► Prediction
//! ```

pub mod artifact;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod model;
pub mod species;
pub mod training;

// Re-export common types
pub use artifact::ModelArtifact;
pub use dataset::{load_iris, Dataset, FEATURE_COUNT, FEATURE_NAMES};
pub use error::{ModelError, ModelResult};
pub use inference::{EngineStatus, Measurements, Prediction, Predictor};
pub use model::{Classifier, ForestParams, RandomForest};
pub use species::{Species, CLASS_NAMES};
pub use training::{train_and_save_model, train_model, TrainConfig, TrainReport};
