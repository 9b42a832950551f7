//! Error handling

use std::path::PathBuf;

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    // Artifact errors
    #[error("Model file not found at {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    // I/O and encoding errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Dataset parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    // Input errors
    #[error("Expected {expected} features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dataset is empty")]
    EmptyDataset,
}
