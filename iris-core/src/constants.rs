//! Central Configuration Constants
//!
//! Single source of truth for training and serving defaults.

use std::path::PathBuf;

/// Default model artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/iris_model.json";

/// Number of trees in the ensemble
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Seed for the forest and the train/test split
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Fraction of rows held out for evaluation
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Minimum held-out accuracy a freshly trained model is expected to reach
pub const ACCURACY_THRESHOLD: f64 = 0.90;

/// Library version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name
pub const APP_NAME: &str = "Iris Classification API";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> PathBuf {
    std::env::var("MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH))
}

/// Parse an environment variable, falling back to `default` when unset or malformed
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
