//! Bundled Iris Dataset
//!
//! 150 flowers, 4 measurements each, 50 rows per species.
//! The CSV is compiled into the library so training never touches the network.

use std::io::Read;

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;

use crate::error::{ModelError, ModelResult};
use crate::species::{Species, CLASS_COUNT};

/// Raw CSV bundled with the crate
const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// Feature columns, in matrix column order
pub const FEATURE_NAMES: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Number of input features
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Deserialize)]
struct IrisRecord {
    sepal_length: f64,
    sepal_width: f64,
    petal_length: f64,
    petal_width: f64,
    species: String,
}

/// Feature matrix plus class indices
#[derive(Debug, Clone)]
pub struct Dataset {
    /// n × FEATURE_COUNT
    pub features: Array2<f64>,
    /// Class index per row
    pub targets: Vec<usize>,
}

// ============================================================================
// LOADING
// ============================================================================

/// Load the bundled Iris dataset
pub fn load_iris() -> ModelResult<Dataset> {
    Dataset::from_csv_reader(IRIS_CSV.as_bytes())
}

impl Dataset {
    /// Parse a headed CSV with the four measurement columns and a `species` column
    pub fn from_csv_reader<R: Read>(reader: R) -> ModelResult<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut values = Vec::new();
        let mut targets = Vec::new();

        for result in rdr.deserialize() {
            let record: IrisRecord = result?;
            let species: Species = record.species.parse().map_err(ModelError::InvalidInput)?;

            values.extend_from_slice(&[
                record.sepal_length,
                record.sepal_width,
                record.petal_length,
                record.petal_width,
            ]);
            targets.push(species.index());
        }

        if targets.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let features = Array2::from_shape_vec((targets.len(), FEATURE_COUNT), values)?;
        log::debug!("Loaded dataset with {} rows", targets.len());

        Ok(Self { features, targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Rows per class, indexed by class
    pub fn class_counts(&self) -> [usize; CLASS_COUNT] {
        let mut counts = [0; CLASS_COUNT];
        for &t in &self.targets {
            if t < CLASS_COUNT {
                counts[t] += 1;
            }
        }
        counts
    }

    /// Subset of rows, in the given order
    pub fn select(&self, indices: &[usize]) -> ModelResult<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(ModelError::InvalidInput(format!(
                "row index {} out of range for {} rows",
                bad,
                self.len()
            )));
        }

        Ok(Self {
            features: self.features.select(Axis(0), indices),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        })
    }

    /// Shuffle rows with a seeded RNG and hold out `ceil(test_size * n)` of them.
    ///
    /// Returns `(train, test)`.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> ModelResult<(Self, Self)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ModelError::InvalidInput(format!(
                "test_size must be in (0, 1), got {}",
                test_size
            )));
        }

        let n = self.len();
        let n_test = (test_size * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(ModelError::InvalidInput(format!(
                "test_size {} leaves an empty partition for {} rows",
                test_size, n
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        Ok((self.select(train_idx)?, self.select(test_idx)?))
    }
}
