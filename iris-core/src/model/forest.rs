//! Random Forest Classifier
//!
//! Bagged CART trees with per-split feature subsampling. Trees are fitted in
//! parallel; each one gets its own seed drawn up front from the master RNG, so
//! a fixed `random_state` reproduces the same forest regardless of scheduling.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::Classifier;
use crate::constants::{DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_STATE};
use crate::error::{ModelError, ModelResult};

// ============================================================================
// PARAMETERS
// ============================================================================

/// Features examined per split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `max(1, floor(sqrt(n_features)))`
    Sqrt,
    All,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
            MaxFeatures::All => n_features,
            MaxFeatures::Count(n) => (*n).clamp(1, n_features.max(1)),
        }
    }
}

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Sample rows with replacement for each tree
    pub bootstrap: bool,
    /// `None` seeds from OS entropy
    pub random_state: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            bootstrap: true,
            random_state: Some(DEFAULT_RANDOM_STATE),
        }
    }
}

impl ForestParams {
    pub fn new(n_estimators: usize, random_state: u64) -> Self {
        Self {
            n_estimators,
            random_state: Some(random_state),
            ..Default::default()
        }
    }

    fn tree_params(&self, n_features: usize) -> TreeParams {
        TreeParams {
            max_features: self.max_features.resolve(n_features),
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split.max(2),
        }
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    /// Fit a forest on `x` (rows = samples) with class indices `y`.
    ///
    /// Classes are `0..=max(y)`.
    pub fn fit(params: ForestParams, x: &Array2<f64>, y: &[usize]) -> ModelResult<Self> {
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidInput("n_estimators must be at least 1".to_string()));
        }
        if x.nrows() != y.len() {
            return Err(ModelError::InvalidInput(format!(
                "{} rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ModelError::EmptyDataset);
        }

        let n_rows = x.nrows();
        let n_features = x.ncols();
        let n_classes = y.iter().max().map(|&m| m + 1).ok_or(ModelError::EmptyDataset)?;
        let tree_params = params.tree_params(n_features);

        log::debug!(
            "Fitting {} trees on {} rows ({} features, {} classes)",
            params.n_estimators,
            n_rows,
            n_features,
            n_classes
        );

        let mut rng = match params.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| rng.gen()).collect();

        let trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let samples: Vec<usize> = if params.bootstrap {
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };
                DecisionTree::fit_samples(x, y, &samples, n_classes, &tree_params, &mut rng)
            })
            .collect::<ModelResult<Vec<_>>>()?;

        Ok(Self {
            params,
            trees,
            n_features,
            n_classes,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn random_state(&self) -> Option<u64> {
        self.params.random_state
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Structural check for forests that came from disk
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != self.n_features || tree.n_classes() != self.n_classes {
                return Err(format!("tree {} disagrees with forest shape", i));
            }
            tree.check_consistency().map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    /// Mean of the per-tree leaf distributions
    fn predict_proba(&self, x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        let n_trees = self.trees.len().max(1) as f64;
        let mut proba = Array2::zeros((x.nrows(), self.n_classes));

        for (row, mut out) in x.outer_iter().zip(proba.outer_iter_mut()) {
            for tree in &self.trees {
                for (o, p) in out.iter_mut().zip(tree.leaf_distribution(row)) {
                    *o += p;
                }
            }
            out.mapv_inplace(|v| v / n_trees);
        }

        Ok(proba)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
