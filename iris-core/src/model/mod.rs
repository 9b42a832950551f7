//! Model Module - Tree Ensemble Classifier
//!
//! `Classifier` is the seam between training/inference and the estimator.
//! The only estimator shipped is a bagged CART ensemble (random forest).

pub mod forest;
pub mod tree;

use ndarray::Array2;

use crate::error::ModelResult;

// Re-export common types
pub use forest::{ForestParams, MaxFeatures, RandomForest};
pub use tree::{DecisionTree, Node, TreeParams};

/// Contract shared by fitted classifiers.
pub trait Classifier {
    /// Class probabilities, one row per input row, one column per class.
    /// Every row sums to 1.
    fn predict_proba(&self, x: &Array2<f64>) -> ModelResult<Array2<f64>>;

    /// Most probable class per row (lowest index wins ties)
    fn predict(&self, x: &Array2<f64>) -> ModelResult<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .outer_iter()
            .map(|row| argmax(row.iter()).map(|(i, _)| i).unwrap_or(0))
            .collect())
    }

    fn n_classes(&self) -> usize;

    fn n_features(&self) -> usize;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Index and value of the first maximum
pub fn argmax<'a, I>(values: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}
