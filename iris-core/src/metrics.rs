//! Evaluation metrics

use crate::dataset::Dataset;
use crate::error::{ModelError, ModelResult};
use crate::model::Classifier;

/// Fraction of predictions equal to the truth
pub fn accuracy_score(y_true: &[usize], y_pred: &[usize]) -> ModelResult<f64> {
    if y_true.len() != y_pred.len() {
        return Err(ModelError::InvalidInput(format!(
            "{} labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(ModelError::EmptyDataset);
    }

    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Accuracy of `model` on every row of `data`
pub fn evaluate<C: Classifier + ?Sized>(model: &C, data: &Dataset) -> ModelResult<f64> {
    let predictions = model.predict(&data.features)?;
    accuracy_score(&data.targets, &predictions)
}
