use std::fs;

use iris_core::constants::ACCURACY_THRESHOLD;
use iris_core::{
    load_iris, train_and_save_model, Classifier, ModelArtifact, Predictor, TrainConfig,
};
use tempfile::tempdir;

fn config_in(dir: &std::path::Path) -> TrainConfig {
    TrainConfig::default().with_model_path(dir.join("models").join("iris_model.json"))
}

#[test]
fn test_train_model_success() {
    let dir = tempdir().unwrap();
    let report = train_and_save_model(&config_in(dir.path())).unwrap();

    assert!((0.0..=1.0).contains(&report.accuracy));
    assert_eq!(report.test_rows, 30);
    assert_eq!(report.train_rows, 120);
}

#[test]
fn test_model_accuracy_threshold() {
    let dir = tempdir().unwrap();
    let report = train_and_save_model(&config_in(dir.path())).unwrap();

    assert!(
        report.accuracy >= ACCURACY_THRESHOLD,
        "Model accuracy {:.2} is below threshold",
        report.accuracy
    );
}

#[test]
fn test_model_file_created() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    train_and_save_model(&config).unwrap();

    assert!(config.model_path.exists());
    assert!(fs::metadata(&config.model_path).unwrap().len() > 0);
}

#[test]
fn test_model_parameters_survive_reload() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let report = train_and_save_model(&config).unwrap();

    let artifact = ModelArtifact::load(&config.model_path).unwrap();
    assert_eq!(artifact.model.n_estimators(), 100);
    assert_eq!(artifact.model.random_state(), Some(42));
    assert_eq!(artifact.model.n_classes(), 3);
    assert_eq!(artifact.model.n_features(), 4);
    assert_eq!(artifact.test_accuracy, report.accuracy);
}

#[test]
fn test_loaded_model_can_predict() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    train_and_save_model(&config).unwrap();

    let artifact = ModelArtifact::load(&config.model_path).unwrap();
    let data = load_iris().unwrap();
    let sample = data.select(&[0, 1, 2, 3, 4]).unwrap();

    let predictions = artifact.model.predict(&sample.features).unwrap();
    let probabilities = artifact.model.predict_proba(&sample.features).unwrap();

    assert_eq!(predictions.len(), 5);
    assert!(predictions.iter().all(|p| [0, 1, 2].contains(p)));
    assert_eq!(probabilities.dim(), (5, 3));
    for row in probabilities.outer_iter() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_predictor_loads_trained_artifact() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    train_and_save_model(&config).unwrap();

    let predictor = Predictor::load(&config.model_path).unwrap();
    let status = predictor.status();

    assert_eq!(status.n_estimators, 100);
    assert!(status.model_path.ends_with("iris_model.json"));
}

#[test]
fn test_retraining_is_reproducible() {
    let dir = tempdir().unwrap();
    let first = config_in(&dir.path().join("a"));
    let second = config_in(&dir.path().join("b"));
    train_and_save_model(&first).unwrap();
    train_and_save_model(&second).unwrap();

    let a = ModelArtifact::load(&first.model_path).unwrap();
    let b = ModelArtifact::load(&second.model_path).unwrap();
    let data = load_iris().unwrap();

    assert_eq!(
        a.model.predict_proba(&data.features).unwrap(),
        b.model.predict_proba(&data.features).unwrap()
    );
}
