//! Train the Iris classifier and write the artifact to disk.
//!
//! Configuration comes from `IRIS_N_ESTIMATORS`, `IRIS_RANDOM_STATE`,
//! `IRIS_TEST_SIZE` and `MODEL_PATH`.

use iris_core::constants::ACCURACY_THRESHOLD;
use iris_core::training::{train_and_save_model, TrainConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TrainConfig::from_env();
    log::info!("Starting training run: {:?}", config);

    match train_and_save_model(&config) {
        Ok(report) => {
            if report.accuracy < ACCURACY_THRESHOLD {
                log::warn!(
                    "Accuracy {:.2} is below the {:.2} threshold",
                    report.accuracy,
                    ACCURACY_THRESHOLD
                );
            }
        }
        Err(e) => {
            log::error!("Training failed: {}", e);
            std::process::exit(1);
        }
    }
}
