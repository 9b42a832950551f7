//! Iris Classification API server
//!
//! Loads the model artifact once, then serves predictions over HTTP.
//! Refuses to start when the artifact is missing; run the `train` binary first.

use anyhow::Context;
use iris_core::constants::APP_NAME;
use iris_core::Predictor;
use iris_server::{create_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iris_server=debug,iris_core=info,tower_http=debug".into()),
        )
        // Structured JSON lines in production, human-readable otherwise
        .with(config.is_production().then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.is_production()).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("{} starting ({})", APP_NAME, config.environment);

    let predictor = Predictor::load(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;

    let addr = config
        .socket_addr()
        .with_context(|| format!("Invalid HOST {:?}", config.host))?;

    let app = create_router(AppState::new(config, Some(predictor)));

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
