use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use iris_core::{load_iris, ForestParams, ModelArtifact, Predictor, RandomForest};
use iris_server::{create_router, AppState, Config};
use serde_json::{json, Value};
use tower::ServiceExt;

fn trained_predictor() -> Predictor {
    let data = load_iris().unwrap();
    let model = RandomForest::fit(ForestParams::new(25, 42), &data.features, &data.targets).unwrap();
    Predictor::from_artifact(ModelArtifact::new(model, 1.0), "memory").unwrap()
}

fn app() -> Router {
    create_router(AppState::new(Config::default(), Some(trained_predictor())))
}

fn app_without_model() -> Router {
    create_router(AppState::new(Config::default(), None))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = tokio_test::assert_ok!(app.oneshot(request).await);
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root() {
    let (status, body) = send(app(), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Iris Classification API");
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["health"], "/health");
    assert_eq!(body["endpoints"]["predict"], "/predict");
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["environment"], "development");
    assert_eq!(body["engine"]["n_estimators"], 25);
    assert!(body["engine"].get("model_loaded").is_none());
}

#[tokio::test]
async fn test_health_without_model() {
    let (status, body) = send(app_without_model(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], false);
    assert!(body["engine"].is_null());
}

#[tokio::test]
async fn test_predict() {
    let input = json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2
    });
    let (status, body) = send(app(), post_json("/predict", input)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["class_name"], "setosa");

    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_predict_label_is_known() {
    let input = json!({
        "sepal_length": 6.3,
        "sepal_width": 2.8,
        "petal_length": 5.1,
        "petal_width": 1.5
    });
    let (status, body) = send(app(), post_json("/predict", input)).await;

    assert_eq!(status, StatusCode::OK);
    let name = body["class_name"].as_str().unwrap();
    assert!(["setosa", "versicolor", "virginica"].contains(&name));
}

#[tokio::test]
async fn test_predict_invalid_input() {
    let input = json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5
    });
    let (status, body) = send(app(), post_json("/predict", input)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
}

#[tokio::test]
async fn test_predict_wrong_type() {
    let input = json!({
        "sepal_length": "long",
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2
    });
    let (status, _) = send(app(), post_json("/predict", input)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_negative_measurement() {
    let input = json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": -1.4,
        "petal_width": 0.2
    });
    let (status, _) = send(app(), post_json("/predict", input)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_missing_content_type() {
    let input = json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2
    });
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(input.to_string()))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["status"], 415);
}

#[tokio::test]
async fn test_predict_without_model() {
    let input = json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2
    });
    let (status, body) = send(app_without_model(), post_json("/predict", input)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Model not loaded");
}

#[tokio::test]
async fn test_predictions_are_counted() {
    let predictor = std::sync::Arc::new(trained_predictor());
    let state = AppState {
        predictor: Some(predictor.clone()),
        config: Config::default(),
    };
    let input = json!({
        "sepal_length": 6.7,
        "sepal_width": 3.0,
        "petal_length": 5.2,
        "petal_width": 2.3
    });

    send(create_router(state.clone()), post_json("/predict", input)).await;
    let (_, body) = send(create_router(state), get("/health")).await;

    assert_eq!(body["engine"]["inference_count"], 1);
    assert_eq!(predictor.status().inference_count, 1);
}
