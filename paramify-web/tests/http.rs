use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use paramify::{ParameterStore, Schema, SchemaFormat};
use paramify_web::{router, shared, SharedStore};

const SCHEMA: &str = r#"
parameters:
  - name: volume
    type: int
    default: 5
    min: 0
    max: 10
  - name: mode
    type: select
    default: auto
    choices: [auto, manual]
"#;

fn test_store() -> SharedStore {
    let schema = Schema::from_document(SCHEMA, SchemaFormat::Yaml).unwrap();
    shared(ParameterStore::new(schema).unwrap())
}

fn post_value(name: &str, body: &str) -> Request<Body> {
    Request::post(format!("/parameters/{name}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(router: Router, uri: &str) -> serde_json::Value {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn get_parameters_returns_defaults() {
    let store = test_store();
    let snapshot = body_json(router(store), "/parameters").await;
    assert_eq!(snapshot, serde_json::json!({"volume": 5, "mode": "auto"}));
}

#[tokio::test]
async fn get_single_parameter() {
    let store = test_store();
    let body = body_json(router(store.clone()), "/parameters/volume").await;
    assert_eq!(body, serde_json::json!({"name": "volume", "value": 5}));

    let response = router(store)
        .oneshot(
            Request::get("/parameters/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_valid_value_updates_snapshot() {
    let store = test_store();

    let response = router(store.clone())
        .oneshot(post_value("volume", r#"{"value": 7}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let snapshot = body_json(router(store), "/parameters").await;
    assert_eq!(snapshot["volume"], serde_json::json!(7));
}

#[tokio::test]
async fn post_invalid_value_is_structured_422_and_no_partial_update() {
    let store = test_store();

    let response = router(store.clone())
        .oneshot(post_value("volume", r#"{"value": 11}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["error"], "validation");
    assert_eq!(error["parameter"], "volume");
    assert!(error["message"].as_str().unwrap().contains("maximum"));

    let snapshot = body_json(router(store), "/parameters").await;
    assert_eq!(snapshot["volume"], serde_json::json!(5));
}

#[tokio::test]
async fn post_wrong_type_rejected() {
    let store = test_store();
    let response = router(store.clone())
        .oneshot(post_value("mode", r#"{"value": "turbo"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let snapshot = body_json(router(store), "/parameters").await;
    assert_eq!(snapshot["mode"], serde_json::json!("auto"));
}

#[tokio::test]
async fn post_unknown_parameter_is_404() {
    let store = test_store();
    let response = router(store)
        .oneshot(post_value("nonexistent", r#"{"value": 1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["error"], "unknown_parameter");
}

#[tokio::test]
async fn post_malformed_body_is_400() {
    let store = test_store();
    let response = router(store.clone())
        .oneshot(post_value("volume", "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing 'value' field is also malformed
    let response = router(store)
        .oneshot(post_value("volume", r#"{"val": 7}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn schema_endpoint_describes_declarations() {
    let store = test_store();
    let body = body_json(router(store), "/schema").await;
    let params = body["parameters"].as_array().unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0]["name"], "volume");
    assert_eq!(params[0]["type"], "int");
    assert_eq!(params[0]["min"], 0);
    assert_eq!(params[0]["max"], 10);
    assert_eq!(params[1]["choices"], serde_json::json!(["auto", "manual"]));
}
