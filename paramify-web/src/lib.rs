//! HTTP surface for a [`ParameterStore`].
//!
//! Exposes the store contract over JSON:
//!
//! - `GET /parameters` — snapshot of all current values
//! - `GET /parameters/{name}` — one current value
//! - `POST /parameters/{name}` with `{"value": ...}` — validated update
//! - `GET /schema` — the declaration list, for remote form rendering
//!
//! Validation failures map to `422`, unknown names to `404`, malformed
//! bodies to `400`; every error body is a machine-readable object
//! `{"error", "parameter", "message"}`. The store does no internal locking,
//! so one `RwLock` per store serializes writes; the write lock is held
//! across validate, swap, and hook notification.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use paramify::{ParameterStore, SetError};

/// A parameter store shared with the HTTP layer.
pub type SharedStore = Arc<RwLock<ParameterStore>>;

/// Wrap a store for serving.
pub fn shared(store: ParameterStore) -> SharedStore {
    Arc::new(RwLock::new(store))
}

/// Build the parameter router over a shared store.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/parameters", get(list_parameters))
        .route("/parameters/{name}", get(get_parameter).post(set_parameter))
        .route("/schema", get(get_schema))
        .with_state(store)
}

/// Serve the router until the process exits.
pub async fn serve(addr: SocketAddr, store: SharedStore) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "parameter service listening");
    axum::serve(listener, router(store)).await
}

#[derive(Deserialize)]
struct SetBody {
    value: serde_json::Value,
}

async fn list_parameters(State(store): State<SharedStore>) -> Json<serde_json::Value> {
    Json(store.read().snapshot_json())
}

async fn get_schema(State(store): State<SharedStore>) -> Json<serde_json::Value> {
    let store = store.read();
    Json(json!({ "parameters": store.declarations() }))
}

async fn get_parameter(
    State(store): State<SharedStore>,
    Path(name): Path<String>,
) -> Response {
    let store = store.read();
    match store.get(&name) {
        Some(value) => Json(json!({ "name": name, "value": value.to_json() })).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "unknown_parameter",
            &name,
            format!("parameter '{}' is not declared", name),
        ),
    }
}

async fn set_parameter(
    State(store): State<SharedStore>,
    Path(name): Path<String>,
    body: Result<Json<SetBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(parameter = %name, "malformed set request: {}", rejection.body_text());
            return error_response(
                StatusCode::BAD_REQUEST,
                "bad_request",
                &name,
                "request body must be a JSON object with a 'value' field".to_string(),
            );
        }
    };

    // Write lock held across validate, swap, and hook notification.
    let result = store.write().set_json(&name, &body.value);
    match result {
        Ok(()) => {
            debug!(parameter = %name, "parameter set via http");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(SetError::UnknownParameter(e)) => {
            warn!(parameter = %name, "set rejected: {}", e);
            error_response(StatusCode::NOT_FOUND, "unknown_parameter", &name, e.to_string())
        }
        Err(SetError::Validation(e)) => {
            warn!(parameter = %name, "set rejected: {}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "validation", &name, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, kind: &str, parameter: &str, message: String) -> Response {
    (
        status,
        Json(json!({
            "error": kind,
            "parameter": parameter,
            "message": message,
        })),
    )
        .into_response()
}
