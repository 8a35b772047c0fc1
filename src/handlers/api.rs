use axum::response::Json;
use serde_json::{Value, json};

/// Liveness probe. Only reports that the process is serving requests;
/// provider reachability is not checked here.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
