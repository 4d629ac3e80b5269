use axum::Json;
use serde_json::{Value, json};

pub async fn root_route() -> &'static str {
    "PR Pilot API"
}

/// Liveness probe for the hosting platform.
pub async fn health_route() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
