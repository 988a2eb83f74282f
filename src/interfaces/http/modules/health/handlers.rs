//! Health check

use axum::Json;
use serde_json::{json, Value};

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}
