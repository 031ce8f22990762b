use crate::server::router::GatewayState;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router() -> Router<GatewayState> {
    Router::new().route("/health", get(health_handler))
}
