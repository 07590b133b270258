//! Greeting and health endpoints.

use crate::{app::AppState, db::logs::insert_log};
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::error;

pub const HELLO_ENDPOINT: &str = "/api/hello";

pub async fn root() -> impl IntoResponse {
  Json(json!({ "message": "Hello API" }))
}

pub async fn health() -> impl IntoResponse {
  Json(json!({ "status": "ok" }))
}

/// Logs the request, then greets. Fails with 500 when the log write fails.
pub async fn hello(State(state): State<AppState>) -> impl IntoResponse {
  if let Err(e) = insert_log(&state.db, HELLO_ENDPOINT).await {
    error!("hello log error: {e}");
    return super::internal_error();
  }
  Json(json!({ "message": "Hello from the backend!" })).into_response()
}
