//! HTTP router and handlers for the API service.

use crate::app::AppState;
use axum::{
  Json, Router,
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

pub mod hello;
pub mod logs;

/// Assemble the HTTP router with all routes.
pub fn build_router(state: AppState) -> Router {
  Router::new()
    .route("/", get(hello::root))
    .route("/api/health", get(hello::health))
    .route("/api/hello", get(hello::hello))
    .route("/api/logs", get(logs::list_logs))
    .route("/api/logs/:id", get(logs::get_log))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Generic 500 body; the cause is only logged.
pub(crate) fn internal_error() -> Response {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": "Internal server error" })),
  )
    .into_response()
}
