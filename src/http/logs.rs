//! Read access to the request log.

use crate::{
  app::AppState,
  db::logs::{get_log_by_id, get_logs, get_logs_by_endpoint},
};
use axum::{
  Json,
  extract::{Path as AxumPath, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

#[derive(Debug, Default, Deserialize)]
pub struct LogFilter {
  pub endpoint: Option<String>,
}

pub async fn list_logs(
  State(state): State<AppState>,
  Query(filter): Query<LogFilter>,
) -> impl IntoResponse {
  let rows = match filter.endpoint.as_deref() {
    Some(endpoint) => get_logs_by_endpoint(&state.db, endpoint).await,
    None => get_logs(&state.db).await,
  };
  match rows {
    Ok(logs) => Json(logs).into_response(),
    Err(e) => {
      error!("list_logs error: {e}");
      super::internal_error()
    }
  }
}

pub async fn get_log(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<i64>,
) -> impl IntoResponse {
  match get_log_by_id(&state.db, id).await {
    Ok(Some(entry)) => Json(entry).into_response(),
    Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "error": "Log not found" }))).into_response(),
    Err(e) => {
      error!("get_log error: {e}");
      super::internal_error()
    }
  }
}
