//! Log row stored in SQLite and exposed via API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One audit record per logged API request. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
}
