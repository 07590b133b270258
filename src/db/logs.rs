//! Append-only request log.

use crate::models::log::log_entry::LogEntry;
use chrono::Utc;
use sqlx::SqlitePool;

/// Record a request to `endpoint`, returning the stored row.
pub async fn insert_log(pool: &SqlitePool, endpoint: &str) -> Result<LogEntry, sqlx::Error> {
    let timestamp = Utc::now();
    let id = sqlx::query("INSERT INTO logs (timestamp, endpoint) VALUES (?, ?)")
        .bind(timestamp)
        .bind(endpoint)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(LogEntry {
        id,
        timestamp,
        endpoint: endpoint.to_string(),
    })
}

pub async fn get_logs(pool: &SqlitePool) -> Result<Vec<LogEntry>, sqlx::Error> {
    sqlx::query_as("SELECT id, timestamp, endpoint FROM logs ORDER BY id ASC")
        .fetch_all(pool)
        .await
}

pub async fn get_logs_by_endpoint(
    pool: &SqlitePool,
    endpoint: &str,
) -> Result<Vec<LogEntry>, sqlx::Error> {
    sqlx::query_as("SELECT id, timestamp, endpoint FROM logs WHERE endpoint = ? ORDER BY id ASC")
        .bind(endpoint)
        .fetch_all(pool)
        .await
}

pub async fn get_log_by_id(pool: &SqlitePool, id: i64) -> Result<Option<LogEntry>, sqlx::Error> {
    sqlx::query_as("SELECT id, timestamp, endpoint FROM logs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}
