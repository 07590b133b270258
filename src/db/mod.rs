//! Database helpers: migrations, path handling and the log store.

use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub mod logs;

/// File name of the log database.
pub const DATABASE_FILE: &str = "database.db";

/// Run SQLite migrations to create tables if absent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            endpoint TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_logs_endpoint ON logs (endpoint)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Close the pool, waiting for checked-out connections to be returned.
pub async fn close(pool: &SqlitePool) {
    pool.close().await;
    info!("database connection closed");
}

/// Candidate locations for the log database, in lookup order.
pub fn candidate_paths(base: &Path) -> [PathBuf; 3] {
    [
        base.join(DATABASE_FILE),
        base.join("data").join(DATABASE_FILE),
        base.join("..").join(DATABASE_FILE),
    ]
}

/// Pick the first candidate that exists as a file.
///
/// Falls back to the first candidate when none exists; the file is then
/// created by [`ensure_sqlite_path`] on connect.
pub fn resolve_database_path(base: &Path) -> PathBuf {
    let candidates = candidate_paths(base);
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return found.clone();
    }
    let tried = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    error!("no existing log database found, tried: {tried}; using default");
    let [default, ..] = candidates;
    default
}

/// Turn a plain path or sqlx URL into a sqlx SQLite URL.
pub fn to_sqlite_url(value: &str) -> String {
    if value.starts_with("sqlite:") {
        value.to_string()
    } else {
        format!("sqlite://{value}")
    }
}

/// Ensure SQLite file and parent folder exist for a given sqlx URL.
pub fn ensure_sqlite_path(db_url: &str) -> String {
    if !db_url.starts_with("sqlite:") {
        return db_url.to_string();
    }
    let path_part = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if path_part.starts_with(":memory:") {
        return db_url.to_string();
    }
    let path_only = match path_part.split_once('?') {
        Some((p, _)) => p,
        None => path_part,
    };
    if !path_only.is_empty() {
        let p = Path::new(path_only);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("cannot create database directory {}: {e}", parent.display());
                }
            }
        }
        if let Err(e) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(p)
        {
            warn!("cannot create database file {}: {e}", p.display());
        }
    }
    db_url.to_string()
}
