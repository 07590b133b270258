//! Application setup and runtime.

use crate::{db, http, web};
use anyhow::Context;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
  pub db: SqlitePool,
}

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_API_PORT: u16 = 3000;
pub const DEFAULT_WEB_PORT: u16 = 4200;

/// Listener address taken from `HOST` / `PORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenConfig {
  pub host: String,
  pub port: u16,
}

impl ListenConfig {
  pub fn from_env(default_port: u16) -> Self {
    Self::from_lookup(default_port, |key| std::env::var(key).ok())
  }

  fn from_lookup(default_port: u16, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let host = lookup("HOST")
      .filter(|h| !h.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match lookup("PORT") {
      Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
        warn!("ignoring invalid PORT value {raw:?}, using {default_port}");
        default_port
      }),
      None => default_port,
    };
    Self { host, port }
  }

  async fn bind(&self) -> anyhow::Result<TcpListener> {
    TcpListener::bind((self.host.as_str(), self.port))
      .await
      .with_context(|| format!("failed to bind {}:{}", self.host, self.port))
  }
}

/// Settings for the API service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub listen: ListenConfig,
  pub database_url: String,
}

impl ApiConfig {
  /// Read `HOST`, `PORT` and `DUO_SCAFFOLD_DATABASE`; without the latter the
  /// database file is resolved relative to the working directory.
  pub fn from_env() -> anyhow::Result<Self> {
    let cwd = std::env::current_dir().context("cannot read working directory")?;
    Ok(Self::from_lookup(|key| std::env::var(key).ok(), &cwd))
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, cwd: &Path) -> Self {
    let database_url = match lookup("DUO_SCAFFOLD_DATABASE") {
      Some(explicit) if !explicit.trim().is_empty() => db::to_sqlite_url(explicit.trim()),
      _ => database_url_for(cwd),
    };
    Self {
      listen: ListenConfig::from_lookup(DEFAULT_API_PORT, lookup),
      database_url,
    }
  }
}

fn database_url_for(base: &Path) -> String {
  let path = db::resolve_database_path(base);
  db::to_sqlite_url(&path.to_string_lossy())
}

/// Open the log database and run migrations.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
  let db_url = db::ensure_sqlite_path(database_url);
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;
  db::run_migrations(&pool).await?;
  Ok(pool)
}

/// Start the API service and serve until shutdown, then close the pool.
pub async fn run_api(config: ApiConfig) -> anyhow::Result<()> {
  let pool = connect(&config.database_url)
    .await
    .with_context(|| format!("cannot open database {}", config.database_url))?;
  let listener = config.listen.bind().await?;
  info!("API listening on http://{}", listener.local_addr()?);
  info!("log database: {}", config.database_url);

  serve_api(listener, pool, shutdown_signal()).await
}

/// Serve the API on `listener` until `shutdown` resolves, then close the pool.
pub async fn serve_api(
  listener: TcpListener,
  pool: SqlitePool,
  shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
  let app = http::build_router(AppState { db: pool.clone() });
  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown)
    .await;
  db::close(&pool).await;
  served?;
  Ok(())
}

/// Start the web service and serve until shutdown.
pub async fn run_web(listen: ListenConfig) -> anyhow::Result<()> {
  let app = web::build_router();
  let listener = listen.bind().await?;
  info!("web app listening on http://{}", listener.local_addr()?);
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      warn!("cannot listen for ctrl-c: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        warn!("cannot listen for SIGTERM: {e}");
        std::future::pending::<()>().await;
      }
    }
  };
  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn listen_defaults() {
    let cfg = ListenConfig::from_lookup(DEFAULT_API_PORT, lookup(&[]));
    assert_eq!(cfg.host, "localhost");
    assert_eq!(cfg.port, 3000);
  }

  #[test]
  fn listen_overrides() {
    let cfg = ListenConfig::from_lookup(
      DEFAULT_WEB_PORT,
      lookup(&[("HOST", "0.0.0.0"), ("PORT", "8080")]),
    );
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8080);
  }

  #[test]
  fn invalid_port_uses_default() {
    let cfg = ListenConfig::from_lookup(DEFAULT_WEB_PORT, lookup(&[("PORT", "http")]));
    assert_eq!(cfg.port, 4200);
  }

  #[test]
  fn explicit_database_path_becomes_sqlite_url() {
    let cwd = tempfile::tempdir().unwrap();
    let cfg = ApiConfig::from_lookup(
      lookup(&[("DUO_SCAFFOLD_DATABASE", " /srv/logs/db.sqlite ")]),
      cwd.path(),
    );
    assert_eq!(cfg.database_url, "sqlite:///srv/logs/db.sqlite");
    assert_eq!(cfg.listen.port, DEFAULT_API_PORT);
  }

  #[test]
  fn explicit_sqlite_url_is_kept() {
    let cwd = tempfile::tempdir().unwrap();
    let cfg = ApiConfig::from_lookup(
      lookup(&[("DUO_SCAFFOLD_DATABASE", "sqlite::memory:"), ("PORT", "9000")]),
      cwd.path(),
    );
    assert_eq!(cfg.database_url, "sqlite::memory:");
    assert_eq!(cfg.listen.port, 9000);
  }

  #[test]
  fn blank_database_setting_resolves_from_cwd() {
    let cwd = tempfile::tempdir().unwrap();
    let cfg = ApiConfig::from_lookup(lookup(&[("DUO_SCAFFOLD_DATABASE", "  ")]), cwd.path());
    let expected = db::resolve_database_path(cwd.path());
    assert_eq!(cfg.database_url, format!("sqlite://{}", expected.display()));
    assert!(cfg.database_url.ends_with(db::DATABASE_FILE));
  }

  #[tokio::test]
  async fn serve_api_closes_pool_after_shutdown() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_api(listener, pool.clone(), async move {
      let _ = rx.await;
    }));

    let res = reqwest::get(format!("http://{addr}/api/health")).await.unwrap();
    assert!(res.status().is_success());
    assert!(!pool.is_closed());

    tx.send(()).unwrap();
    server.await.unwrap().unwrap();
    assert!(pool.is_closed());
  }

  #[test]
  fn database_url_uses_resolved_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data").join(db::DATABASE_FILE), b"").unwrap();
    let url = database_url_for(dir.path());
    assert!(url.starts_with("sqlite://"));
    assert!(url.ends_with("data/database.db"));
  }
}
