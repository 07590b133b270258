//! duo-scaffold library entrypoint.
//!
//! Modules:
//! - `app`: startup, configuration, shared state
//! - `http`: Axum router and handlers for the API service
//! - `web`: the single-page web app and its toggle button
//! - `db`: migrations, database path resolution and the request log
//! - `models`: typed records used across layers
//! - `coverage`: merging of XML coverage reports
//! - `generate`: project generator
//! - `util`: tracing setup and HTML escaping

pub mod app;
pub mod coverage;
pub mod db;
pub mod generate;
pub mod http;
pub mod models;
pub mod util;
pub mod web;
