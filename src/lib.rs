//! Product Catalog API Library
//!
//! A minimal REST CRUD service over a product catalog backed by a document
//! store, with an embedded reviews sub-resource.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod store;

use std::sync::Arc;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::store::ProductStore;

/// Shared application state. The store is injected here rather than living
/// as a process-wide global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub config: config::AppConfig,
}

/// Liveness probe.
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Full application router: the product endpoints plus the health probe.
pub fn api_routes() -> Router<AppState> {
    handlers::products::products_routes().route("/health", get(health_check))
}
