//! HTTP surface for submitting retailer records and downloading reports.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use config::{AppConfig, StoreKind};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/retailers", post(routes::create_retailer))
        .route("/api/retailers/excel", get(routes::export_retailers))
        .route("/api/health", get(routes::health))
        .with_state(Arc::new(state))
}
