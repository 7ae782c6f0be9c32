//! Health check route
//!
//! | Path | Method | Auth |
//! |------|------|------|
//! | /health | GET | none |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::{DatabaseBackend, ServerState};

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    database: &'static str,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        database: match state.config.database {
            DatabaseBackend::RocksDb => "rocksdb",
            DatabaseBackend::Memory => "memory",
        },
    })
}
