//! Liveness and dependency status for the service.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when every dependency is usable, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    /// The SQLite pool answers a round-trip query.
    pub db_healthy: bool,
    /// The image directory exists and is writable.
    pub images_healthy: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = match sheltered_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            false
        }
    };
    let images_healthy = match state.image_store.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Image store health check failed");
            false
        }
    };

    Json(HealthReport {
        status: if db_healthy && images_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        images_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
