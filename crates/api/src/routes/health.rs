use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use chassis_cache::Cache;
use chassis_db::repositories::CatStore;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the document store is reachable.
    pub db_healthy: bool,
    /// Whether the cache / session store is reachable.
    pub cache_healthy: bool,
}

/// GET /health -- returns service, store, and cache health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.cats.ping().await.is_ok();
    let cache_healthy = state.cache.ping().await.is_ok();

    let status = if db_healthy && cache_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        cache_healthy,
    })
}

/// Mount health check routes (allow-listed, no authentication).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
