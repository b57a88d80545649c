/// Health probe
///
/// Answers whether the process is up and whether the task store behind it
/// is reachable. A degraded answer still returns 200: the process is alive
/// and serving, it just cannot reach PostgreSQL right now, and deploy
/// tooling should treat it as not-ready rather than dead.
///
/// ```text
/// GET /health  ->  { "status": "healthy|degraded", "version", "database" }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Probe response body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" when the store round trip succeeds, "degraded" otherwise
    pub status: String,

    /// Version of the running binary
    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,
}

/// Runs one trivial query against the store and reports the result
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let db_ok = sqlx::query("SELECT 1").fetch_one(&state.db).await.is_ok();

    Ok(Json(HealthResponse {
        status: if db_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if db_ok { "connected" } else { "disconnected" }.to_string(),
    }))
}
