use axum::{Json, extract::State};
use std::sync::Arc;

use super::types::HealthStatus;
use super::{ApiError, AppState};

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthStatus>, ApiError> {
    state
        .store()
        .ping()
        .await
        .map_err(|e| ApiError::internal(format!("Database unreachable: {e}")))?;

    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
    }))
}
