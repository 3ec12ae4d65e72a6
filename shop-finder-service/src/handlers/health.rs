use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe. Does not touch the upstream API.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "shop-finder-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the generative API accepts our key and model.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let provider = state.locator.provider();
    provider.health_check().await.map_err(|e| {
        tracing::warn!(provider = provider.name(), error = %e, "Provider health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(StatusCode::OK)
}
