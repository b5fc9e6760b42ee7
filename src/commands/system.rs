use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let settings = &state.settings;
    Json(json!({
        "message": format!("{} backend is running", settings.app_name),
        "health_url": format!("{}/health", settings.api_v1_prefix),
    }))
}

/// Liveness probe: one trivial round-trip per configured backing store.
/// Failures surface as 503 with a generic message; the cause goes to the log.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if let Err(e) = sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        tracing::error!("health check: database ping failed: {:?}", e);
        return Err(ApiError::ServiceUnavailable(
            "Database connection failed".to_string(),
        ));
    }

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.ping().await {
            tracing::error!("health check: redis ping failed: {:?}", e);
            return Err(ApiError::ServiceUnavailable(
                "Redis connection failed".to_string(),
            ));
        }
    }

    Ok(Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
