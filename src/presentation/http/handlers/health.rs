//! Health Check Handler

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::startup::AppState;

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub rooms: usize,
    pub sessions: usize,
}

/// Reports database reachability and live registry gauges.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "up",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            "down"
        }
    };

    Json(HealthResponse {
        status: if database == "up" { "ok" } else { "degraded" },
        database,
        rooms: state.registry.room_count(),
        sessions: state.registry.session_count(),
    })
}
