//! Health and readiness endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    pub message: String,
}

/// GET /health
///
/// Basic health check - returns 200 if the server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready
///
/// Readiness check - verifies the database is reachable
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match sqlx::query("SELECT 1").fetch_one(state.db.pool()).await {
        Ok(_) => CheckStatus {
            healthy: true,
            message: "Connected".to_string(),
        },
        Err(e) => CheckStatus {
            healthy: false,
            message: format!("Connection failed: {}", e),
        },
    };

    let (status, status_code) = if database.healthy {
        ("ready", StatusCode::OK)
    } else {
        ("not_ready", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks { database },
        }),
    )
}
