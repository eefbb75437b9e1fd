//! Alert endpoints

use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::models::{Alert, AlertStatus, ResolveAlertRequest};
use crate::state::AppState;

/// GET /api/alerts
///
/// Lists all alerts, newest first.
pub async fn list_alerts(State(state): State<AppState>) -> Result<Json<Vec<Alert>>> {
    let alerts = state.db.list_alerts().await?;
    Ok(Json(alerts))
}

/// PATCH /api/alerts/:id
///
/// The only exposed transition is active -> resolved; attempting to
/// reopen an alert is a 400. Resolving twice is allowed and simply
/// re-sets the resolution timestamp.
pub async fn resolve_alert(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(payload): ValidatedJson<ResolveAlertRequest>,
) -> Result<Json<Alert>> {
    if payload.status != AlertStatus::Resolved {
        return Err(AppError::validation(
            "alerts cannot be reopened",
            "status",
        ));
    }

    let resolved_at = payload.resolved_at.unwrap_or_else(Utc::now);
    let alert = state
        .db
        .resolve_alert(id, resolved_at)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alert {id} not found")))?;

    info!(alert_id = id, "Alert resolved");
    Ok(Json(alert))
}
