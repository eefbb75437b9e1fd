//! Dashboard CRUD endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::error::{AppError, Result};
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::models::{CreateDashboardRequest, Dashboard, UpdateDashboardRequest};
use crate::state::AppState;

/// GET /api/dashboards
///
/// Lists all dashboards, oldest first.
pub async fn list_dashboards(State(state): State<AppState>) -> Result<Json<Vec<Dashboard>>> {
    let dashboards = state.db.list_dashboards().await?;
    Ok(Json(dashboards))
}

/// GET /api/dashboards/:id
pub async fn get_dashboard(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<Dashboard>> {
    let dashboard = state
        .db
        .get_dashboard(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Dashboard {id} not found")))?;

    Ok(Json(dashboard))
}

/// POST /api/dashboards
pub async fn create_dashboard(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDashboardRequest>,
) -> Result<(StatusCode, Json<Dashboard>)> {
    let dashboard = state.db.create_dashboard(&payload).await?;
    state.metrics.inc_created();

    info!(dashboard_id = dashboard.id, title = %dashboard.title, "Dashboard created");
    Ok((StatusCode::CREATED, Json(dashboard)))
}

/// PUT /api/dashboards/:id
///
/// Partial update: omitted fields keep their stored value.
pub async fn update_dashboard(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateDashboardRequest>,
) -> Result<Json<Dashboard>> {
    let dashboard = state
        .db
        .update_dashboard(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Dashboard {id} not found")))?;

    Ok(Json(dashboard))
}

/// DELETE /api/dashboards/:id
///
/// Deletes the dashboard and, by cascade, its panels.
pub async fn delete_dashboard(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode> {
    if !state.db.delete_dashboard(id).await? {
        return Err(AppError::NotFound(format!("Dashboard {id} not found")));
    }

    info!(dashboard_id = id, "Dashboard deleted");
    Ok(StatusCode::NO_CONTENT)
}
