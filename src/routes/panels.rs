//! Panel endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::error::{AppError, Result};
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::models::{CreatePanelRequest, Panel, UpdatePanelRequest};
use crate::state::AppState;

/// GET /api/dashboards/:id/panels
///
/// Lists the panels of a dashboard. An unknown dashboard id yields an
/// empty list, matching the contract's no-failure list semantics.
pub async fn list_dashboard_panels(
    State(state): State<AppState>,
    ValidatedPath(dashboard_id): ValidatedPath<i64>,
) -> Result<Json<Vec<Panel>>> {
    let panels = state.db.list_panels(dashboard_id).await?;
    Ok(Json(panels))
}

/// POST /api/panels
///
/// The referenced dashboard must exist; the check here turns what would
/// be a foreign-key violation into a 404.
pub async fn create_panel(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePanelRequest>,
) -> Result<(StatusCode, Json<Panel>)> {
    if state.db.get_dashboard(payload.dashboard_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Dashboard {} not found",
            payload.dashboard_id
        )));
    }

    let panel = state.db.create_panel(&payload).await?;
    state.metrics.inc_created();

    info!(panel_id = panel.id, dashboard_id = panel.dashboard_id, "Panel created");
    Ok((StatusCode::CREATED, Json(panel)))
}

/// PUT /api/panels/:id
pub async fn update_panel(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdatePanelRequest>,
) -> Result<Json<Panel>> {
    let panel = state
        .db
        .update_panel(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Panel {id} not found")))?;

    Ok(Json(panel))
}

/// DELETE /api/panels/:id
pub async fn delete_panel(State(state): State<AppState>, ValidatedPath(id): ValidatedPath<i64>) -> Result<StatusCode> {
    if !state.db.delete_panel(id).await? {
        return Err(AppError::NotFound(format!("Panel {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}
