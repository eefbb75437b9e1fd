//! Data source endpoints

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::models::{CreateDataSourceRequest, DataSource};
use crate::state::AppState;

/// GET /api/datasources
pub async fn list_data_sources(State(state): State<AppState>) -> Result<Json<Vec<DataSource>>> {
    let sources = state.db.list_data_sources().await?;
    Ok(Json(sources))
}

/// POST /api/datasources
///
/// Registers a data source. The connection config is stored as-is; no
/// live connection test is performed.
pub async fn create_data_source(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDataSourceRequest>,
) -> Result<(StatusCode, Json<DataSource>)> {
    let source = state.db.create_data_source(&payload).await?;
    state.metrics.inc_created();

    info!(data_source_id = source.id, name = %source.name, "Data source created");
    Ok((StatusCode::CREATED, Json(source)))
}
