//! Integration endpoints
//!
//! Connecting an integration shape-checks the submitted API key and
//! stores only the outcome; the key itself is never persisted. This is
//! deliberately not a live credential check against the third party.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::models::{ConnectIntegrationRequest, Integration};
use crate::state::AppState;

const MIN_KEY_LENGTH: usize = 20;

/// Shape check for submitted API keys: trimmed length >= 20 and a
/// restricted character set.
fn api_key_is_plausible(key: &str) -> bool {
    let key = key.trim();
    key.len() >= MIN_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '_' | '=' | '-'))
}

/// GET /api/integrations
pub async fn list_integrations(State(state): State<AppState>) -> Result<Json<Vec<Integration>>> {
    let integrations = state.db.list_integrations().await?;
    Ok(Json(integrations))
}

/// POST /api/integrations/connect
///
/// Upserts by serviceId, so connecting the same service twice updates
/// the existing row instead of duplicating it.
pub async fn connect_integration(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ConnectIntegrationRequest>,
) -> Result<Json<Integration>> {
    state.metrics.inc_integration_connects();

    if !api_key_is_plausible(&payload.api_key) {
        state.metrics.inc_integration_rejections();
        warn!(service_id = %payload.service_id, "Integration connect rejected: malformed API key");
        return Err(AppError::Unauthorized(
            "API key is malformed; expected at least 20 characters from [A-Za-z0-9+/_=-]"
                .to_string(),
        ));
    }

    let integration = state
        .db
        .upsert_integration(
            &payload.service_id,
            &payload.service_name,
            &payload.category,
            Utc::now(),
        )
        .await?;

    info!(service_id = %integration.service_id, "Integration connected");
    Ok(Json(integration))
}

/// DELETE /api/integrations/:service_id
pub async fn disconnect_integration(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> Result<StatusCode> {
    if !state.db.delete_integration(&service_id).await? {
        return Err(AppError::NotFound(format!(
            "Integration {service_id} not found"
        )));
    }

    info!(service_id = %service_id, "Integration disconnected");
    Ok(StatusCode::NO_CONTENT)
}
