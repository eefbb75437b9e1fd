//! HTTP route handlers and router assembly

pub mod alerts;
pub mod dashboards;
pub mod datasources;
pub mod health;
pub mod integrations;
pub mod metrics;
pub mod panels;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health and metrics (probes + Prometheus)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::prometheus_metrics))
        // Dashboards
        .route(
            "/api/dashboards",
            get(dashboards::list_dashboards).post(dashboards::create_dashboard),
        )
        .route(
            "/api/dashboards/:id",
            get(dashboards::get_dashboard)
                .put(dashboards::update_dashboard)
                .delete(dashboards::delete_dashboard),
        )
        .route(
            "/api/dashboards/:id/panels",
            get(panels::list_dashboard_panels),
        )
        // Panels
        .route("/api/panels", post(panels::create_panel))
        .route(
            "/api/panels/:id",
            put(panels::update_panel).delete(panels::delete_panel),
        )
        // Data sources
        .route(
            "/api/datasources",
            get(datasources::list_data_sources).post(datasources::create_data_source),
        )
        // Alerts
        .route("/api/alerts", get(alerts::list_alerts))
        .route("/api/alerts/:id", patch(alerts::resolve_alert))
        // Integrations
        .route("/api/integrations", get(integrations::list_integrations))
        .route(
            "/api/integrations/connect",
            post(integrations::connect_integration),
        )
        .route(
            "/api/integrations/:service_id",
            delete(integrations::disconnect_integration),
        )
        // State and middleware
        .layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track_requests,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
