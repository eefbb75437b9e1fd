//! Prometheus metrics endpoint and application counters

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::AppState;

/// Application metrics for Prometheus
#[derive(Default)]
pub struct Metrics {
    /// Total HTTP requests processed
    pub requests_total: AtomicU64,
    /// Total entities created through the API
    pub entities_created_total: AtomicU64,
    /// Integration connect attempts
    pub integration_connects_total: AtomicU64,
    /// Integration connects rejected by the API-key shape check
    pub integration_rejections_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_created(&self) {
        self.entities_created_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_integration_connects(&self) {
        self.integration_connects_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_integration_rejections(&self) {
        self.integration_rejections_total.fetch_add(1, Ordering::Relaxed);
    }
}

/// Middleware counting every request that reaches the router
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.metrics.inc_requests();
    next.run(req).await
}

/// GET /metrics
///
/// Returns Prometheus-format metrics
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.metrics;

    let output = format!(
        r#"# HELP pulseops_requests_total Total number of HTTP requests processed
# TYPE pulseops_requests_total counter
pulseops_requests_total {}

# HELP pulseops_entities_created_total Total number of entities created through the API
# TYPE pulseops_entities_created_total counter
pulseops_entities_created_total {}

# HELP pulseops_integration_connects_total Total number of integration connect attempts
# TYPE pulseops_integration_connects_total counter
pulseops_integration_connects_total {}

# HELP pulseops_integration_rejections_total Connect attempts rejected by the key shape check
# TYPE pulseops_integration_rejections_total counter
pulseops_integration_rejections_total {}

# HELP pulseops_info Build information
# TYPE pulseops_info gauge
pulseops_info{{version="{}"}} 1
"#,
        metrics.requests_total.load(Ordering::Relaxed),
        metrics.entities_created_total.load(Ordering::Relaxed),
        metrics.integration_connects_total.load(Ordering::Relaxed),
        metrics.integration_rejections_total.load(Ordering::Relaxed),
        env!("CARGO_PKG_VERSION"),
    );

    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        output,
    )
}
