//! Application state shared across handlers

use crate::db::Database;
use crate::routes::metrics::Metrics;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<Database>,
    /// Application counters for the Prometheus endpoint
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
