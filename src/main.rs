//! PulseOps - backend service for the PulseOps observability dashboard

mod db;
mod error;
mod extract;
mod models;
mod routes;
mod seed;
mod state;

use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulseops=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .expect("Invalid LISTEN_ADDR");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://pulseops.db".to_string());

    // Connect to database
    let db = match Database::new(&database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    // Seed demonstration data on first boot
    if let Err(e) = seed::run(&db).await {
        error!(error = %e, "Failed to seed demo data");
        std::process::exit(1);
    }

    // Create application state and router
    let state = AppState::new(db);
    let app = routes::router(state);

    info!(
        "PulseOps v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        listen_addr
    );
    info!("Database: {}", database_url);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
