//! Idempotent demonstration data inserted on first boot
//!
//! Each guard is independent: dashboards/panels are seeded only while the
//! dashboards table is empty, alerts only while the alerts table is empty.
//! Once any row exists in a guarded table, reruns are no-ops for it.

use crate::db::Database;
use crate::error::Result;
use crate::models::{
    AlertSeverity, AlertStatus, CreateDashboardRequest, CreatePanelRequest, NewAlert, PanelKind,
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

pub async fn run(db: &Database) -> Result<()> {
    seed_dashboards(db).await?;
    seed_alerts(db).await?;
    Ok(())
}

async fn seed_dashboards(db: &Database) -> Result<()> {
    if db.count_dashboards().await? > 0 {
        debug!("Dashboards already present, skipping seed");
        return Ok(());
    }

    let dashboard = db
        .create_dashboard(&CreateDashboardRequest {
            title: "PulseOps Overview".to_string(),
            description: Some("Service health at a glance".to_string()),
            is_favorite: true,
        })
        .await?;

    let panels = [
        CreatePanelRequest {
            dashboard_id: dashboard.id,
            title: "Request Latency".to_string(),
            kind: PanelKind::Line,
            data_config: json!({
                "series": ["p50", "p95", "p99"],
                "unit": "ms",
            }),
            layout_config: json!({"x": 0, "y": 0, "w": 8, "h": 4}),
        },
        CreatePanelRequest {
            dashboard_id: dashboard.id,
            title: "Throughput".to_string(),
            kind: PanelKind::Area,
            data_config: json!({
                "series": ["requests"],
                "unit": "req/s",
            }),
            layout_config: json!({"x": 8, "y": 0, "w": 8, "h": 4}),
        },
        CreatePanelRequest {
            dashboard_id: dashboard.id,
            title: "Error Rate".to_string(),
            kind: PanelKind::Stat,
            data_config: json!({
                "value": 0.4,
                "unit": "%",
                "thresholds": {"warning": 1.0, "critical": 5.0},
            }),
            layout_config: json!({"x": 0, "y": 4, "w": 4, "h": 2}),
        },
    ];

    for panel in &panels {
        db.create_panel(panel).await?;
    }

    info!(
        dashboard_id = dashboard.id,
        panels = panels.len(),
        "Seeded demo dashboard"
    );
    Ok(())
}

async fn seed_alerts(db: &Database) -> Result<()> {
    if db.count_alerts().await? > 0 {
        debug!("Alerts already present, skipping seed");
        return Ok(());
    }

    let alerts = [
        NewAlert {
            title: "High error rate on api-gateway".to_string(),
            description: "5xx responses exceeded 5% over the last 10 minutes".to_string(),
            severity: AlertSeverity::Critical,
            status: AlertStatus::Active,
            threshold: Some(5.0),
            current_value: Some(8.2),
            resolved_at: None,
        },
        NewAlert {
            title: "Elevated p99 latency on checkout".to_string(),
            description: "p99 latency above 1200ms".to_string(),
            severity: AlertSeverity::Warning,
            status: AlertStatus::Active,
            threshold: Some(1200.0),
            current_value: Some(1480.0),
            resolved_at: None,
        },
        NewAlert {
            title: "Disk usage on db-primary".to_string(),
            description: "Volume utilisation above 80%".to_string(),
            severity: AlertSeverity::Warning,
            status: AlertStatus::Active,
            threshold: Some(80.0),
            current_value: Some(84.3),
            resolved_at: None,
        },
        NewAlert {
            title: "Deploy completed".to_string(),
            description: "Rollout of v2.4.1 finished without incident".to_string(),
            severity: AlertSeverity::Info,
            status: AlertStatus::Resolved,
            threshold: None,
            current_value: None,
            resolved_at: Some(Utc::now()),
        },
    ];

    for alert in &alerts {
        db.create_alert(alert).await?;
    }

    info!(alerts = alerts.len(), "Seeded demo alerts");
    Ok(())
}
