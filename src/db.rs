//! Database access layer with SQLx over SQLite
//!
//! One async method per entity operation; handlers never issue queries
//! directly. Missing rows come back as `None`/`false`, never as errors;
//! the route layer translates those into 404s.

use crate::error::{AppError, Result};
use crate::models::{
    Alert, AlertSeverity, AlertStatus, CreateDashboardRequest, CreateDataSourceRequest,
    CreatePanelRequest, Dashboard, DataSource, DataSourceKind, Integration, IntegrationStatus,
    NewAlert, Panel, PanelKind, UpdateDashboardRequest, UpdatePanelRequest,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS dashboards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        is_favorite INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS panels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dashboard_id INTEGER NOT NULL REFERENCES dashboards(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        kind TEXT NOT NULL,
        data_config TEXT NOT NULL,
        layout_config TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS data_sources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        config TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        severity TEXT NOT NULL,
        status TEXT NOT NULL,
        threshold REAL,
        current_value REAL,
        created_at TEXT NOT NULL,
        resolved_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS integrations (
        service_id TEXT PRIMARY KEY,
        service_name TEXT NOT NULL,
        category TEXT NOT NULL,
        status TEXT NOT NULL,
        last_validated_at TEXT NOT NULL
    )
    "#,
];

/// Database connection pool and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new connection pool and ensure the schema exists
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid DATABASE_URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory SQLite database exists per connection, so the pool
        // must stay at a single connection for `:memory:` URLs.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 16 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect: {e}")))?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Database connection pool established");
        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // --- Dashboards ---

    /// List all dashboards, oldest first
    pub async fn list_dashboards(&self) -> Result<Vec<Dashboard>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, is_favorite, created_at
            FROM dashboards
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(dashboard_from_row).collect())
    }

    pub async fn get_dashboard(&self, id: i64) -> Result<Option<Dashboard>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, is_favorite, created_at
            FROM dashboards
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(dashboard_from_row))
    }

    pub async fn create_dashboard(&self, payload: &CreateDashboardRequest) -> Result<Dashboard> {
        let row = sqlx::query(
            r#"
            INSERT INTO dashboards (title, description, is_favorite, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, title, description, is_favorite, created_at
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.is_favorite)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(dashboard_from_row(&row))
    }

    /// Partial update; omitted fields keep their stored value
    pub async fn update_dashboard(
        &self,
        id: i64,
        payload: &UpdateDashboardRequest,
    ) -> Result<Option<Dashboard>> {
        let row = sqlx::query(
            r#"
            UPDATE dashboards SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                is_favorite = COALESCE(?3, is_favorite)
            WHERE id = ?4
            RETURNING id, title, description, is_favorite, created_at
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.is_favorite)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(dashboard_from_row))
    }

    /// Delete a dashboard; its panels go with it via ON DELETE CASCADE
    pub async fn delete_dashboard(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dashboards WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_dashboards(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM dashboards")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("n"))
    }

    // --- Panels ---

    pub async fn list_panels(&self, dashboard_id: i64) -> Result<Vec<Panel>> {
        let rows = sqlx::query(
            r#"
            SELECT id, dashboard_id, title, kind, data_config, layout_config, created_at
            FROM panels
            WHERE dashboard_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(dashboard_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(panel_from_row).collect())
    }

    pub async fn create_panel(&self, payload: &CreatePanelRequest) -> Result<Panel> {
        let row = sqlx::query(
            r#"
            INSERT INTO panels (dashboard_id, title, kind, data_config, layout_config, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, dashboard_id, title, kind, data_config, layout_config, created_at
            "#,
        )
        .bind(payload.dashboard_id)
        .bind(&payload.title)
        .bind(panel_kind_to_string(payload.kind))
        .bind(serde_json::to_string(&payload.data_config)?)
        .bind(serde_json::to_string(&payload.layout_config)?)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(panel_from_row(&row))
    }

    pub async fn update_panel(
        &self,
        id: i64,
        payload: &UpdatePanelRequest,
    ) -> Result<Option<Panel>> {
        let data_config = payload
            .data_config
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let layout_config = payload
            .layout_config
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let row = sqlx::query(
            r#"
            UPDATE panels SET
                title = COALESCE(?1, title),
                kind = COALESCE(?2, kind),
                data_config = COALESCE(?3, data_config),
                layout_config = COALESCE(?4, layout_config)
            WHERE id = ?5
            RETURNING id, dashboard_id, title, kind, data_config, layout_config, created_at
            "#,
        )
        .bind(&payload.title)
        .bind(payload.kind.map(panel_kind_to_string))
        .bind(data_config)
        .bind(layout_config)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(panel_from_row))
    }

    pub async fn delete_panel(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM panels WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // --- Data sources ---

    pub async fn list_data_sources(&self) -> Result<Vec<DataSource>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, kind, config, created_at
            FROM data_sources
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(data_source_from_row).collect())
    }

    pub async fn create_data_source(
        &self,
        payload: &CreateDataSourceRequest,
    ) -> Result<DataSource> {
        let row = sqlx::query(
            r#"
            INSERT INTO data_sources (name, kind, config, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, kind, config, created_at
            "#,
        )
        .bind(&payload.name)
        .bind(data_source_kind_to_string(payload.kind))
        .bind(serde_json::to_string(&payload.config)?)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(data_source_from_row(&row))
    }

    // --- Alerts ---

    /// List all alerts, newest first
    pub async fn list_alerts(&self) -> Result<Vec<Alert>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, severity, status, threshold,
                   current_value, created_at, resolved_at
            FROM alerts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(alert_from_row).collect())
    }

    pub async fn create_alert(&self, alert: &NewAlert) -> Result<Alert> {
        let row = sqlx::query(
            r#"
            INSERT INTO alerts (title, description, severity, status, threshold,
                                current_value, created_at, resolved_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING id, title, description, severity, status, threshold,
                      current_value, created_at, resolved_at
            "#,
        )
        .bind(&alert.title)
        .bind(&alert.description)
        .bind(severity_to_string(alert.severity))
        .bind(alert_status_to_string(alert.status))
        .bind(alert.threshold)
        .bind(alert.current_value)
        .bind(Utc::now())
        .bind(alert.resolved_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(alert_from_row(&row))
    }

    /// Mark an alert resolved. Idempotent: resolving an already-resolved
    /// alert just re-sets `resolved_at`.
    pub async fn resolve_alert(
        &self,
        id: i64,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<Alert>> {
        let row = sqlx::query(
            r#"
            UPDATE alerts SET status = 'resolved', resolved_at = ?1
            WHERE id = ?2
            RETURNING id, title, description, severity, status, threshold,
                      current_value, created_at, resolved_at
            "#,
        )
        .bind(resolved_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(alert_from_row))
    }

    pub async fn count_alerts(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM alerts")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("n"))
    }

    // --- Integrations ---

    pub async fn list_integrations(&self) -> Result<Vec<Integration>> {
        let rows = sqlx::query(
            r#"
            SELECT service_id, service_name, category, status, last_validated_at
            FROM integrations
            ORDER BY service_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(integration_from_row).collect())
    }

    /// Atomic upsert keyed by service id. Connecting the same service
    /// twice updates the existing row instead of duplicating it, even
    /// under concurrent requests.
    pub async fn upsert_integration(
        &self,
        service_id: &str,
        service_name: &str,
        category: &str,
        validated_at: DateTime<Utc>,
    ) -> Result<Integration> {
        let row = sqlx::query(
            r#"
            INSERT INTO integrations (service_id, service_name, category, status, last_validated_at)
            VALUES (?1, ?2, ?3, 'connected', ?4)
            ON CONFLICT(service_id) DO UPDATE SET
                service_name = excluded.service_name,
                category = excluded.category,
                status = excluded.status,
                last_validated_at = excluded.last_validated_at
            RETURNING service_id, service_name, category, status, last_validated_at
            "#,
        )
        .bind(service_id)
        .bind(service_name)
        .bind(category)
        .bind(validated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(integration_from_row(&row))
    }

    pub async fn delete_integration(&self, service_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM integrations WHERE service_id = ?1")
            .bind(service_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn dashboard_from_row(row: &SqliteRow) -> Dashboard {
    Dashboard {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        is_favorite: row.get("is_favorite"),
        created_at: row.get("created_at"),
    }
}

fn panel_from_row(row: &SqliteRow) -> Panel {
    Panel {
        id: row.get("id"),
        dashboard_id: row.get("dashboard_id"),
        title: row.get("title"),
        kind: string_to_panel_kind(row.get("kind")),
        data_config: parse_json_column(row.get("data_config")),
        layout_config: parse_json_column(row.get("layout_config")),
        created_at: row.get("created_at"),
    }
}

fn data_source_from_row(row: &SqliteRow) -> DataSource {
    DataSource {
        id: row.get("id"),
        name: row.get("name"),
        kind: string_to_data_source_kind(row.get("kind")),
        config: parse_json_column(row.get("config")),
        created_at: row.get("created_at"),
    }
}

fn alert_from_row(row: &SqliteRow) -> Alert {
    Alert {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        severity: string_to_severity(row.get("severity")),
        status: string_to_alert_status(row.get("status")),
        threshold: row.get("threshold"),
        current_value: row.get("current_value"),
        created_at: row.get("created_at"),
        resolved_at: row.get("resolved_at"),
    }
}

fn integration_from_row(row: &SqliteRow) -> Integration {
    Integration {
        service_id: row.get("service_id"),
        service_name: row.get("service_name"),
        category: row.get("category"),
        status: string_to_integration_status(row.get("status")),
        last_validated_at: row.get("last_validated_at"),
    }
}

fn parse_json_column(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

fn panel_kind_to_string(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Line => "line",
        PanelKind::Bar => "bar",
        PanelKind::Area => "area",
        PanelKind::Pie => "pie",
        PanelKind::Stat => "stat",
    }
}

fn string_to_panel_kind(s: String) -> PanelKind {
    match s.as_str() {
        "line" => PanelKind::Line,
        "bar" => PanelKind::Bar,
        "area" => PanelKind::Area,
        "pie" => PanelKind::Pie,
        _ => PanelKind::Stat,
    }
}

fn data_source_kind_to_string(kind: DataSourceKind) -> &'static str {
    match kind {
        DataSourceKind::Postgres => "postgres",
        DataSourceKind::Mysql => "mysql",
        DataSourceKind::RestApi => "rest_api",
    }
}

fn string_to_data_source_kind(s: String) -> DataSourceKind {
    match s.as_str() {
        "postgres" => DataSourceKind::Postgres,
        "mysql" => DataSourceKind::Mysql,
        _ => DataSourceKind::RestApi,
    }
}

fn severity_to_string(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Critical => "critical",
        AlertSeverity::Warning => "warning",
        AlertSeverity::Info => "info",
    }
}

fn string_to_severity(s: String) -> AlertSeverity {
    match s.as_str() {
        "critical" => AlertSeverity::Critical,
        "warning" => AlertSeverity::Warning,
        _ => AlertSeverity::Info,
    }
}

fn alert_status_to_string(status: AlertStatus) -> &'static str {
    match status {
        AlertStatus::Active => "active",
        AlertStatus::Resolved => "resolved",
    }
}

fn string_to_alert_status(s: String) -> AlertStatus {
    match s.as_str() {
        "resolved" => AlertStatus::Resolved,
        _ => AlertStatus::Active,
    }
}

fn string_to_integration_status(s: String) -> IntegrationStatus {
    match s.as_str() {
        "connected" => IntegrationStatus::Connected,
        _ => IntegrationStatus::Disconnected,
    }
}
