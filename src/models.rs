//! Core domain models and request payloads for PulseOps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Visualization type of a dashboard panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Line,
    Bar,
    Area,
    Pie,
    Stat,
}

/// Kind of backing data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    Postgres,
    Mysql,
    RestApi,
}

/// Alert severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

/// Alert lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Resolved,
}

/// Connection status of a third-party integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    Connected,
    Disconnected,
}

/// A dashboard owning zero or more panels
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

/// A single visualization panel on a dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: i64,
    pub dashboard_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PanelKind,
    /// Opaque chart configuration, unvalidated beyond being well-formed JSON
    pub data_config: Value,
    /// Opaque grid position/size
    pub layout_config: Value,
    pub created_at: DateTime<Utc>,
}

/// A configured data source. No live connection test is performed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub config: Value,
    pub created_at: DateTime<Utc>,
}

/// An alert. The exposed API only ever transitions active -> resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub threshold: Option<f64>,
    pub current_value: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A third-party integration, keyed by a caller-supplied service id.
///
/// The API key submitted on connect is never persisted; only the
/// validation outcome and its timestamp are.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub service_id: String,
    pub service_name: String,
    pub category: String,
    pub status: IntegrationStatus,
    pub last_validated_at: DateTime<Utc>,
}

/// Payload for POST /api/dashboards
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDashboardRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Payload for PUT /api/dashboards/{id}
///
/// Every field is independently optional; omitted fields stay untouched.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDashboardRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_favorite: Option<bool>,
}

/// Payload for POST /api/panels
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePanelRequest {
    pub dashboard_id: i64,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PanelKind,
    pub data_config: Value,
    #[serde(default = "empty_object")]
    pub layout_config: Value,
}

/// Payload for PUT /api/panels/{id}
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePanelRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PanelKind>,
    pub data_config: Option<Value>,
    pub layout_config: Option<Value>,
}

/// Payload for POST /api/datasources
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDataSourceRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub config: Value,
}

/// Payload for PATCH /api/alerts/{id}
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAlertRequest {
    pub status: AlertStatus,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Payload for POST /api/integrations/connect
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectIntegrationRequest {
    #[validate(length(min = 1, message = "serviceId must not be empty"))]
    pub service_id: String,
    #[validate(length(min = 1, message = "serviceName must not be empty"))]
    pub service_name: String,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    /// Shape-checked only, never persisted
    pub api_key: String,
}

/// Internal payload used by the seed routine to insert demo alerts
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub threshold: Option<f64>,
    pub current_value: Option<f64>,
    pub resolved_at: Option<DateTime<Utc>>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
