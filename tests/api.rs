//! End-to-end handler tests over an in-memory database
//!
//! Each test builds the real router against its own `sqlite::memory:`
//! pool and drives it with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pulseops::db::Database;
use pulseops::routes;
use pulseops::seed;
use pulseops::state::AppState;

struct TestApp {
    app: Router,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let state = AppState::new(db);
        let app = routes::router(state.clone());
        Self { app, state }
    }

    async fn seeded() -> Self {
        let this = Self::new().await;
        seed::run(&this.state.db).await.unwrap();
        this
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                builder.body(Body::from(value.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

#[tokio::test]
async fn created_dashboard_appears_in_list_exactly_once() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/api/dashboards",
            json!({"title": "Checkout Health", "description": "conversion funnel"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Checkout Health");
    assert_eq!(created["isFavorite"], false);

    let (status, list) = app.get("/api/dashboards").await;
    assert_eq!(status, StatusCode::OK);
    let matching: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["id"] == created["id"])
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn missing_dashboard_is_404_for_get_put_delete() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/dashboards/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, _) = app.put("/api/dashboards/9999", json!({"title": "X"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/dashboards/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_rejected_with_the_json_error_shape() {
    let app = TestApp::new().await;

    // The rejection follows the same {message, field} body every other
    // 400 uses, not a plain-text response.
    let (status, body) = app.get("/api/dashboards/not-a-number").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    assert_eq!(body["field"], Value::Null);

    let (status, body) = app.delete("/api/panels/nan").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = app
        .patch("/api/alerts/oops", json!({"status": "resolved"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn dashboard_validation_reports_first_offending_field() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/dashboards", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = app.post("/api/dashboards", json!({"title": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "title");
    assert_eq!(body["message"], "title must not be empty");
}

#[tokio::test]
async fn partial_update_leaves_other_fields_unchanged() {
    let app = TestApp::new().await;

    let (_, created) = app
        .post(
            "/api/dashboards",
            json!({"title": "Original", "description": "keep me", "isFavorite": true}),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(&format!("/api/dashboards/{id}"), json!({"title": "X"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "X");
    assert_eq!(updated["description"], "keep me");
    assert_eq!(updated["isFavorite"], true);
}

#[tokio::test]
async fn delete_returns_204_and_cascades_to_panels() {
    let app = TestApp::new().await;

    let (_, dashboard) = app.post("/api/dashboards", json!({"title": "Doomed"})).await;
    let id = dashboard["id"].as_i64().unwrap();

    let (status, panel) = app
        .post(
            "/api/panels",
            json!({
                "dashboardId": id,
                "title": "p95 latency",
                "type": "line",
                "dataConfig": {"series": ["p95"]},
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    // layoutConfig defaults to an empty object when omitted
    assert_eq!(panel["layoutConfig"], json!({}));

    let (status, body) = app.delete(&format!("/api/dashboards/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, panels) = app.get(&format!("/api/dashboards/{id}/panels")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(panels, json!([]));
}

#[tokio::test]
async fn panel_creation_for_missing_dashboard_is_404_not_500() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/panels",
            json!({
                "dashboardId": 12345,
                "title": "orphan",
                "type": "bar",
                "dataConfig": {},
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn panel_update_and_delete() {
    let app = TestApp::new().await;

    let (_, dashboard) = app.post("/api/dashboards", json!({"title": "Infra"})).await;
    let dashboard_id = dashboard["id"].as_i64().unwrap();

    let (_, panel) = app
        .post(
            "/api/panels",
            json!({
                "dashboardId": dashboard_id,
                "title": "CPU",
                "type": "area",
                "dataConfig": {"series": ["cpu"]},
                "layoutConfig": {"x": 0, "y": 0, "w": 4, "h": 2},
            }),
        )
        .await;
    let panel_id = panel["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(&format!("/api/panels/{panel_id}"), json!({"type": "stat"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["type"], "stat");
    assert_eq!(updated["title"], "CPU");
    assert_eq!(updated["layoutConfig"], json!({"x": 0, "y": 0, "w": 4, "h": 2}));

    let (status, _) = app.delete(&format!("/api/panels/{panel_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete(&format!("/api/panels/{panel_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn data_sources_create_and_list() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/api/datasources",
            json!({
                "name": "orders-db",
                "type": "postgres",
                "config": {"host": "db.internal", "port": 5432},
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "postgres");

    let (status, list) = app.get("/api/datasources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["config"]["host"], "db.internal");
}

#[tokio::test]
async fn seeded_alerts_list_newest_first() {
    let app = TestApp::seeded().await;

    let (status, alerts) = app.get("/api/alerts").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 4);
    // Last seeded alert comes back first
    assert_eq!(alerts[0]["title"], "Deploy completed");
    assert_eq!(alerts[0]["status"], "resolved");
}

#[tokio::test]
async fn resolving_an_alert_twice_is_idempotent() {
    let app = TestApp::seeded().await;

    let (_, alerts) = app.get("/api/alerts").await;
    let active = alerts
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["status"] == "active")
        .unwrap();
    let id = active["id"].as_i64().unwrap();

    let (status, resolved) = app
        .patch(&format!("/api/alerts/{id}"), json!({"status": "resolved"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "resolved");
    assert!(resolved["resolvedAt"].is_string());

    let (status, resolved_again) = app
        .patch(&format!("/api/alerts/{id}"), json!({"status": "resolved"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved_again["status"], "resolved");
}

#[tokio::test]
async fn alerts_cannot_be_reopened() {
    let app = TestApp::seeded().await;

    let (_, alerts) = app.get("/api/alerts").await;
    let id = alerts[0]["id"].as_i64().unwrap();

    let (status, body) = app
        .patch(&format!("/api/alerts/{id}"), json!({"status": "active"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "status");
}

#[tokio::test]
async fn resolving_a_missing_alert_is_404() {
    let app = TestApp::new().await;

    let (status, _) = app
        .patch("/api/alerts/777", json!({"status": "resolved"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn short_api_key_is_rejected_with_401() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/integrations/connect",
            json!({
                "serviceId": "pagerduty",
                "serviceName": "PagerDuty",
                "category": "alerting",
                "apiKey": "short",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    // Nothing was stored
    let (_, list) = app.get("/api/integrations").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn key_with_forbidden_characters_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/integrations/connect",
            json!({
                "serviceId": "pagerduty",
                "serviceName": "PagerDuty",
                "category": "alerting",
                "apiKey": "abcdefghij!klmnopqrstuvwx",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_key_connects_and_is_never_persisted() {
    let app = TestApp::new().await;

    let (status, connected) = app
        .post(
            "/api/integrations/connect",
            json!({
                "serviceId": "datadog",
                "serviceName": "Datadog",
                "category": "monitoring",
                "apiKey": "abcde12345ABCDE67890xyz01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(connected["status"], "connected");
    assert!(connected.get("apiKey").is_none());

    let (_, list) = app.get("/api/integrations").await;
    let row = &list[0];
    assert_eq!(row["serviceId"], "datadog");
    assert!(row["lastValidatedAt"].is_string());
    // The stored row shape carries no key material
    assert!(row.get("apiKey").is_none());
}

#[tokio::test]
async fn reconnecting_updates_the_existing_row() {
    let app = TestApp::new().await;
    let key = "abcde12345ABCDE67890xyz01";

    app.post(
        "/api/integrations/connect",
        json!({
            "serviceId": "datadog",
            "serviceName": "Datadog",
            "category": "monitoring",
            "apiKey": key,
        }),
    )
    .await;
    let (_, second) = app
        .post(
            "/api/integrations/connect",
            json!({
                "serviceId": "datadog",
                "serviceName": "Datadog APM",
                "category": "monitoring",
                "apiKey": key,
            }),
        )
        .await;
    assert_eq!(second["serviceName"], "Datadog APM");

    let (_, list) = app.get("/api/integrations").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn disconnecting_removes_the_integration() {
    let app = TestApp::new().await;

    app.post(
        "/api/integrations/connect",
        json!({
            "serviceId": "slack",
            "serviceName": "Slack",
            "category": "notifications",
            "apiKey": "abcde12345ABCDE67890xyz01",
        }),
    )
    .await;

    let (status, _) = app.delete("/api/integrations/slack").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete("/api/integrations/slack").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seed_is_idempotent_end_to_end() {
    let app = TestApp::seeded().await;
    seed::run(&app.state.db).await.unwrap();

    let (_, dashboards) = app.get("/api/dashboards").await;
    let dashboards = dashboards.as_array().unwrap();
    assert_eq!(dashboards.len(), 1);
    assert_eq!(dashboards[0]["title"], "PulseOps Overview");

    let id = dashboards[0]["id"].as_i64().unwrap();
    let (_, panels) = app.get(&format!("/api/dashboards/{id}/panels")).await;
    let kinds: Vec<_> = panels
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["line", "area", "stat"]);

    let (_, alerts) = app.get("/api/alerts").await;
    assert_eq!(alerts.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn health_ready_and_metrics_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["healthy"], true);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("pulseops_requests_total"));
}
