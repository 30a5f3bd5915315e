//! Common test utilities for ticket-bridge integration tests
//!
//! This module provides:
//! - A router wired to a real OpenProject client pointed at a mock server
//! - Ticket payload and HAL document builders
//! - Request helpers

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use openproject_client::{ClientConfig, OpenProjectClient};
use std::sync::Arc;
use ticket_bridge_api::{create_router, AppState, WebhookSecret};
use ticket_bridge_core::{AssigneeMap, OpenProjectTracker, StatusMap, SyncHandler, SyncSettings};
use tower::ServiceExt;
use wiremock::MockServer;

pub const SECRET: &str = "s3cr3t-token";
pub const PROJECT: &str = "support";
pub const CUSTOM_FIELD: &str = "customField2";
pub const URL_PREFIX: &str = "https://helpdesk.example.com/#ticket/zoom/";
pub const WORK_PACKAGES_PATH: &str = "/api/v3/projects/support/work_packages";

/// Router backed by the production tracker talking to `server`.
pub fn bridge_router(server: &MockServer, custom_field: Option<&str>) -> Router {
    let client = OpenProjectClient::new(ClientConfig::new(server.uri(), "op-token"))
        .expect("client should build");
    let tracker = Arc::new(OpenProjectTracker::new(client, PROJECT));
    let settings = SyncSettings::new(
        URL_PREFIX,
        custom_field.map(str::to_string),
        AssigneeMap::parse("7:user/9").expect("assignee table"),
        StatusMap::parse("open:status/3,merged:status/5").expect("status table"),
    );
    let handler = Arc::new(SyncHandler::new(tracker, settings));

    create_router(AppState::new(handler, WebhookSecret::new(SECRET)))
}

/// Ticket webhook body for ticket 42.
pub fn ticket_payload(state: &str, owner_id: u64) -> serde_json::Value {
    serde_json::json!({
        "ticket": {
            "id": 42,
            "number": "42",
            "owner_id": owner_id,
            "title": "Login broken",
            "state": state,
            "priority": { "name": "High" },
            "group": { "name": "Support" }
        }
    })
}

/// Canonical ticket URL for ticket 42.
pub fn ticket_url() -> String {
    format!("{URL_PREFIX}42")
}

/// HAL collection with the given elements.
pub fn collection(elements: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "_type": "WorkPackageCollection",
        "total": elements.len(),
        "count": elements.len(),
        "_embedded": { "elements": elements }
    })
}

/// HAL work package carrying the correlation field.
pub fn work_package(id: u64, lock_version: u64) -> serde_json::Value {
    let mut document = serde_json::json!({
        "_type": "WorkPackage",
        "id": id,
        "lockVersion": lock_version,
        "subject": "Ticket#42: Login broken",
        "description": { "raw": "Ticket in Support with High priority" },
        "_links": {
            "status": { "href": "status/3" },
            "assignee": { "href": "user/9" }
        }
    });
    document[CUSTOM_FIELD] = serde_json::Value::String(ticket_url());
    document
}

/// HAL error document.
pub fn error_document(identifier: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "_type": "Error",
        "errorIdentifier": identifier,
        "message": message
    })
}

/// Send a webhook delivery through the router and return the status and body length.
pub async fn deliver(router: Router, path: &str, body: String) -> (StatusCode, usize) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request should build");

    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");

    (status, bytes.len())
}

/// Webhook path carrying the configured secret.
pub fn webhook_path() -> String {
    format!("/{SECRET}")
}
