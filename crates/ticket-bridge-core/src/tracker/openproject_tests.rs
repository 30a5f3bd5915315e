//! Tests for [`OpenProjectTracker`] against a mocked OpenProject server.

use super::*;
use openproject_client::ClientConfig;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "https://helpdesk.example.com/#ticket/zoom/42";

fn tracker_for(server: &MockServer) -> OpenProjectTracker {
    let client = OpenProjectClient::new(ClientConfig::new(server.uri(), "token")).unwrap();
    OpenProjectTracker::new(client, "support")
}

fn draft(assignee: Option<&str>) -> WorkItemDraft {
    WorkItemDraft {
        subject: "Ticket#42: Login broken".to_string(),
        description: "Ticket in Support with High priority".to_string(),
        correlation_field: "customField5".to_string(),
        correlation: CorrelationKey::for_ticket("https://helpdesk.example.com/#ticket/zoom/", crate::TicketId::new(42)),
        status: Some("/api/v3/statuses/3".to_string()),
        assignee: assignee.map(str::to_string),
    }
}

fn existing() -> ExistingWorkItem {
    ExistingWorkItem {
        id: 17,
        lock_version: 3,
        subject: "Ticket#42: Login broken".to_string(),
        description: None,
        correlation: Some(KEY.to_string()),
        status: None,
        assignee: None,
    }
}

#[tokio::test]
async fn test_find_maps_first_element() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/projects/support/work_packages"))
        .and(query_param(
            "filters",
            format!(r#"[{{"customField5":{{"operator":"=","values":["{}"]}}}}]"#, KEY),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_type": "WorkPackageCollection",
            "total": 2,
            "count": 2,
            "_embedded": { "elements": [
                {
                    "_type": "WorkPackage",
                    "id": 17,
                    "lockVersion": 3,
                    "subject": "Ticket#42: Login broken",
                    "description": { "raw": "Ticket in Support with High priority" },
                    "customField5": KEY,
                    "_links": {
                        "status": { "href": "/api/v3/statuses/3" },
                        "assignee": { "href": "/api/v3/users/9" }
                    }
                },
                { "_type": "WorkPackage", "id": 23, "lockVersion": 0, "customField5": KEY }
            ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key = CorrelationKey::for_ticket("https://helpdesk.example.com/#ticket/zoom/", crate::TicketId::new(42));
    let found = tracker_for(&server)
        .find_by_correlation("customField5", &key)
        .await
        .unwrap()
        .expect("work item should be found");

    assert_eq!(found.id, 17);
    assert_eq!(found.lock_version, 3);
    assert_eq!(found.correlation.as_deref(), Some(KEY));
    assert_eq!(found.status.as_deref(), Some("/api/v3/statuses/3"));
    assert_eq!(found.assignee.as_deref(), Some("/api/v3/users/9"));
    assert_eq!(
        found.description.as_deref(),
        Some("Ticket in Support with High priority")
    );
}

#[tokio::test]
async fn test_find_without_match_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/projects/support/work_packages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_type": "WorkPackageCollection",
            "_embedded": { "elements": [] }
        })))
        .mount(&server)
        .await;

    let key = CorrelationKey::for_ticket("https://helpdesk.example.com/#ticket/zoom/", crate::TicketId::new(42));
    let found = tracker_for(&server)
        .find_by_correlation("customField5", &key)
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_create_sends_draft_without_lock_version() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/projects/support/work_packages"))
        .and(query_param("notify", "true"))
        .and(body_json(serde_json::json!({
            "subject": "Ticket#42: Login broken",
            "description": { "raw": "Ticket in Support with High priority" },
            "customField5": KEY,
            "_links": {
                "status": { "href": "/api/v3/statuses/3" },
                "assignee": { "href": "/api/v3/users/9" }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "_type": "WorkPackage",
            "id": 99,
            "lockVersion": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = tracker_for(&server)
        .create_work_item(&draft(Some("/api/v3/users/9")), true)
        .await
        .unwrap();

    assert_eq!(id, 99);
}

#[tokio::test]
async fn test_update_sends_lock_version_and_omits_unmapped_assignee() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v3/work_packages/17"))
        .and(query_param("notify", "false"))
        .and(body_json(serde_json::json!({
            "subject": "Ticket#42: Login broken",
            "description": { "raw": "Ticket in Support with High priority" },
            "customField5": KEY,
            "_links": {
                "status": { "href": "/api/v3/statuses/3" }
            },
            "lockVersion": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_type": "WorkPackage",
            "id": 17,
            "lockVersion": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = tracker_for(&server)
        .update_work_item(&existing(), &draft(None), false)
        .await
        .unwrap();

    assert_eq!(id, 17);
}

#[tokio::test]
async fn test_update_error_document_becomes_tracker_error() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v3/work_packages/17"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "_type": "Error",
            "errorIdentifier": "urn:openproject-org:api:v3:errors:UpdateConflict",
            "message": "conflict"
        })))
        .mount(&server)
        .await;

    let result = tracker_for(&server)
        .update_work_item(&existing(), &draft(None), false)
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, TrackerError::Api(_)));
    assert!(!error.is_transient());
}
