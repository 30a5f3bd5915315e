//! Repeated and concurrent deliveries for the same ticket.

mod common;

use axum::http::StatusCode;
use common::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Lookup responder that returns the work package once it has been created.
struct LookupAfterCreate {
    created: Arc<AtomicBool>,
}

impl Respond for LookupAfterCreate {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let elements = if self.created.load(Ordering::SeqCst) {
            vec![work_package(101, 0)]
        } else {
            vec![]
        };
        ResponseTemplate::new(200).set_body_json(collection(elements))
    }
}

struct CreateOnce {
    created: Arc<AtomicBool>,
}

impl Respond for CreateOnce {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.created.store(true, Ordering::SeqCst);
        ResponseTemplate::new(201).set_body_json(work_package(101, 0))
    }
}

async fn mount_stateful_tracker(server: &MockServer) {
    let created = Arc::new(AtomicBool::new(false));

    Mock::given(method("GET"))
        .and(path(WORK_PACKAGES_PATH))
        .respond_with(LookupAfterCreate {
            created: created.clone(),
        })
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(WORK_PACKAGES_PATH))
        .respond_with(CreateOnce { created })
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v3/work_packages/101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(work_package(101, 1)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sequential_replay_updates_instead_of_creating_twice() {
    let server = MockServer::start().await;
    mount_stateful_tracker(&server).await;

    let router = bridge_router(&server, Some(CUSTOM_FIELD));

    for _ in 0..2 {
        let (status, _) = deliver(
            router.clone(),
            &webhook_path(),
            ticket_payload("open", 7).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let requests = server.received_requests().await.unwrap_or_default();
    let patches = requests
        .iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .count();
    assert_eq!(patches, 1);
}

#[tokio::test]
async fn test_concurrent_deliveries_create_one_work_package() {
    let server = MockServer::start().await;
    mount_stateful_tracker(&server).await;

    let router = bridge_router(&server, Some(CUSTOM_FIELD));

    let deliveries = (0..6).map(|_| {
        let router = router.clone();
        tokio::spawn(async move {
            deliver(
                router,
                &webhook_path(),
                ticket_payload("open", 7).to_string(),
            )
            .await
        })
    });

    for handle in deliveries.collect::<Vec<_>>() {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let requests = server.received_requests().await.unwrap_or_default();
    let creates = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(creates, 1);
}
